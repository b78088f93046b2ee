// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use tracing::debug;

use super::buffer::PlaybackBuffer;
use super::error::NodeError;
use super::traits::Processor;
use crate::config::SourceConfig;

/// A buffer source that accepts live control input.
///
/// The first channel of the input bus, when it carries more than one sample,
/// re-times playback at the start of the block: `[position, timestamp,
/// velocity]` as floats, rounded to the nearest integer. This lets an
/// upstream source re-anchor or re-trigger playback every block without
/// reconstruction.
///
/// The velocity is a multiplicative gate, not a rate: 1 advances at exactly
/// the host's sample rate, 0 freezes playback at `position` indefinitely.
pub struct ControlledBufferSource {
    /// The samples to play back. `None` renders silence forever.
    buffer: Option<PlaybackBuffer>,
    /// Buffer index that is valid at `timestamp`.
    position: i64,
    /// Frame-counter value at which `position` holds.
    timestamp: i64,
    /// Playback gate: 1 advances with real time, 0 holds at `position`.
    velocity: i64,
    /// Channel count of the single output bus.
    channel_count: u16,
}

impl ControlledBufferSource {
    /// Creates a new source from the given options. The options must declare
    /// exactly one input bus, exactly one output bus whose channel count
    /// matches the buffer, and a velocity of 0 or 1.
    pub fn new(config: SourceConfig) -> Result<Self, NodeError> {
        let channel_count = super::validate_layout(&config, 1)?;

        let velocity = config.velocity();
        if velocity != 0 && velocity != 1 {
            return Err(NodeError::InvalidVelocity(velocity));
        }

        let position = config.position();
        let timestamp = config.timestamp();
        let buffer = config.into_buffer().map(PlaybackBuffer::new);

        debug!(
            channels = channel_count,
            samples = buffer.as_ref().map(|b| b.sample_count()).unwrap_or(0),
            position,
            timestamp,
            velocity,
            "Controlled buffer source created"
        );

        Ok(Self {
            buffer,
            position,
            timestamp,
            velocity,
            channel_count,
        })
    }

    /// Overwrites the playback state from a control vector. Position and
    /// timestamp require at least two samples; the velocity is only touched
    /// when a third sample is present.
    fn apply_control(&mut self, control: &[f32]) {
        if control.len() < 2 {
            return;
        }

        self.position = round_to_frame(control[0]);
        self.timestamp = round_to_frame(control[1]);
        if let Some(&velocity) = control.get(2) {
            self.velocity = round_to_frame(velocity);
        }
    }
}

/// Rounds a control sample to the nearest integer. The cast saturates, and
/// NaN becomes 0, so hostile control data cannot panic the render thread.
#[inline]
fn round_to_frame(value: f32) -> i64 {
    value.round() as i64
}

impl Processor for ControlledBufferSource {
    fn process(&mut self, inputs: &[&[f32]], current_frame: u64, output: &mut [Vec<f32>]) -> bool {
        if let Some(control) = inputs.first() {
            self.apply_control(control);
        }

        let Some(buffer) = &self.buffer else {
            return true;
        };

        let elapsed = (current_frame as i64).saturating_sub(self.timestamp);

        for (samples, out) in buffer.channels().iter().zip(output.iter_mut()) {
            for (i, out_sample) in out.iter_mut().enumerate() {
                let index = elapsed
                    .saturating_add(i as i64)
                    .saturating_mul(self.velocity)
                    .saturating_add(self.position);
                if index >= 0 && (index as usize) < samples.len() {
                    *out_sample = samples[index as usize];
                }
            }
        }

        true
    }

    fn channel_count(&self) -> u16 {
        self.channel_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_requires_input_bus() {
        let config = SourceConfig::new(0, 1, vec![1]);

        assert!(matches!(
            ControlledBufferSource::new(config),
            Err(NodeError::WrongInputCount {
                expected: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_construction_rejects_invalid_velocity() {
        let config = SourceConfig::new(1, 1, vec![1]).with_velocity(2);

        assert!(matches!(
            ControlledBufferSource::new(config),
            Err(NodeError::InvalidVelocity(2))
        ));
    }

    #[test]
    fn test_construction_accepts_velocity_bounds() {
        for velocity in [0, 1] {
            let config = SourceConfig::new(1, 1, vec![1]).with_velocity(velocity);
            let source = ControlledBufferSource::new(config).expect("construction failed");

            assert_eq!(source.velocity, velocity);
        }
    }

    #[test]
    fn test_apply_control_ignores_short_vectors() {
        let config = SourceConfig::new(1, 1, vec![1])
            .with_position(7)
            .with_timestamp(3)
            .with_velocity(1);
        let mut source = ControlledBufferSource::new(config).expect("construction failed");

        source.apply_control(&[]);
        source.apply_control(&[42.0]);

        assert_eq!(source.position, 7);
        assert_eq!(source.timestamp, 3);
        assert_eq!(source.velocity, 1);
    }

    #[test]
    fn test_apply_control_retimes_without_velocity() {
        let config = SourceConfig::new(1, 1, vec![1]).with_velocity(1);
        let mut source = ControlledBufferSource::new(config).expect("construction failed");

        source.apply_control(&[128.4, 63.6]);

        assert_eq!(source.position, 128);
        assert_eq!(source.timestamp, 64);
        assert_eq!(source.velocity, 1);
    }

    #[test]
    fn test_apply_control_overwrites_all_scalars() {
        let config = SourceConfig::new(1, 1, vec![1]);
        let mut source = ControlledBufferSource::new(config).expect("construction failed");

        source.apply_control(&[128.0, 0.0, 1.0]);

        assert_eq!(source.position, 128);
        assert_eq!(source.timestamp, 0);
        assert_eq!(source.velocity, 1);
    }

    #[test]
    fn test_apply_control_survives_nan() {
        let config = SourceConfig::new(1, 1, vec![1]);
        let mut source = ControlledBufferSource::new(config).expect("construction failed");

        source.apply_control(&[f32::NAN, f32::INFINITY, f32::NEG_INFINITY]);

        assert_eq!(source.position, 0);
        assert_eq!(source.timestamp, i64::MAX);
        assert_eq!(source.velocity, i64::MIN);
    }
}
