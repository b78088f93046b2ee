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

/// A buffer source whose playback anchor is fixed at construction.
///
/// Playback is anchored to absolute time: `timestamp` names the frame-counter
/// value at which `position` is the correct buffer index. The source keeps no
/// call count, so it is robust to the host skipping or repeating render calls
/// as long as the host supplies the correct frame counter.
pub struct TimedBufferSource {
    /// The samples to play back. `None` renders silence forever.
    buffer: Option<PlaybackBuffer>,
    /// Buffer index that is valid at `timestamp`.
    position: i64,
    /// Frame-counter value at which `position` holds.
    timestamp: i64,
    /// Channel count of the single output bus.
    channel_count: u16,
}

impl TimedBufferSource {
    /// Creates a new source from the given options. The options must declare
    /// no input bus and exactly one output bus whose channel count matches
    /// the buffer.
    pub fn new(config: SourceConfig) -> Result<Self, NodeError> {
        let channel_count = super::validate_layout(&config, 0)?;

        let position = config.position();
        let timestamp = config.timestamp();
        let buffer = config.into_buffer().map(PlaybackBuffer::new);

        debug!(
            channels = channel_count,
            samples = buffer.as_ref().map(|b| b.sample_count()).unwrap_or(0),
            position,
            timestamp,
            "Timed buffer source created"
        );

        Ok(Self {
            buffer,
            position,
            timestamp,
            channel_count,
        })
    }
}

impl Processor for TimedBufferSource {
    fn process(&mut self, _inputs: &[&[f32]], current_frame: u64, output: &mut [Vec<f32>]) -> bool {
        let Some(buffer) = &self.buffer else {
            return true;
        };

        // Saturating math: extreme anchors must not panic the render thread.
        let offset = self
            .position
            .saturating_add(current_frame as i64)
            .saturating_sub(self.timestamp);

        for (samples, out) in buffer.channels().iter().zip(output.iter_mut()) {
            for (i, out_sample) in out.iter_mut().enumerate() {
                let index = offset.saturating_add(i as i64);
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
