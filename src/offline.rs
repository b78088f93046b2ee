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

//! Offline block-driven rendering.
//!
//! [`OfflineRenderer`] stands in for a real-time host: it hands a processor
//! zeroed destination blocks, one render quantum at a time, with a frame
//! counter that advances by the quantum size per block. Useful for rendering
//! a source faster than real time and for exercising processors end to end.

use crate::node::{Processor, RENDER_QUANTUM_FRAMES};

/// Drives a [`Processor`] across consecutive render quanta.
pub struct OfflineRenderer {
    /// Frame-counter value of the first rendered block. The counter origin
    /// is arbitrary; it only has to advance by the quantum size per block.
    start_frame: u64,
}

impl Default for OfflineRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineRenderer {
    /// Creates a renderer whose frame counter starts at 0.
    pub fn new() -> Self {
        Self { start_frame: 0 }
    }

    /// Starts the frame counter at the given origin instead of 0.
    pub fn with_start_frame(mut self, start_frame: u64) -> Self {
        self.start_frame = start_frame;
        self
    }

    /// Renders the given number of quanta from the processor and returns the
    /// planar result, one Vec per output channel.
    pub fn render(&self, processor: &mut dyn Processor, quanta: usize) -> Vec<Vec<f32>> {
        self.render_with_control(processor, quanta, |_| None)
    }

    /// Renders with a per-block control feed. The closure receives the frame
    /// counter of each block and may return the control channel to present on
    /// the processor's input bus for that block.
    ///
    /// Rendering stops early if the processor signals it should no longer be
    /// kept alive; the returned channels then hold only the completed blocks.
    pub fn render_with_control<F>(
        &self,
        processor: &mut dyn Processor,
        quanta: usize,
        mut control: F,
    ) -> Vec<Vec<f32>>
    where
        F: FnMut(u64) -> Option<Vec<f32>>,
    {
        let channels = processor.channel_count() as usize;
        let mut rendered: Vec<Vec<f32>> =
            vec![Vec::with_capacity(quanta * RENDER_QUANTUM_FRAMES); channels];
        let mut block: Vec<Vec<f32>> = vec![vec![0.0; RENDER_QUANTUM_FRAMES]; channels];

        for quantum in 0..quanta {
            let current_frame = self.start_frame + (quantum * RENDER_QUANTUM_FRAMES) as u64;

            // The processor only overwrites in-range samples; the host
            // contract is that every destination block arrives zeroed.
            for channel in block.iter_mut() {
                channel.fill(0.0);
            }

            let control_data = control(current_frame);
            let keep_alive = match &control_data {
                Some(data) => processor.process(&[data.as_slice()], current_frame, &mut block),
                None => processor.process(&[], current_frame, &mut block),
            };

            for (rendered_channel, block_channel) in rendered.iter_mut().zip(block.iter()) {
                rendered_channel.extend_from_slice(block_channel);
            }

            if !keep_alive {
                break;
            }
        }

        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use crate::node::{ControlledBufferSource, TimedBufferSource};
    use crate::testutil::ramp;

    /// A processor that signals not-keep-alive after a fixed number of blocks.
    struct ExpiringProcessor {
        remaining: usize,
    }

    impl Processor for ExpiringProcessor {
        fn process(
            &mut self,
            _inputs: &[&[f32]],
            _current_frame: u64,
            output: &mut [Vec<f32>],
        ) -> bool {
            output[0].fill(1.0);
            self.remaining -= 1;
            self.remaining > 0
        }

        fn channel_count(&self) -> u16 {
            1
        }
    }

    #[test]
    fn test_renders_silence_without_buffer() {
        let config = SourceConfig::new(0, 1, vec![1]);
        let mut source = TimedBufferSource::new(config).expect("construction failed");

        let rendered = OfflineRenderer::new().render(&mut source, 3);

        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].len(), 3 * RENDER_QUANTUM_FRAMES);
        assert!(rendered[0].iter().all(|&sample| sample == 0.0));
    }

    #[test]
    fn test_renders_buffer_across_quanta() {
        let samples = ramp(384);
        let config = SourceConfig::new(0, 1, vec![1]).with_buffer(vec![samples.clone()]);
        let mut source = TimedBufferSource::new(config).expect("construction failed");

        let rendered = OfflineRenderer::new().render(&mut source, 3);

        assert_eq!(rendered[0], samples);
    }

    #[test]
    fn test_start_frame_offsets_playback() {
        let samples = ramp(384);
        let config = SourceConfig::new(0, 1, vec![1]).with_buffer(vec![samples.clone()]);
        let mut source = TimedBufferSource::new(config).expect("construction failed");

        let rendered = OfflineRenderer::new()
            .with_start_frame(128)
            .render(&mut source, 2);

        assert_eq!(rendered[0], samples[128..384]);
    }

    #[test]
    fn test_control_feed_retriggers_playback() {
        let samples = ramp(256);
        let config = SourceConfig::new(1, 1, vec![1])
            .with_buffer(vec![samples.clone()])
            .with_velocity(1);
        let mut source = ControlledBufferSource::new(config).expect("construction failed");

        // Re-anchor every block to its own start frame: each quantum restarts
        // playback from the head of the buffer.
        let rendered = OfflineRenderer::new().render_with_control(&mut source, 2, |frame| {
            Some(vec![0.0, frame as f32, 1.0])
        });

        assert_eq!(rendered[0][0..128], samples[0..128]);
        assert_eq!(rendered[0][128..256], samples[0..128]);
    }

    #[test]
    fn test_stops_when_processor_expires() {
        let mut processor = ExpiringProcessor { remaining: 2 };

        let rendered = OfflineRenderer::new().render(&mut processor, 5);

        assert_eq!(rendered[0].len(), 2 * RENDER_QUANTUM_FRAMES);
    }
}
