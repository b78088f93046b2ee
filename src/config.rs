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

//! Construction options for buffer sources.
//!
//! A [`SourceConfig`] describes the bus layout of a source together with the
//! optional sample data and playback anchor. Configs can be built in code or
//! parsed from YAML or JSON documents; malformed documents (a scalar where
//! the buffer belongs, a string position) fail with a typed parse error
//! before any source is constructed.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

mod error;

pub use error::ConfigError;

fn default_number_of_outputs() -> u32 {
    1
}

/// The construction options record for a buffer source.
#[derive(Deserialize, Clone, Serialize, Debug)]
pub struct SourceConfig {
    /// Number of input busses feeding the source.
    #[serde(default)]
    number_of_inputs: u32,

    /// Number of output busses. A buffer source always renders to exactly one.
    #[serde(default = "default_number_of_outputs")]
    number_of_outputs: u32,

    /// Channel count of the single output bus.
    output_channel_count: Option<Vec<u16>>,

    /// Planar sample data to play back, one float sequence per channel.
    #[serde(default)]
    buffer: Option<Vec<Vec<f32>>>,

    /// Buffer index that is valid when the frame counter reaches `timestamp`.
    #[serde(default)]
    position: i64,

    /// Frame-counter value at which `position` is the correct buffer index.
    #[serde(default)]
    timestamp: i64,

    /// Playback gate for sources with live control: 1 advances with real
    /// time, 0 holds at `position`.
    #[serde(default)]
    velocity: i64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            number_of_inputs: 0,
            number_of_outputs: default_number_of_outputs(),
            output_channel_count: None,
            buffer: None,
            position: 0,
            timestamp: 0,
            velocity: 0,
        }
    }
}

impl SourceConfig {
    /// Creates a config with the given bus layout.
    pub fn new(
        number_of_inputs: u32,
        number_of_outputs: u32,
        output_channel_count: Vec<u16>,
    ) -> Self {
        Self {
            number_of_inputs,
            number_of_outputs,
            output_channel_count: Some(output_channel_count),
            ..Default::default()
        }
    }

    /// Sets the sample data to play back.
    pub fn with_buffer(mut self, buffer: Vec<Vec<f32>>) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Sets the playback position.
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    /// Sets the anchor timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the playback gate.
    pub fn with_velocity(mut self, velocity: i64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Parses a config from a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(contents)?)
    }

    /// Parses a config from a JSON document.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Loads a config from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::from_yaml(&fs::read_to_string(path)?)?;

        debug!(
            path = %path.display(),
            channels = config.buffer.as_ref().map(|b| b.len()).unwrap_or(0),
            "Source config loaded"
        );

        Ok(config)
    }

    /// Gets the number of input busses.
    pub fn number_of_inputs(&self) -> u32 {
        self.number_of_inputs
    }

    /// Gets the number of output busses.
    pub fn number_of_outputs(&self) -> u32 {
        self.number_of_outputs
    }

    /// Gets the output channel count, if one was provided.
    pub fn output_channel_count(&self) -> Option<&[u16]> {
        self.output_channel_count.as_deref()
    }

    /// Gets the sample data, if any.
    pub fn buffer(&self) -> Option<&[Vec<f32>]> {
        self.buffer.as_deref()
    }

    /// Takes the sample data out of the config.
    pub fn into_buffer(self) -> Option<Vec<Vec<f32>>> {
        self.buffer
    }

    /// Gets the playback position.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Gets the anchor timestamp.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Gets the playback gate.
    pub fn velocity(&self) -> i64 {
        self.velocity
    }
}
