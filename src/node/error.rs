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

/// Error types for source construction. Each validation failure is a
/// distinct variant so callers can tell them apart without string matching.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Expected {expected} input(s), got {actual}")]
    WrongInputCount { expected: u32, actual: u32 },

    #[error("Expected exactly 1 output, got {actual}")]
    WrongOutputCount { actual: u32 },

    #[error("The output channel count must have exactly one entry equal to {expected}")]
    ChannelCountMismatch { expected: usize },

    #[error("The velocity must be either 0 or 1, got {0}")]
    InvalidVelocity(i64),
}
