// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Arguments for draw-time device calls.

use crate::layout::Channel;
use crate::renderer::api::enums::PrimitiveTopology;

/// Where the device reads one vertex attribute from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSource<'a> {
    /// From the buffer currently bound to [`BufferTarget::Vertex`](super::BufferTarget::Vertex).
    Buffer {
        /// Byte offset of the first element.
        offset: u64,
        /// Distance in bytes between two consecutive elements.
        stride: u32,
    },
    /// From client memory that is read at draw time and never uploaded.
    Client {
        /// The encoded attribute bytes.
        data: &'a [u8],
        /// Distance in bytes between two consecutive elements.
        stride: u32,
    },
}

/// Where the device reads indices from for an indexed draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource<'a> {
    /// From the buffer currently bound to [`BufferTarget::Index`](super::BufferTarget::Index).
    Buffer {
        /// Byte offset of the first index.
        offset: u64,
    },
    /// From client memory.
    Client(&'a [u8]),
}

/// One command of an immediate-mode replay.
///
/// Attribute commands set the current value of a channel. Setting
/// [`Channel::Position`] emits a vertex using the current values of every
/// other channel, so positions are always sent last for each vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImmediateCommand {
    /// Starts a primitive batch.
    Begin(PrimitiveTopology),
    /// Sets the current value of a channel.
    Attribute {
        /// The channel being set.
        channel: Channel,
        /// Component values; only the first `components` are meaningful.
        value: [f32; 4],
        /// Number of meaningful components, `1..=4`.
        components: u8,
    },
    /// Ends the current primitive batch.
    End,
}

impl ImmediateCommand {
    /// Builds an attribute command from a slice of at most four components.
    pub fn attribute(channel: Channel, components: &[f32]) -> Self {
        let mut value = [0.0; 4];
        let count = components.len().min(4);
        value[..count].copy_from_slice(&components[..count]);
        ImmediateCommand::Attribute {
            channel,
            value,
            components: count as u8,
        }
    }

    /// Returns `true` if this command emits a vertex.
    pub fn emits_vertex(&self) -> bool {
        matches!(
            self,
            ImmediateCommand::Attribute {
                channel: Channel::Position,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_command_pads_missing_components() {
        let cmd = ImmediateCommand::attribute(Channel::TexCoord, &[0.25, 0.75]);
        assert_eq!(
            cmd,
            ImmediateCommand::Attribute {
                channel: Channel::TexCoord,
                value: [0.25, 0.75, 0.0, 0.0],
                components: 2,
            }
        );
        assert!(!cmd.emits_vertex());
        assert!(ImmediateCommand::attribute(Channel::Position, &[0.0; 3]).emits_vertex());
    }
}
