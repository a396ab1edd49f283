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

use serde::{Deserialize, Serialize};
use std::fmt;

/// A per-vertex attribute channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// Vertex color.
    Color,
    /// Surface normal.
    Normal,
    /// Texture coordinates.
    TexCoord,
    /// Vertex position.
    Position,
}

impl Channel {
    /// Number of channels.
    pub const COUNT: usize = 4;

    /// The fixed order in which channels are laid out, filled and emitted.
    pub const ORDER: [Channel; Self::COUNT] = [
        Channel::Color,
        Channel::Normal,
        Channel::TexCoord,
        Channel::Position,
    ];

    /// Returns the position of this channel in [`Channel::ORDER`].
    pub const fn index(self) -> usize {
        match self {
            Channel::Color => 0,
            Channel::Normal => 1,
            Channel::TexCoord => 2,
            Channel::Position => 3,
        }
    }

    /// Returns the vertex attribute slot this channel is bound to.
    pub const fn attribute_slot(self) -> u32 {
        match self {
            Channel::Position => 0,
            Channel::Normal => 1,
            Channel::Color => 2,
            Channel::TexCoord => 3,
        }
    }

    /// Returns a lowercase name for logs and errors.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Color => "color",
            Channel::Normal => "normal",
            Channel::TexCoord => "texcoord",
            Channel::Position => "position",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The numeric encoding of a single component on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Encoding {
    /// 32-bit float.
    #[default]
    Float32,
    /// 64-bit float.
    Float64,
    /// Signed 16-bit integer, rounded and clamped.
    Int16,
    /// Signed 32-bit integer, rounded and clamped.
    Int32,
    /// Unsigned 8-bit integer normalized from `[0, 1]`.
    Unorm8,
}

impl Encoding {
    /// Returns the size in bytes of one component.
    pub const fn size(self) -> u32 {
        match self {
            Encoding::Float32 | Encoding::Int32 => 4,
            Encoding::Float64 => 8,
            Encoding::Int16 => 2,
            Encoding::Unorm8 => 1,
        }
    }

    /// Returns `true` if the device should map integer values back to `[0, 1]`.
    pub const fn normalized(self) -> bool {
        matches!(self, Encoding::Unorm8)
    }
}

/// How one channel is stored: component count and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelFormat {
    /// Components per vertex, `1..=4`.
    pub components: u8,
    /// Encoding of each component.
    pub encoding: Encoding,
}

impl ChannelFormat {
    /// Creates a format.
    pub const fn new(components: u8, encoding: Encoding) -> Self {
        Self {
            components,
            encoding,
        }
    }

    /// Creates a `Float32` format.
    pub const fn float32(components: u8) -> Self {
        Self::new(components, Encoding::Float32)
    }

    /// Returns the width of one vertex worth of this channel, in bytes.
    pub const fn byte_width(self) -> u32 {
        self.components as u32 * self.encoding.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_index_matches_position_in_order() {
        for (i, channel) in Channel::ORDER.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }

    #[test]
    fn test_attribute_slots_are_distinct() {
        let mut slots: Vec<u32> = Channel::ORDER.iter().map(|c| c.attribute_slot()).collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![0, 1, 2, 3]);
        assert_eq!(Channel::Position.attribute_slot(), 0);
    }

    #[test]
    fn test_byte_width_multiplies_components_by_encoding() {
        assert_eq!(ChannelFormat::float32(3).byte_width(), 12);
        assert_eq!(ChannelFormat::new(4, Encoding::Unorm8).byte_width(), 4);
        assert_eq!(ChannelFormat::new(2, Encoding::Float64).byte_width(), 16);
        assert_eq!(ChannelFormat::new(3, Encoding::Int16).byte_width(), 6);
    }
}
