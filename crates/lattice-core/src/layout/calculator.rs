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

use super::channel::{Channel, ChannelFormat};
use super::descriptor::LayoutDescriptor;

/// Where one channel lives inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPlacement {
    /// The channel.
    pub channel: Channel,
    /// Its format.
    pub format: ChannelFormat,
    /// Byte offset from the start of the vertex.
    pub offset: u32,
}

/// Offsets and stride of a single buffer holding every channel of each vertex.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterleavedLayout {
    stride: u32,
    placements: Vec<ChannelPlacement>,
}

impl InterleavedLayout {
    /// Lays out the present channels of `descriptor` back to back.
    ///
    /// Each offset is the running width of the channels before it, so offsets are
    /// strictly increasing and the stride equals the sum of the channel widths.
    pub fn compute(descriptor: &LayoutDescriptor) -> Self {
        let mut stride = 0;
        let placements = descriptor
            .present()
            .map(|(channel, format)| {
                let offset = stride;
                stride += format.byte_width();
                ChannelPlacement {
                    channel,
                    format,
                    offset,
                }
            })
            .collect();
        Self { stride, placements }
    }

    /// Bytes between two consecutive vertices.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Present channels in layout order.
    pub fn placements(&self) -> &[ChannelPlacement] {
        &self.placements
    }

    /// Returns the byte offset of `channel`, if present.
    pub fn offset_of(&self, channel: Channel) -> Option<u32> {
        self.placements
            .iter()
            .find(|p| p.channel == channel)
            .map(|p| p.offset)
    }

    /// Returns the size of a buffer holding `vertex_count` vertices.
    pub fn buffer_size(&self, vertex_count: usize) -> u64 {
        u64::from(self.stride) * vertex_count as u64
    }

    /// Returns `true` if the layout has no channels.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Size of one tightly packed per-channel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelExtent {
    /// The channel.
    pub channel: Channel,
    /// Its format.
    pub format: ChannelFormat,
    /// Size of the buffer in bytes.
    pub size: u64,
}

/// Buffer sizes for a layout that stores each channel in its own buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PerChannelLayout {
    extents: Vec<ChannelExtent>,
}

impl PerChannelLayout {
    /// Computes `byte_width × vertex_count` for every present channel.
    pub fn compute(descriptor: &LayoutDescriptor, vertex_count: usize) -> Self {
        let extents = descriptor
            .present()
            .map(|(channel, format)| ChannelExtent {
                channel,
                format,
                size: u64::from(format.byte_width()) * vertex_count as u64,
            })
            .collect();
        Self { extents }
    }

    /// Present channels in layout order.
    pub fn extents(&self) -> &[ChannelExtent] {
        &self.extents
    }

    /// Returns the buffer size of `channel`, if present.
    pub fn size_of(&self, channel: Channel) -> Option<u64> {
        self.extents
            .iter()
            .find(|e| e.channel == channel)
            .map(|e| e.size)
    }

    /// Returns the combined size of every channel buffer.
    pub fn total_size(&self) -> u64 {
        self.extents.iter().map(|e| e.size).sum()
    }
}
