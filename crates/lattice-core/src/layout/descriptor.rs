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

/// Value description of the channels a mesh carries.
///
/// Two descriptors are equal iff every channel has the same presence,
/// component count and encoding, which makes the descriptor usable as a pool key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayoutDescriptor {
    channels: [Option<ChannelFormat>; Channel::COUNT],
}

impl LayoutDescriptor {
    /// Creates a descriptor with no channels.
    pub const fn empty() -> Self {
        Self {
            channels: [None; Channel::COUNT],
        }
    }

    /// Returns the descriptor with `channel` set to `format`.
    pub const fn with(mut self, channel: Channel, format: ChannelFormat) -> Self {
        self.channels[channel.index()] = Some(format);
        self
    }

    /// Sets or clears one channel.
    pub fn set(&mut self, channel: Channel, format: Option<ChannelFormat>) {
        self.channels[channel.index()] = format;
    }

    /// Returns the format of `channel`, if present.
    pub const fn get(&self, channel: Channel) -> Option<ChannelFormat> {
        self.channels[channel.index()]
    }

    /// Returns `true` if `channel` is present.
    pub const fn has(&self, channel: Channel) -> bool {
        self.channels[channel.index()].is_some()
    }

    /// Iterates the present channels in [`Channel::ORDER`].
    pub fn present(&self) -> impl Iterator<Item = (Channel, ChannelFormat)> + '_ {
        Channel::ORDER
            .iter()
            .filter_map(|&channel| self.get(channel).map(|format| (channel, format)))
    }

    /// Returns the number of present channels.
    pub fn channel_count(&self) -> usize {
        self.channels.iter().flatten().count()
    }

    /// Returns `true` if no channel is present.
    pub fn is_empty(&self) -> bool {
        self.channel_count() == 0
    }

    /// Returns the sum of the byte widths of every present channel.
    pub fn vertex_width(&self) -> u32 {
        self.present().map(|(_, format)| format.byte_width()).sum()
    }

    /// Returns the first channel, in [`Channel::ORDER`], on which two descriptors differ.
    pub fn first_difference(&self, other: &LayoutDescriptor) -> Option<Channel> {
        Channel::ORDER
            .iter()
            .copied()
            .find(|&channel| self.get(channel) != other.get(channel))
    }
}
