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

//! Vertex channel shapes and the byte layouts derived from them.
//!
//! A [`LayoutDescriptor`] says which channels a mesh carries and how each one is
//! encoded. [`InterleavedLayout`] and [`PerChannelLayout`] turn a descriptor into
//! offsets, strides and buffer sizes. Channels are always visited in
//! [`Channel::ORDER`], so the same descriptor always yields the same layout.

mod calculator;
mod channel;
mod descriptor;

pub use self::calculator::{ChannelExtent, ChannelPlacement, InterleavedLayout, PerChannelLayout};
pub use self::channel::{Channel, ChannelFormat, Encoding};
pub use self::descriptor::LayoutDescriptor;
