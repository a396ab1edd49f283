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

//! Opaque device handles and the descriptors used to create them.
//!
//! Every handle wraps a raw `u32` assigned by the device. The raw value `0` is
//! reserved: it is never handed out and means "nothing bound" inside the
//! bind-state trackers.

use std::borrow::Cow;

/// Common behaviour of every opaque device handle.
pub trait DeviceHandle: Copy + Eq + std::fmt::Debug {
    /// A short, human-readable name for the kind of resource (used in errors and logs).
    const KIND: &'static str;

    /// Returns the raw device value of the handle. Never `0` for a live resource.
    fn raw(self) -> u32;

    /// Rebuilds a handle from its raw device value.
    fn from_raw(raw: u32) -> Self;
}

macro_rules! device_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl DeviceHandle for $name {
            const KIND: &'static str = $kind;

            fn raw(self) -> u32 {
                self.0
            }

            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

device_handle!(
    /// An opaque handle to a device-resident buffer.
    BufferId,
    "buffer"
);
device_handle!(
    /// An opaque handle to a vertex array, the descriptor object that captures
    /// buffer bindings and attribute state so they can be restored with one bind.
    VertexArrayId,
    "vertex array"
);
device_handle!(
    /// An opaque handle to a device-resident texture.
    TextureId,
    "texture"
);
device_handle!(
    /// An opaque handle to a linked shader program.
    ProgramId,
    "program"
);

/// The binding point a buffer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Vertex,
    /// Element indices.
    Index,
}

impl BufferTarget {
    /// The number of distinct buffer targets.
    pub const COUNT: usize = 2;

    /// All targets, in tracking order.
    pub const ALL: [BufferTarget; Self::COUNT] = [BufferTarget::Vertex, BufferTarget::Index];

    /// Returns the dense index of this target, in `0..COUNT`.
    pub const fn index(self) -> usize {
        match self {
            BufferTarget::Vertex => 0,
            BufferTarget::Index => 1,
        }
    }
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// The binding point the buffer is created for.
    pub target: BufferTarget,
}

/// A descriptor used to create a [`TextureId`].
///
/// Image decoding happens outside this crate; the device receives raw texels.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label, usually the source filename.
    pub label: Option<Cow<'a, str>>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
}

/// A descriptor used to create a [`ProgramId`] from already-prepared stages.
#[derive(Debug, Clone)]
pub struct ProgramDescriptor<'a> {
    /// An optional debug label, usually the shader name.
    pub label: Option<Cow<'a, str>>,
    /// Vertex stage source or binary, handed to the backend untouched.
    pub vertex_stage: Cow<'a, [u8]>,
    /// Fragment stage source or binary, handed to the backend untouched.
    pub fragment_stage: Cow<'a, [u8]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_round_trips_raw_value() {
        let id = BufferId::from_raw(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(BufferId::KIND, "buffer");
        assert_eq!(VertexArrayId::KIND, "vertex array");
    }

    #[test]
    fn test_buffer_targets_have_dense_indices() {
        for (i, target) in BufferTarget::ALL.iter().enumerate() {
            assert_eq!(target.index(), i);
        }
    }
}
