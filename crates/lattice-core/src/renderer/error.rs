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

//! Defines the error types shared by every layer of the pipeline.

use thiserror::Error;

use crate::layout::Channel;

/// An error reported by a [`RenderDevice`](super::RenderDevice) while managing resources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The handle does not refer to a live resource of the expected kind.
    #[error("invalid {kind} handle {id}")]
    InvalidHandle {
        /// The kind of resource, e.g. `"buffer"`.
        kind: &'static str,
        /// The raw handle value.
        id: u32,
    },
    /// The device could not satisfy an allocation.
    #[error("out of device memory: requested {requested} bytes, {available} available")]
    OutOfMemory {
        /// Bytes requested.
        requested: u64,
        /// Bytes still available.
        available: u64,
    },
    /// A write does not fit inside the destination buffer.
    #[error("write of {len} bytes at offset {offset} overflows buffer {id} of {size} bytes")]
    OutOfBounds {
        /// The raw buffer handle.
        id: u32,
        /// Write offset in bytes.
        offset: u64,
        /// Write length in bytes.
        len: u64,
        /// Buffer size in bytes.
        size: u64,
    },
    /// A backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// A mesh whose data does not agree with its declared channel shape.
///
/// Every variant names the mesh and, where relevant, the segment and channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A channel declared by the mesh has no data in a segment.
    #[error("mesh '{mesh}' segment {segment}: channel {channel} is declared but missing")]
    MissingChannel {
        /// Mesh label.
        mesh: String,
        /// Segment index.
        segment: usize,
        /// The missing channel.
        channel: Channel,
    },
    /// A segment carries data for a channel the mesh does not declare.
    #[error("mesh '{mesh}' segment {segment}: channel {channel} has data but is not declared")]
    UnexpectedChannel {
        /// Mesh label.
        mesh: String,
        /// Segment index.
        segment: usize,
        /// The undeclared channel.
        channel: Channel,
    },
    /// A channel array does not hold exactly `vertex_count × components` floats.
    #[error(
        "mesh '{mesh}' segment {segment}: channel {channel} holds {actual} floats, expected {expected}"
    )]
    ChannelLength {
        /// Mesh label.
        mesh: String,
        /// Segment index.
        segment: usize,
        /// The offending channel.
        channel: Channel,
        /// Expected number of floats.
        expected: usize,
        /// Actual number of floats.
        actual: usize,
    },
    /// A channel is declared with a component count outside `1..=4`.
    #[error("mesh '{mesh}': channel {channel} declares {components} components")]
    BadComponentCount {
        /// Mesh label.
        mesh: String,
        /// The offending channel.
        channel: Channel,
        /// Declared component count.
        components: u8,
    },
    /// An index refers past the end of its segment.
    #[error("mesh '{mesh}' segment {segment}: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Mesh label.
        mesh: String,
        /// Segment index.
        segment: usize,
        /// The offending index value.
        index: u32,
        /// Number of vertices in the segment.
        vertex_count: usize,
    },
}

impl GeometryError {
    /// Returns the label of the mesh the error was raised for.
    pub fn mesh(&self) -> &str {
        match self {
            GeometryError::MissingChannel { mesh, .. }
            | GeometryError::UnexpectedChannel { mesh, .. }
            | GeometryError::ChannelLength { mesh, .. }
            | GeometryError::BadComponentCount { mesh, .. }
            | GeometryError::IndexOutOfRange { mesh, .. } => mesh,
        }
    }
}

/// An error raised while loading or validating [`RenderSettings`](super::RenderSettings).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The RON text could not be parsed.
    #[error("failed to parse render settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The settings could not be serialized.
    #[error("failed to serialize render settings: {0}")]
    Serialize(#[from] ron::Error),
    /// At least one texture unit is required.
    #[error("max_texture_units must be at least 1")]
    NoTextureUnits,
    /// The textured window covers units that do not exist.
    #[error("textured_unit_window {window} exceeds max_texture_units {units}")]
    TextureWindowTooLarge {
        /// Configured window.
        window: u32,
        /// Configured unit count.
        units: u32,
    },
    /// Not every channel's attribute slot can be tracked.
    #[error("max_attribute_slots {slots} is below the {required} slots used by vertex channels")]
    TooFewAttributeSlots {
        /// Configured slot count.
        slots: u32,
        /// Minimum slot count.
        required: u32,
    },
    /// The texture flag uniform has no name.
    #[error("texture_flag_uniform must not be empty")]
    EmptyUniformName,
}
