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

//! Errors raised while building a renderable or replaying its draws.

use lattice_core::layout::Channel;
use lattice_core::renderer::{DeviceError, GeometryError, IndexFormat, PoolId};
use lattice_data::PoolError;
use thiserror::Error;

/// A fatal build or replay failure. Nothing in this crate retries.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The mesh data disagrees with its declared channels.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// The layout hint attached to a mesh describes a different shape.
    #[error("mesh '{mesh}': layout {layout} disagrees with the mesh on channel {channel}")]
    ChannelMismatch {
        /// Mesh label.
        mesh: String,
        /// The hinted layout identity.
        layout: PoolId,
        /// First channel on which they differ.
        channel: Channel,
    },
    /// An index does not fit the configured index format.
    #[error("mesh '{mesh}' segment {segment}: index {index} does not fit {format:?}")]
    IndexOverflow {
        /// Mesh label.
        mesh: String,
        /// Segment index.
        segment: usize,
        /// The rebased index value.
        index: u64,
        /// The format it had to fit.
        format: IndexFormat,
    },
    /// The mesh emits more vertices than a draw can address.
    #[error("mesh '{mesh}': {count} vertices exceed the addressable range")]
    TooManyVertices {
        /// Mesh label.
        mesh: String,
        /// Emitted vertex count.
        count: u64,
    },
    /// A segment names a shader that is not pooled.
    #[error("mesh '{mesh}' segment {segment}: shader '{name}' is not loaded")]
    UnresolvedShader {
        /// Mesh label.
        mesh: String,
        /// Segment index.
        segment: usize,
        /// Shader name.
        name: String,
    },
    /// A segment names a texture that is not pooled.
    #[error("mesh '{mesh}' segment {segment}: texture '{file}' for unit {slot} is not loaded")]
    UnresolvedTexture {
        /// Mesh label.
        mesh: String,
        /// Segment index.
        segment: usize,
        /// Texture unit.
        slot: u32,
        /// Texture filename.
        file: String,
    },
    /// A segment binds a texture to a unit bind state does not track.
    #[error("mesh '{mesh}' segment {segment}: texture unit {slot} exceeds the {units} configured units")]
    TextureUnitOutOfRange {
        /// Mesh label.
        mesh: String,
        /// Segment index.
        segment: usize,
        /// Requested unit.
        slot: u32,
        /// Configured unit count.
        units: u32,
    },
    /// A pool lookup failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The device rejected an allocation or upload.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}
