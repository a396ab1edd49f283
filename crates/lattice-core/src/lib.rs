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

//! # Lattice Core
//!
//! Foundational crate containing the contracts shared by every layer of the
//! renderable build & bind pipeline:
//!
//! - [`renderer`]: opaque device handles, the [`RenderDevice`] trait, settings,
//!   frame statistics and error types.
//! - [`geometry`]: the backend-agnostic mesh description consumed by builds.
//! - [`layout`]: vertex channel formats, layout descriptors and the buffer
//!   layout calculator.

#![warn(missing_docs)]

pub mod geometry;
pub mod layout;
pub mod renderer;

pub use geometry::{MaterialRef, Mesh, Segment, TextureBinding};
pub use layout::{
    Channel, ChannelFormat, Encoding, InterleavedLayout, LayoutDescriptor, PerChannelLayout,
};
pub use renderer::{DeviceError, RenderDevice, RenderSettings};
