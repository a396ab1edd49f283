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

//! # Lattice Lanes
//!
//! The hot path between a mesh and the device:
//!
//! - [`build_lane`] encodes mesh segments for a storage strategy.
//! - [`bind_lane`] elides redundant device binds.
//! - [`render_lane`] owns renderables, their draw call lists and draw ordering.
//!
//! Everything runs on the render thread against one [`RenderContext`].

#![warn(missing_docs)]

pub mod bind_lane;
pub mod build_lane;
pub mod context;
pub mod error;
pub mod render_lane;

pub use bind_lane::BindState;
pub use build_lane::{fill, FillOptions, FilledMesh, SegmentSpan, VertexData};
pub use context::RenderContext;
pub use error::BuildError;
pub use render_lane::{DrawCallList, DrawRecord, RenderQueue, Renderable};
