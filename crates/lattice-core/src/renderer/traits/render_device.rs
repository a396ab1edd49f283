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

use crate::layout::ChannelFormat;
use crate::renderer::api::*;
use crate::renderer::error::DeviceError;
use std::fmt::Debug;

/// The device-facing half of the pipeline.
///
/// Resource creation and destruction can fail and return a [`DeviceError`].
/// State changes and draws are infallible: they mirror a stateful graphics
/// context where the last bound handle of each slot is what subsequent calls
/// use. Callers are expected to route every state change through bind state
/// so that redundant calls never reach the device.
///
/// While a vertex array is bound, attribute enables, attribute sources and the
/// [`BufferTarget::Index`] binding are recorded into it. Binding another
/// vertex array swaps all of them at once.
pub trait RenderDevice: Send + Sync + Debug {
    /// Allocates a zero-filled buffer.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, DeviceError>;

    /// Copies `data` into the buffer starting at `offset` bytes.
    /// ## Errors
    /// * `DeviceError::OutOfBounds` - If the write does not fit in the buffer.
    /// * `DeviceError::InvalidHandle` - If `id` is not a live buffer.
    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), DeviceError>;

    /// Releases a buffer.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), DeviceError>;

    /// Creates an empty vertex array.
    fn create_vertex_array(&self) -> Result<VertexArrayId, DeviceError>;

    /// Releases a vertex array. Buffers it references are not affected.
    fn destroy_vertex_array(&self, id: VertexArrayId) -> Result<(), DeviceError>;

    /// Creates a texture from raw texels.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        texels: &[u8],
    ) -> Result<TextureId, DeviceError>;

    /// Releases a texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), DeviceError>;

    /// Links a program from already prepared stages.
    fn create_program(&self, descriptor: &ProgramDescriptor) -> Result<ProgramId, DeviceError>;

    /// Releases a program.
    fn destroy_program(&self, id: ProgramId) -> Result<(), DeviceError>;

    /// Binds a vertex array, or the default one when `None`.
    fn bind_vertex_array(&self, id: Option<VertexArrayId>);

    /// Binds a buffer to a target, or clears the target when `None`.
    fn bind_buffer(&self, target: BufferTarget, id: Option<BufferId>);

    /// Enables or disables an attribute slot.
    fn set_attribute_enabled(&self, slot: u32, enabled: bool);

    /// Points an attribute slot at its data.
    ///
    /// A [`AttributeSource::Buffer`] source captures the buffer currently bound
    /// to [`BufferTarget::Vertex`].
    fn set_attribute_source(&self, slot: u32, format: ChannelFormat, source: AttributeSource<'_>);

    /// Binds a texture to a unit, or clears the unit when `None`.
    fn bind_texture(&self, unit: u32, id: Option<TextureId>);

    /// Makes a program current, or falls back to fixed-function when `None`.
    fn use_program(&self, id: Option<ProgramId>);

    /// Writes a boolean uniform of `program`.
    fn set_uniform_bool(&self, program: ProgramId, name: &str, value: bool);

    /// Draws `count` consecutive vertices starting at `first`.
    fn draw(&self, topology: PrimitiveTopology, first: u32, count: u32);

    /// Draws `count` indices read from `source`.
    fn draw_indexed(
        &self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        source: IndexSource<'_>,
    );

    /// Executes one immediate-mode command.
    fn immediate(&self, command: &ImmediateCommand);
}
