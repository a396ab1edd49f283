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

use std::collections::BTreeMap;

use lattice_core::layout::{Channel, ChannelFormat};
use lattice_core::renderer::{
    BufferId, BufferTarget, ImmediateCommand, IndexFormat, PrimitiveTopology, ProgramId,
    TextureId, VertexArrayId,
};

/// The source of an attribute as it was handed to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedSource {
    /// Buffer-backed.
    Buffer {
        /// Byte offset.
        offset: u64,
        /// Stride in bytes.
        stride: u32,
    },
    /// Client memory of `len` bytes.
    Client {
        /// Length of the client slice.
        len: usize,
        /// Stride in bytes.
        stride: u32,
    },
}

/// One call received by a [`HeadlessDevice`](super::HeadlessDevice).
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// `create_buffer`.
    CreateBuffer {
        /// Assigned handle.
        id: BufferId,
        /// Size in bytes.
        size: u64,
        /// Target.
        target: BufferTarget,
    },
    /// `write_buffer`.
    WriteBuffer {
        /// Destination.
        id: BufferId,
        /// Offset in bytes.
        offset: u64,
        /// Length in bytes.
        len: usize,
    },
    /// `destroy_buffer`.
    DestroyBuffer(BufferId),
    /// `create_vertex_array`.
    CreateVertexArray(VertexArrayId),
    /// `destroy_vertex_array`.
    DestroyVertexArray(VertexArrayId),
    /// `create_texture`.
    CreateTexture(TextureId),
    /// `destroy_texture`.
    DestroyTexture(TextureId),
    /// `create_program`.
    CreateProgram(ProgramId),
    /// `destroy_program`.
    DestroyProgram(ProgramId),
    /// `bind_vertex_array`.
    BindVertexArray(Option<VertexArrayId>),
    /// `bind_buffer`.
    BindBuffer {
        /// Target.
        target: BufferTarget,
        /// Bound buffer.
        id: Option<BufferId>,
    },
    /// `set_attribute_enabled`.
    SetAttributeEnabled {
        /// Slot.
        slot: u32,
        /// New state.
        enabled: bool,
    },
    /// `set_attribute_source`.
    SetAttributeSource {
        /// Slot.
        slot: u32,
        /// Format.
        format: ChannelFormat,
        /// Source.
        source: RecordedSource,
    },
    /// `bind_texture`.
    BindTexture {
        /// Unit.
        unit: u32,
        /// Bound texture.
        id: Option<TextureId>,
    },
    /// `use_program`.
    UseProgram(Option<ProgramId>),
    /// `set_uniform_bool`.
    SetUniformBool {
        /// Program.
        program: ProgramId,
        /// Uniform name.
        name: String,
        /// Value.
        value: bool,
    },
    /// `draw`.
    Draw {
        /// Topology.
        topology: PrimitiveTopology,
        /// First vertex.
        first: u32,
        /// Vertex count.
        count: u32,
    },
    /// `draw_indexed`.
    DrawIndexed {
        /// Topology.
        topology: PrimitiveTopology,
        /// Index count.
        count: u32,
        /// Index format.
        format: IndexFormat,
        /// Byte offset into the bound index buffer, `None` for client indices.
        offset: Option<u64>,
    },
    /// `immediate`.
    Immediate(ImmediateCommand),
}

impl DeviceCall {
    /// Returns `true` for calls that change bind state.
    pub fn is_bind(&self) -> bool {
        matches!(
            self,
            DeviceCall::BindVertexArray(_)
                | DeviceCall::BindBuffer { .. }
                | DeviceCall::SetAttributeEnabled { .. }
                | DeviceCall::BindTexture { .. }
                | DeviceCall::UseProgram(_)
        )
    }

    /// Returns `true` for calls that allocate a device resource.
    pub fn is_allocation(&self) -> bool {
        matches!(
            self,
            DeviceCall::CreateBuffer { .. }
                | DeviceCall::CreateVertexArray(_)
                | DeviceCall::CreateTexture(_)
                | DeviceCall::CreateProgram(_)
        )
    }

    /// Returns `true` for calls that submit primitives.
    pub fn is_draw(&self) -> bool {
        matches!(self, DeviceCall::Draw { .. } | DeviceCall::DrawIndexed { .. })
            || matches!(self, DeviceCall::Immediate(ImmediateCommand::End))
    }
}

/// Attribute values of one vertex as seen by a draw, keyed by attribute slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedVertex {
    /// Decoded values per enabled slot.
    pub attributes: BTreeMap<u32, Vec<f32>>,
}

impl FetchedVertex {
    /// Values fetched for `slot`.
    pub fn slot(&self, slot: u32) -> Option<&[f32]> {
        self.attributes.get(&slot).map(Vec::as_slice)
    }

    /// Values fetched for `channel` through its attribute slot.
    pub fn channel(&self, channel: Channel) -> Option<&[f32]> {
        self.slot(channel.attribute_slot())
    }
}

/// A completed draw with the state it ran under.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessDraw {
    /// Topology.
    pub topology: PrimitiveTopology,
    /// Vertices or indices submitted.
    pub element_count: u32,
    /// Index format for indexed draws.
    pub index_format: Option<IndexFormat>,
    /// Program in use.
    pub program: Option<ProgramId>,
    /// Vertex array bound, `None` for the default one.
    pub vertex_array: Option<VertexArrayId>,
    /// Non-empty texture units.
    pub textures: Vec<(u32, TextureId)>,
    /// Vertices in submission order.
    pub vertices: Vec<FetchedVertex>,
}

impl HeadlessDraw {
    /// Values of `channel` for every vertex, in order.
    pub fn channel_values(&self, channel: Channel) -> Vec<Vec<f32>> {
        self.vertices
            .iter()
            .map(|v| v.channel(channel).map(<[f32]>::to_vec).unwrap_or_default())
            .collect()
    }
}
