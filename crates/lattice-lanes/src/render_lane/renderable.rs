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

//! The per-mesh facade tying layout resolution, filling, upload and replay together.

use std::borrow::Cow;

use lattice_core::geometry::{MaterialRef, Mesh};
use lattice_core::layout::ChannelFormat;
use lattice_core::renderer::{
    AttributeSource, BufferDescriptor, BufferId, BufferTarget, DeviceError, ImmediateCommand,
    IndexFormat, IndexMode, IndexSource, PoolId, PrimitiveTopology, RenderDevice, RenderSettings,
    StorageStrategy, VertexArrayId,
};

use super::draw_call::{DrawCallList, DrawRecord};
use crate::bind_lane::BindState;
use crate::build_lane::{fill, FillOptions, FilledMesh, IndexData, SegmentSpan, VertexData};
use crate::context::RenderContext;
use crate::error::BuildError;

/// One attribute slot fed from client memory.
#[derive(Debug, Clone, Copy)]
struct AttributeBinding<'a> {
    slot: u32,
    format: ChannelFormat,
    source: AttributeSource<'a>,
}

/// Attribute bindings of vertex data kept in client memory.
fn client_bindings(vertices: &VertexData) -> Vec<AttributeBinding<'_>> {
    match vertices {
        VertexData::Interleaved { layout, bytes } => layout
            .placements()
            .iter()
            .map(|placement| AttributeBinding {
                slot: placement.channel.attribute_slot(),
                format: placement.format,
                source: AttributeSource::Client {
                    data: bytes.get(placement.offset as usize..).unwrap_or_default(),
                    stride: layout.stride(),
                },
            })
            .collect(),
        VertexData::PerChannel(streams) => streams
            .iter()
            .map(|stream| AttributeBinding {
                slot: stream.channel.attribute_slot(),
                format: stream.format,
                source: AttributeSource::Client {
                    data: &stream.bytes,
                    stride: stream.format.byte_width(),
                },
            })
            .collect(),
        VertexData::Empty | VertexData::Immediate(_) => Vec::new(),
    }
}

/// Byte blobs that back vertex buffers, in upload order.
fn vertex_blobs(vertices: &VertexData) -> Vec<&[u8]> {
    match vertices {
        VertexData::Interleaved { bytes, .. } => vec![bytes.as_slice()],
        VertexData::PerChannel(streams) => streams.iter().map(|s| s.bytes.as_slice()).collect(),
        VertexData::Empty | VertexData::Immediate(_) => Vec::new(),
    }
}

/// Enables exactly `slots` among the tracked attribute slots.
fn enable_exactly(device: &dyn RenderDevice, binds: &mut BindState, slots: &[u32]) {
    for slot in 0..binds.attribute_slots() {
        binds.set_attribute_enabled(device, slot, slots.contains(&slot));
    }
}

#[derive(Debug, Clone, Copy)]
struct VertexBinding {
    buffer: BufferId,
    slot: u32,
    format: ChannelFormat,
    offset: u64,
    stride: u32,
}

#[derive(Debug, Clone, Copy)]
struct IndexBuffer {
    id: BufferId,
    format: IndexFormat,
    size: u64,
}

/// Device resources owned by a buffered renderable.
#[derive(Debug, Default)]
struct DeviceBuffers {
    vertex_buffers: Vec<(BufferId, u64)>,
    bindings: Vec<VertexBinding>,
    index: Option<IndexBuffer>,
    vertex_array: Option<VertexArrayId>,
}

impl DeviceBuffers {
    /// Uploads `vertices` and `indices`, releasing partial allocations on failure.
    fn upload(
        ctx: &mut RenderContext,
        label: &str,
        vertices: &VertexData,
        indices: Option<&IndexData>,
        vertex_array: bool,
    ) -> Result<Self, BuildError> {
        let mut buffers = Self::default();
        let device = ctx.device.as_ref();
        if let Err(e) = buffers.allocate(device, &mut ctx.binds, label, vertices, indices, vertex_array) {
            buffers.release(device, &mut ctx.binds);
            return Err(e);
        }
        Ok(buffers)
    }

    fn allocate(
        &mut self,
        device: &dyn RenderDevice,
        binds: &mut BindState,
        label: &str,
        vertices: &VertexData,
        indices: Option<&IndexData>,
        vertex_array: bool,
    ) -> Result<(), BuildError> {
        for blob in vertex_blobs(vertices) {
            let id = device.create_buffer(&BufferDescriptor {
                label: Some(Cow::Owned(format!("{label}.vertices"))),
                size: blob.len() as u64,
                target: BufferTarget::Vertex,
            })?;
            self.vertex_buffers.push((id, blob.len() as u64));
            device.write_buffer(id, 0, blob)?;
        }

        match vertices {
            VertexData::Interleaved { layout, .. } => {
                if let Some(&(buffer, _)) = self.vertex_buffers.first() {
                    self.bindings = layout
                        .placements()
                        .iter()
                        .map(|placement| VertexBinding {
                            buffer,
                            slot: placement.channel.attribute_slot(),
                            format: placement.format,
                            offset: u64::from(placement.offset),
                            stride: layout.stride(),
                        })
                        .collect();
                }
            }
            VertexData::PerChannel(streams) => {
                self.bindings = streams
                    .iter()
                    .zip(&self.vertex_buffers)
                    .map(|(stream, &(buffer, _))| VertexBinding {
                        buffer,
                        slot: stream.channel.attribute_slot(),
                        format: stream.format,
                        offset: 0,
                        stride: stream.format.byte_width(),
                    })
                    .collect();
            }
            VertexData::Empty | VertexData::Immediate(_) => {}
        }

        if let Some(indices) = indices {
            let size = indices.bytes.len() as u64;
            let id = device.create_buffer(&BufferDescriptor {
                label: Some(Cow::Owned(format!("{label}.indices"))),
                size,
                target: BufferTarget::Index,
            })?;
            self.index = Some(IndexBuffer {
                id,
                format: indices.format,
                size,
            });
            device.write_buffer(id, 0, &indices.bytes)?;
        }

        if vertex_array {
            let id = device.create_vertex_array()?;
            self.vertex_array = Some(id);
            binds.bind_vertex_array(device, Some(id));
            self.bind_sources(device, binds);
            binds.bind_vertex_array(device, None);
        }
        Ok(())
    }

    /// Binds every buffer and attribute source into the current vertex array.
    fn bind_sources(&self, device: &dyn RenderDevice, binds: &mut BindState) {
        for binding in &self.bindings {
            binds.bind_buffer(device, BufferTarget::Vertex, Some(binding.buffer));
            // Buffer sources latch the vertex buffer bound at this point.
            device.set_attribute_source(
                binding.slot,
                binding.format,
                AttributeSource::Buffer {
                    offset: binding.offset,
                    stride: binding.stride,
                },
            );
        }
        let slots: Vec<u32> = self.bindings.iter().map(|b| b.slot).collect();
        enable_exactly(device, binds, &slots);
        binds.bind_buffer(device, BufferTarget::Index, self.index.map(|i| i.id));
    }

    fn can_rewrite(&self, vertices: &VertexData, indices: Option<&IndexData>) -> bool {
        let blobs = vertex_blobs(vertices);
        let same_vertices = blobs.len() == self.vertex_buffers.len()
            && blobs
                .iter()
                .zip(&self.vertex_buffers)
                .all(|(blob, &(_, size))| blob.len() as u64 == size);
        let same_indices = match (self.index, indices) {
            (None, None) => true,
            (Some(current), Some(new)) => {
                current.format == new.format && current.size == new.bytes.len() as u64
            }
            _ => false,
        };
        same_vertices && same_indices
    }

    fn rewrite(
        &self,
        device: &dyn RenderDevice,
        vertices: &VertexData,
        indices: Option<&IndexData>,
    ) -> Result<(), DeviceError> {
        for (blob, &(id, _)) in vertex_blobs(vertices).into_iter().zip(&self.vertex_buffers) {
            device.write_buffer(id, 0, blob)?;
        }
        if let (Some(current), Some(new)) = (self.index, indices) {
            device.write_buffer(current.id, 0, &new.bytes)?;
        }
        Ok(())
    }

    fn release(self, device: &dyn RenderDevice, binds: &mut BindState) {
        if let Some(id) = self.vertex_array {
            binds.invalidate_vertex_array(id);
            if let Err(e) = device.destroy_vertex_array(id) {
                log::warn!("Failed to destroy vertex array {id:?}: {e}");
            }
        }
        let index = self.index.map(|i| i.id);
        for id in self.vertex_buffers.into_iter().map(|(id, _)| id).chain(index) {
            binds.invalidate_buffer(id);
            if let Err(e) = device.destroy_buffer(id) {
                log::warn!("Failed to destroy buffer {id:?}: {e}");
            }
        }
    }
}

#[derive(Debug)]
enum Payload {
    Empty,
    Immediate(Vec<Vec<ImmediateCommand>>),
    Client {
        vertices: VertexData,
        indices: Option<IndexData>,
    },
    Buffers(DeviceBuffers),
}

/// What decides whether a data update needs a new draw call list.
#[derive(Debug, Clone, PartialEq)]
struct Structure {
    spans: Vec<SegmentSpan>,
    segments: Vec<(PrimitiveTopology, Option<MaterialRef>)>,
}

impl Structure {
    fn of(mesh: &Mesh, spans: &[SegmentSpan]) -> Self {
        Self {
            spans: spans.to_vec(),
            segments: mesh
                .segments()
                .iter()
                .map(|s| (s.topology(), s.material().cloned()))
                .collect(),
        }
    }
}

#[derive(Debug)]
struct Storage {
    layout_id: PoolId,
    structure: Structure,
    draws: DrawCallList,
    payload: Payload,
}

/// A mesh prepared for drawing with one storage strategy.
///
/// The lifecycle is `create` → any number of `update` and `render` → `destroy`.
/// `destroy` is idempotent and also safe on a renderable that was never
/// created. Resources are not released on drop; call `destroy` first.
#[derive(Debug)]
pub struct Renderable {
    label: String,
    strategy: StorageStrategy,
    index_mode: IndexMode,
    storage: Option<Storage>,
}

impl Renderable {
    /// Creates an empty renderable. Nothing is allocated until [`create`](Self::create).
    pub fn new(label: impl Into<String>, strategy: StorageStrategy, index_mode: IndexMode) -> Self {
        Self {
            label: label.into(),
            strategy,
            index_mode,
            storage: None,
        }
    }

    /// Creates an empty renderable using the default strategy and index mode of `settings`.
    pub fn with_defaults(label: impl Into<String>, settings: &RenderSettings) -> Self {
        Self::new(label, settings.default_strategy, settings.default_index_mode)
    }

    /// The renderable's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The storage strategy.
    pub fn strategy(&self) -> StorageStrategy {
        self.strategy
    }

    /// The index mode.
    pub fn index_mode(&self) -> IndexMode {
        self.index_mode
    }

    /// Returns `true` between a successful `create` and the next `destroy`.
    pub fn is_created(&self) -> bool {
        self.storage.is_some()
    }

    /// The layout identity of the current build.
    pub fn layout_id(&self) -> Option<PoolId> {
        self.storage.as_ref().map(|s| s.layout_id)
    }

    /// The draw call list of the current build.
    pub fn draw_calls(&self) -> Option<&DrawCallList> {
        self.storage.as_ref().map(|s| &s.draws)
    }

    /// Discards any previous build and builds `mesh` from scratch.
    ///
    /// Returns the resolved layout identity; pass it back through
    /// [`Mesh::with_layout_hint`] to skip resolution next time.
    ///
    /// # Errors
    /// Any [`BuildError`]. On error the renderable is left destroyed.
    pub fn create(&mut self, ctx: &mut RenderContext, mesh: &Mesh) -> Result<PoolId, BuildError> {
        self.destroy(ctx);
        let layout_id = resolve_layout(ctx, mesh)?;
        let filled = self.fill_mesh(ctx, mesh, layout_id)?;
        self.install(ctx, mesh, layout_id, filled)?;
        Ok(layout_id)
    }

    /// Rebuilds from `mesh`, reusing buffers when the layout and sizes are unchanged.
    ///
    /// Reused buffers are only rewritten. The draw call list is replaced only when
    /// segment structure or materials changed. Anything else falls back to
    /// [`create`](Self::create).
    ///
    /// # Errors
    /// Any [`BuildError`].
    pub fn update(&mut self, ctx: &mut RenderContext, mesh: &Mesh) -> Result<PoolId, BuildError> {
        let layout_id = resolve_layout(ctx, mesh)?;
        if self.layout_id() != Some(layout_id) {
            return self.create(ctx, mesh);
        }
        let filled = self.fill_mesh(ctx, mesh, layout_id)?;
        let reusable = match self.storage.as_ref().map(|s| &s.payload) {
            Some(Payload::Empty) => filled.vertices == VertexData::Empty,
            Some(Payload::Immediate(_)) => matches!(filled.vertices, VertexData::Immediate(_)),
            Some(Payload::Client { .. }) => matches!(
                filled.vertices,
                VertexData::Interleaved { .. } | VertexData::PerChannel(_)
            ),
            Some(Payload::Buffers(buffers)) => {
                filled.vertices != VertexData::Empty
                    && buffers.can_rewrite(&filled.vertices, filled.indices.as_ref())
            }
            None => false,
        };
        if !reusable {
            log::debug!("Renderable '{}': sizes changed, rebuilding", self.label);
            self.destroy(ctx);
            self.install(ctx, mesh, layout_id, filled)?;
            return Ok(layout_id);
        }

        let structure = Structure::of(mesh, &filled.spans);
        let Some(storage) = self.storage.as_mut() else {
            return Ok(layout_id);
        };
        if storage.structure != structure {
            storage.draws = DrawCallList::build(
                mesh,
                &filled.spans,
                &ctx.pools,
                ctx.settings.max_texture_units,
            )?;
            storage.structure = structure;
        }

        let FilledMesh {
            vertices, indices, ..
        } = filled;
        match &mut storage.payload {
            Payload::Empty => {}
            Payload::Immediate(lists) => {
                if let VertexData::Immediate(new) = vertices {
                    *lists = new;
                }
            }
            Payload::Client {
                vertices: current,
                indices: current_indices,
            } => {
                *current = vertices;
                *current_indices = indices;
            }
            Payload::Buffers(buffers) => {
                buffers.rewrite(ctx.device.as_ref(), &vertices, indices.as_ref())?;
            }
        }
        log::debug!("Renderable '{}' updated in place", self.label);
        Ok(layout_id)
    }

    /// Replays the current build: binds vertex state, then per segment binds its
    /// program and textures and issues one draw. Does nothing if not created.
    ///
    /// # Errors
    /// * `BuildError::Pool` - If a shader or texture was removed from its pool
    ///   after this renderable was built.
    pub fn render(&self, ctx: &mut RenderContext) -> Result<(), BuildError> {
        let Some(storage) = &self.storage else {
            log::trace!("Renderable '{}' rendered before create", self.label);
            return Ok(());
        };
        let device = ctx.device.as_ref();
        let pools = &ctx.pools;
        let binds = &mut ctx.binds;

        match &storage.payload {
            Payload::Empty => Ok(()),
            Payload::Immediate(lists) => {
                storage.draws.replay(device, pools, binds, |_, segment, _| {
                    for command in lists.get(segment).into_iter().flatten() {
                        device.immediate(command);
                    }
                })
            }
            Payload::Client { vertices, indices } => {
                binds.bind_vertex_array(device, None);
                binds.unbind_buffer(device, BufferTarget::Vertex);
                binds.unbind_buffer(device, BufferTarget::Index);
                let attributes = client_bindings(vertices);
                for attribute in &attributes {
                    device.set_attribute_source(attribute.slot, attribute.format, attribute.source);
                }
                let slots: Vec<u32> = attributes.iter().map(|a| a.slot).collect();
                enable_exactly(device, binds, &slots);
                storage.draws.replay(device, pools, binds, |_, _, record| {
                    match (record.index_offset, indices) {
                        (Some(offset), Some(indices)) => device.draw_indexed(
                            record.topology,
                            record.element_count,
                            indices.format,
                            IndexSource::Client(
                                indices.bytes.get(offset as usize..).unwrap_or_default(),
                            ),
                        ),
                        _ => draw_run(device, record),
                    }
                })
            }
            Payload::Buffers(buffers) => {
                match buffers.vertex_array {
                    Some(id) => binds.bind_vertex_array(device, Some(id)),
                    None => {
                        binds.bind_vertex_array(device, None);
                        buffers.bind_sources(device, binds);
                    }
                }
                storage.draws.replay(device, pools, binds, |_, _, record| {
                    match (record.index_offset, buffers.index) {
                        (Some(offset), Some(index)) => device.draw_indexed(
                            record.topology,
                            record.element_count,
                            index.format,
                            IndexSource::Buffer { offset },
                        ),
                        _ => draw_run(device, record),
                    }
                })
            }
        }
    }

    /// Releases every resource of the current build. Does nothing if there is none.
    pub fn destroy(&mut self, ctx: &mut RenderContext) {
        let Some(storage) = self.storage.take() else {
            return;
        };
        if let Payload::Buffers(buffers) = storage.payload {
            buffers.release(ctx.device.as_ref(), &mut ctx.binds);
        }
        log::debug!("Destroyed renderable '{}'", self.label);
    }

    fn fill_mesh(&self, ctx: &RenderContext, mesh: &Mesh, layout_id: PoolId) -> Result<FilledMesh, BuildError> {
        let layout = ctx.pools.layouts.get_by_id(layout_id)?;
        fill(
            mesh,
            layout_id,
            layout,
            &FillOptions {
                strategy: self.strategy,
                index_mode: self.index_mode,
                index_format: ctx.settings.index_format,
            },
        )
    }

    fn install(
        &mut self,
        ctx: &mut RenderContext,
        mesh: &Mesh,
        layout_id: PoolId,
        filled: FilledMesh,
    ) -> Result<(), BuildError> {
        let draws = DrawCallList::build(
            mesh,
            &filled.spans,
            &ctx.pools,
            ctx.settings.max_texture_units,
        )?;
        let structure = Structure::of(mesh, &filled.spans);
        let payload = match filled.vertices {
            VertexData::Empty => Payload::Empty,
            VertexData::Immediate(lists) => Payload::Immediate(lists),
            vertices => match self.strategy {
                StorageStrategy::Buffers { vertex_array, .. } => Payload::Buffers(
                    DeviceBuffers::upload(
                        ctx,
                        &self.label,
                        &vertices,
                        filled.indices.as_ref(),
                        vertex_array,
                    )?,
                ),
                StorageStrategy::Immediate | StorageStrategy::ClientArrays => Payload::Client {
                    vertices,
                    indices: filled.indices,
                },
            },
        };
        log::debug!(
            "Created renderable '{}' ({}): layout {}, {} draws",
            self.label,
            self.strategy,
            layout_id,
            draws.len()
        );
        self.storage = Some(Storage {
            layout_id,
            structure,
            draws,
            payload,
        });
        Ok(())
    }
}

fn draw_run(device: &dyn RenderDevice, record: &DrawRecord) {
    device.draw(record.topology, record.first_vertex, record.element_count);
}

/// Resolves the layout identity of `mesh`, trusting its hint when present.
///
/// A hinted layout is only checked for existence here; its channel shape is
/// checked against the mesh when filling.
fn resolve_layout(ctx: &mut RenderContext, mesh: &Mesh) -> Result<PoolId, BuildError> {
    match mesh.layout_hint() {
        Some(hint) => {
            ctx.pools.layouts.get_by_id(hint)?;
            Ok(hint)
        }
        None => {
            let descriptor = mesh.layout_descriptor(&ctx.settings.channel_encodings);
            Ok(ctx.pools.layouts.resolve(&descriptor)?)
        }
    }
}
