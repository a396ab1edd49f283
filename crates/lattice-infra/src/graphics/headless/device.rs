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

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lattice_core::layout::{Channel, ChannelFormat};
use lattice_core::renderer::*;

use super::decode::{decode_attribute, read_index, slice_at};
use super::record::{DeviceCall, FetchedVertex, HeadlessDraw, RecordedSource};

#[derive(Debug)]
struct BufferEntry {
    bytes: Vec<u8>,
    target: BufferTarget,
}

#[derive(Debug, Clone)]
enum SourceState {
    Buffer {
        buffer: BufferId,
        offset: u64,
        stride: u32,
    },
    Client {
        data: Vec<u8>,
        stride: u32,
    },
}

#[derive(Debug, Clone, Default)]
struct AttributeState {
    enabled: bool,
    source: Option<(ChannelFormat, SourceState)>,
}

/// State captured by a vertex array (or by the default one).
#[derive(Debug, Clone, Default)]
struct VertexArrayState {
    attributes: BTreeMap<u32, AttributeState>,
    index_buffer: Option<BufferId>,
}

#[derive(Debug, Default)]
struct ContextState {
    buffers: HashMap<BufferId, BufferEntry>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayState>,
    default_vertex_array: VertexArrayState,
    textures: HashMap<TextureId, (u32, u32)>,
    programs: HashMap<ProgramId, Option<String>>,
    uniforms: HashMap<(ProgramId, String), bool>,

    bound_vertex_array: Option<VertexArrayId>,
    vertex_buffer: Option<BufferId>,
    bound_textures: BTreeMap<u32, TextureId>,
    program: Option<ProgramId>,

    current: [Option<Vec<f32>>; Channel::COUNT],
    batch: Option<(PrimitiveTopology, Vec<FetchedVertex>)>,
}

impl ContextState {
    fn vertex_array(&self) -> &VertexArrayState {
        self.bound_vertex_array
            .and_then(|id| self.vertex_arrays.get(&id))
            .unwrap_or(&self.default_vertex_array)
    }

    fn vertex_array_mut(&mut self) -> &mut VertexArrayState {
        let ContextState {
            bound_vertex_array,
            vertex_arrays,
            default_vertex_array,
            ..
        } = self;
        match (*bound_vertex_array).and_then(|id| vertex_arrays.get_mut(&id)) {
            Some(state) => state,
            None => default_vertex_array,
        }
    }

    fn fetch_vertex(&self, vertex: u32) -> FetchedVertex {
        let mut fetched = FetchedVertex::default();
        for (&slot, attribute) in &self.vertex_array().attributes {
            let Some((format, source)) = attribute.source.as_ref().filter(|_| attribute.enabled)
            else {
                continue;
            };
            let width = format.byte_width() as usize;
            let bytes = match source {
                SourceState::Buffer {
                    buffer,
                    offset,
                    stride,
                } => self.buffers.get(buffer).and_then(|entry| {
                    slice_at(
                        &entry.bytes,
                        offset + u64::from(vertex) * u64::from(*stride),
                        width,
                    )
                }),
                SourceState::Client { data, stride } => {
                    slice_at(data, u64::from(vertex) * u64::from(*stride), width)
                }
            };
            match bytes.and_then(|b| decode_attribute(*format, b)) {
                Some(values) => {
                    fetched.attributes.insert(slot, values);
                }
                None => log::warn!("HeadlessDevice: vertex {vertex} out of range for slot {slot}"),
            }
        }
        fetched
    }

    fn snapshot_draw(
        &self,
        topology: PrimitiveTopology,
        element_count: u32,
        index_format: Option<IndexFormat>,
        vertices: Vec<FetchedVertex>,
    ) -> HeadlessDraw {
        HeadlessDraw {
            topology,
            element_count,
            index_format,
            program: self.program,
            vertex_array: self.bound_vertex_array,
            textures: self
                .bound_textures
                .iter()
                .map(|(&unit, &id)| (unit, id))
                .collect(),
            vertices,
        }
    }
}

#[derive(Debug, Default)]
struct Recording {
    calls: Vec<DeviceCall>,
    draws: Vec<HeadlessDraw>,
}

#[derive(Debug)]
struct HeadlessDeviceInternal {
    state: Mutex<ContextState>,
    recording: Mutex<Recording>,

    next_id: AtomicU32,
    buffers_created: AtomicUsize,

    memory_budget: Option<u64>,
    allocated_bytes: AtomicU64,
    peak_bytes: AtomicU64,
}

/// A clonable handle to an in-memory render device.
///
/// Handles of every kind come from one counter starting at `1`. Clones share
/// the same state and recording.
#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    internal: Arc<HeadlessDeviceInternal>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Creates a device with unlimited memory.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a device whose buffers may not exceed `bytes` in total.
    pub fn with_memory_budget(bytes: u64) -> Self {
        Self::build(Some(bytes))
    }

    fn build(memory_budget: Option<u64>) -> Self {
        Self {
            internal: Arc::new(HeadlessDeviceInternal {
                state: Mutex::new(ContextState::default()),
                recording: Mutex::new(Recording::default()),
                next_id: AtomicU32::new(1),
                buffers_created: AtomicUsize::new(0),
                memory_budget,
                allocated_bytes: AtomicU64::new(0),
                peak_bytes: AtomicU64::new(0),
            }),
        }
    }

    // --- Locking helpers ---

    fn state(&self) -> MutexGuard<'_, ContextState> {
        self.internal
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn recording(&self) -> MutexGuard<'_, Recording> {
        self.internal
            .recording
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: DeviceCall) {
        self.recording().calls.push(call);
    }

    fn generate_id<H: DeviceHandle>(&self) -> H {
        H::from_raw(self.internal.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // --- Inspection ---

    /// Every call received so far.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.recording().calls.clone()
    }

    /// Returns and clears the call log.
    pub fn take_calls(&self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.recording().calls)
    }

    /// Clears the call log and the draw log.
    pub fn clear_calls(&self) {
        let mut recording = self.recording();
        recording.calls.clear();
        recording.draws.clear();
    }

    /// Counts logged calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&DeviceCall) -> bool) -> usize {
        self.recording().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Every completed draw so far.
    pub fn draws(&self) -> Vec<HeadlessDraw> {
        self.recording().draws.clone()
    }

    /// Returns and clears the draw log.
    pub fn take_draws(&self) -> Vec<HeadlessDraw> {
        std::mem::take(&mut self.recording().draws)
    }

    /// Number of live buffers.
    pub fn live_buffers(&self) -> usize {
        self.state().buffers.len()
    }

    /// Number of live vertex arrays.
    pub fn live_vertex_arrays(&self) -> usize {
        self.state().vertex_arrays.len()
    }

    /// Number of live textures.
    pub fn live_textures(&self) -> usize {
        self.state().textures.len()
    }

    /// Number of live programs.
    pub fn live_programs(&self) -> usize {
        self.state().programs.len()
    }

    /// Number of buffers ever created.
    pub fn buffers_created(&self) -> usize {
        self.internal.buffers_created.load(Ordering::Relaxed)
    }

    /// Contents of a live buffer.
    pub fn buffer_data(&self, id: BufferId) -> Option<Vec<u8>> {
        self.state().buffers.get(&id).map(|entry| entry.bytes.clone())
    }

    /// Target a live buffer was created for.
    pub fn buffer_target(&self, id: BufferId) -> Option<BufferTarget> {
        self.state().buffers.get(&id).map(|entry| entry.target)
    }

    /// Last value written to a boolean uniform of `program`.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<bool> {
        self.state()
            .uniforms
            .get(&(program, name.to_owned()))
            .copied()
    }

    /// Program currently in use.
    pub fn bound_program(&self) -> Option<ProgramId> {
        self.state().program
    }

    /// Bytes currently held by live buffers.
    pub fn allocated_bytes(&self) -> u64 {
        self.internal.allocated_bytes.load(Ordering::Relaxed)
    }

    /// Highest value [`allocated_bytes`](Self::allocated_bytes) has reached.
    pub fn peak_bytes(&self) -> u64 {
        self.internal.peak_bytes.load(Ordering::Relaxed)
    }

    fn invalid<H: DeviceHandle>(id: H) -> DeviceError {
        DeviceError::InvalidHandle {
            kind: H::KIND,
            id: id.raw(),
        }
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, DeviceError> {
        let allocated = self.internal.allocated_bytes.load(Ordering::Relaxed);
        if let Some(budget) = self.internal.memory_budget {
            if allocated + descriptor.size > budget {
                return Err(DeviceError::OutOfMemory {
                    requested: descriptor.size,
                    available: budget.saturating_sub(allocated),
                });
            }
        }
        let size = usize::try_from(descriptor.size).map_err(|_| DeviceError::OutOfMemory {
            requested: descriptor.size,
            available: usize::MAX as u64,
        })?;

        let id: BufferId = self.generate_id();
        self.state().buffers.insert(
            id,
            BufferEntry {
                bytes: vec![0; size],
                target: descriptor.target,
            },
        );
        self.internal.buffers_created.fetch_add(1, Ordering::Relaxed);
        let now = self
            .internal
            .allocated_bytes
            .fetch_add(descriptor.size, Ordering::Relaxed)
            + descriptor.size;
        self.internal.peak_bytes.fetch_max(now, Ordering::Relaxed);

        log::debug!(
            "HeadlessDevice: Created buffer '{}' with ID: {:?}, size: {} bytes",
            descriptor.label.as_deref().unwrap_or_default(),
            id,
            descriptor.size
        );
        self.record(DeviceCall::CreateBuffer {
            id,
            size: descriptor.size,
            target: descriptor.target,
        });
        Ok(id)
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), DeviceError> {
        {
            let mut state = self.state();
            let entry = state.buffers.get_mut(&id).ok_or(Self::invalid(id))?;
            let size = entry.bytes.len() as u64;
            let out_of_bounds = DeviceError::OutOfBounds {
                id: id.raw(),
                offset,
                len: data.len() as u64,
                size,
            };
            let start = usize::try_from(offset).map_err(|_| out_of_bounds.clone())?;
            let target = start
                .checked_add(data.len())
                .and_then(|end| entry.bytes.get_mut(start..end))
                .ok_or(out_of_bounds)?;
            target.copy_from_slice(data);
        }
        self.record(DeviceCall::WriteBuffer {
            id,
            offset,
            len: data.len(),
        });
        Ok(())
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), DeviceError> {
        {
            let mut state = self.state();
            let entry = state.buffers.remove(&id).ok_or(Self::invalid(id))?;
            self.internal
                .allocated_bytes
                .fetch_sub(entry.bytes.len() as u64, Ordering::Relaxed);
            if state.vertex_buffer == Some(id) {
                state.vertex_buffer = None;
            }
            let vertex_array = state.vertex_array_mut();
            if vertex_array.index_buffer == Some(id) {
                vertex_array.index_buffer = None;
            }
        }
        self.record(DeviceCall::DestroyBuffer(id));
        Ok(())
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, DeviceError> {
        let id: VertexArrayId = self.generate_id();
        self.state()
            .vertex_arrays
            .insert(id, VertexArrayState::default());
        self.record(DeviceCall::CreateVertexArray(id));
        Ok(id)
    }

    fn destroy_vertex_array(&self, id: VertexArrayId) -> Result<(), DeviceError> {
        {
            let mut state = self.state();
            state.vertex_arrays.remove(&id).ok_or(Self::invalid(id))?;
            if state.bound_vertex_array == Some(id) {
                state.bound_vertex_array = None;
            }
        }
        self.record(DeviceCall::DestroyVertexArray(id));
        Ok(())
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        texels: &[u8],
    ) -> Result<TextureId, DeviceError> {
        let id: TextureId = self.generate_id();
        self.state()
            .textures
            .insert(id, (descriptor.width, descriptor.height));
        log::debug!(
            "HeadlessDevice: Created texture '{}' ({}x{}, {} bytes) with ID: {:?}",
            descriptor.label.as_deref().unwrap_or_default(),
            descriptor.width,
            descriptor.height,
            texels.len(),
            id
        );
        self.record(DeviceCall::CreateTexture(id));
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), DeviceError> {
        {
            let mut state = self.state();
            state.textures.remove(&id).ok_or(Self::invalid(id))?;
            state.bound_textures.retain(|_, bound| *bound != id);
        }
        self.record(DeviceCall::DestroyTexture(id));
        Ok(())
    }

    fn create_program(&self, descriptor: &ProgramDescriptor) -> Result<ProgramId, DeviceError> {
        if descriptor.vertex_stage.is_empty() {
            return Err(DeviceError::Backend(format!(
                "program '{}' has an empty vertex stage",
                descriptor.label.as_deref().unwrap_or_default()
            )));
        }
        let id: ProgramId = self.generate_id();
        self.state()
            .programs
            .insert(id, descriptor.label.as_ref().map(|l| l.to_string()));
        self.record(DeviceCall::CreateProgram(id));
        Ok(id)
    }

    fn destroy_program(&self, id: ProgramId) -> Result<(), DeviceError> {
        {
            let mut state = self.state();
            state.programs.remove(&id).ok_or(Self::invalid(id))?;
            state.uniforms.retain(|(program, _), _| *program != id);
            if state.program == Some(id) {
                state.program = None;
            }
        }
        self.record(DeviceCall::DestroyProgram(id));
        Ok(())
    }

    fn bind_vertex_array(&self, id: Option<VertexArrayId>) {
        {
            let mut state = self.state();
            match id {
                Some(va) if !state.vertex_arrays.contains_key(&va) => {
                    log::warn!("HeadlessDevice: binding unknown vertex array {va:?}");
                }
                _ => state.bound_vertex_array = id,
            }
        }
        self.record(DeviceCall::BindVertexArray(id));
    }

    fn bind_buffer(&self, target: BufferTarget, id: Option<BufferId>) {
        {
            let mut state = self.state();
            match target {
                BufferTarget::Vertex => state.vertex_buffer = id,
                BufferTarget::Index => state.vertex_array_mut().index_buffer = id,
            }
        }
        self.record(DeviceCall::BindBuffer { target, id });
    }

    fn set_attribute_enabled(&self, slot: u32, enabled: bool) {
        self.state()
            .vertex_array_mut()
            .attributes
            .entry(slot)
            .or_default()
            .enabled = enabled;
        self.record(DeviceCall::SetAttributeEnabled { slot, enabled });
    }

    fn set_attribute_source(&self, slot: u32, format: ChannelFormat, source: AttributeSource<'_>) {
        let recorded = {
            let mut state = self.state();
            let (captured, recorded) = match source {
                AttributeSource::Buffer { offset, stride } => {
                    let captured = state.vertex_buffer.map(|buffer| SourceState::Buffer {
                        buffer,
                        offset,
                        stride,
                    });
                    if captured.is_none() {
                        log::warn!("HeadlessDevice: attribute {slot} sourced with no vertex buffer bound");
                    }
                    (captured, RecordedSource::Buffer { offset, stride })
                }
                AttributeSource::Client { data, stride } => (
                    Some(SourceState::Client {
                        data: data.to_vec(),
                        stride,
                    }),
                    RecordedSource::Client {
                        len: data.len(),
                        stride,
                    },
                ),
            };
            state
                .vertex_array_mut()
                .attributes
                .entry(slot)
                .or_default()
                .source = captured.map(|source| (format, source));
            recorded
        };
        self.record(DeviceCall::SetAttributeSource {
            slot,
            format,
            source: recorded,
        });
    }

    fn bind_texture(&self, unit: u32, id: Option<TextureId>) {
        {
            let mut state = self.state();
            match id {
                Some(texture) => {
                    state.bound_textures.insert(unit, texture);
                }
                None => {
                    state.bound_textures.remove(&unit);
                }
            }
        }
        self.record(DeviceCall::BindTexture { unit, id });
    }

    fn use_program(&self, id: Option<ProgramId>) {
        self.state().program = id;
        self.record(DeviceCall::UseProgram(id));
    }

    fn set_uniform_bool(&self, program: ProgramId, name: &str, value: bool) {
        self.state()
            .uniforms
            .insert((program, name.to_owned()), value);
        self.record(DeviceCall::SetUniformBool {
            program,
            name: name.to_owned(),
            value,
        });
    }

    fn draw(&self, topology: PrimitiveTopology, first: u32, count: u32) {
        let draw = {
            let state = self.state();
            let vertices = (first..first.saturating_add(count))
                .map(|v| state.fetch_vertex(v))
                .collect();
            state.snapshot_draw(topology, count, None, vertices)
        };
        let mut recording = self.recording();
        recording.calls.push(DeviceCall::Draw {
            topology,
            first,
            count,
        });
        recording.draws.push(draw);
    }

    fn draw_indexed(
        &self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        source: IndexSource<'_>,
    ) {
        let draw = {
            let state = self.state();
            let (bytes, offset): (&[u8], u64) = match source {
                IndexSource::Buffer { offset } => (
                    state
                        .vertex_array()
                        .index_buffer
                        .and_then(|id| state.buffers.get(&id))
                        .map_or(&[][..], |entry| entry.bytes.as_slice()),
                    offset,
                ),
                IndexSource::Client(bytes) => (bytes, 0),
            };
            let mut vertices = Vec::with_capacity(count as usize);
            for position in 0..count {
                match read_index(format, bytes, offset, position) {
                    Some(index) => vertices.push(state.fetch_vertex(index)),
                    None => {
                        log::warn!("HeadlessDevice: index {position} out of range");
                        break;
                    }
                }
            }
            state.snapshot_draw(topology, count, Some(format), vertices)
        };
        let mut recording = self.recording();
        recording.calls.push(DeviceCall::DrawIndexed {
            topology,
            count,
            format,
            offset: match source {
                IndexSource::Buffer { offset } => Some(offset),
                IndexSource::Client(_) => None,
            },
        });
        recording.draws.push(draw);
    }

    fn immediate(&self, command: &ImmediateCommand) {
        let finished = {
            let mut state = self.state();
            match *command {
                ImmediateCommand::Begin(topology) => {
                    if state.batch.is_some() {
                        log::warn!("HeadlessDevice: nested immediate batch");
                    }
                    state.batch = Some((topology, Vec::new()));
                    None
                }
                ImmediateCommand::Attribute {
                    channel,
                    value,
                    components,
                } => {
                    let count = usize::from(components).min(4);
                    state.current[channel.index()] = Some(value[..count].to_vec());
                    if command.emits_vertex() {
                        let mut vertex = FetchedVertex::default();
                        for channel in Channel::ORDER {
                            if let Some(values) = &state.current[channel.index()] {
                                vertex
                                    .attributes
                                    .insert(channel.attribute_slot(), values.clone());
                            }
                        }
                        match state.batch.as_mut() {
                            Some((_, vertices)) => vertices.push(vertex),
                            None => log::warn!("HeadlessDevice: vertex outside immediate batch"),
                        }
                    }
                    None
                }
                ImmediateCommand::End => state.batch.take().map(|(topology, vertices)| {
                    let count = vertices.len() as u32;
                    state.snapshot_draw(topology, count, None, vertices)
                }),
            }
        };
        let mut recording = self.recording();
        recording.calls.push(DeviceCall::Immediate(*command));
        if let Some(draw) = finished {
            recording.draws.push(draw);
        }
    }
}
