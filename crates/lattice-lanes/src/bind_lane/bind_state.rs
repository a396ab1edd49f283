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

use std::collections::HashMap;

use lattice_core::renderer::{
    BufferId, BufferTarget, DeviceHandle, FrameStats, ProgramId, RenderDevice, RenderSettings,
    TextureId, VertexArrayId,
};

/// Moves `slot` to `next` and reports whether the device must be told.
fn transition<H: DeviceHandle>(slot: &mut Option<H>, next: Option<H>, stats: &mut FrameStats) -> bool {
    if *slot == next {
        stats.binds_elided += 1;
        log::trace!("Elided {} bind {:?}", H::KIND, next);
        false
    } else {
        *slot = next;
        stats.binds_issued += 1;
        true
    }
}

/// The last handle bound to each device slot, as seen by the render thread.
///
/// `None` means "unbound". Every `bind_*` call compares against the tracked
/// handle and reaches the device only when it differs. Binding a different
/// vertex array invalidates every buffer binding and attribute enable, since
/// they belong to the array that was just swapped out.
///
/// Units `[0, K)` additionally drive a boolean uniform on the current program
/// that is written only when their occupancy flips between empty and non-empty.
#[derive(Debug)]
pub struct BindState {
    vertex_array: Option<VertexArrayId>,
    buffers: [Option<BufferId>; BufferTarget::COUNT],
    textures: Vec<Option<TextureId>>,
    program: Option<ProgramId>,
    /// `None` is unknown: the next call always reaches the device.
    attributes: Vec<Option<bool>>,

    textured_window: usize,
    textured: bool,
    flag_uniform: String,
    program_flags: HashMap<ProgramId, bool>,

    stats: FrameStats,
}

impl BindState {
    /// Creates bind state sized from `settings`. Counts never change afterwards.
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            vertex_array: None,
            buffers: [None; BufferTarget::COUNT],
            textures: vec![None; settings.max_texture_units as usize],
            program: None,
            attributes: vec![None; settings.max_attribute_slots as usize],
            textured_window: settings.textured_unit_window as usize,
            textured: false,
            flag_uniform: settings.texture_flag_uniform.clone(),
            program_flags: HashMap::new(),
            stats: FrameStats::default(),
        }
    }

    /// Forgets everything, as after a context recreation. Statistics are kept.
    pub fn reset(&mut self) {
        log::debug!("Bind state reset");
        self.vertex_array = None;
        self.buffers = [None; BufferTarget::COUNT];
        self.textures.fill(None);
        self.program = None;
        self.attributes.fill(None);
        self.textured = false;
        self.program_flags.clear();
    }

    /// Binds a vertex array, or the default one when `None`.
    pub fn bind_vertex_array(&mut self, device: &dyn RenderDevice, id: Option<VertexArrayId>) {
        if transition(&mut self.vertex_array, id, &mut self.stats) {
            device.bind_vertex_array(id);
            self.buffers = [None; BufferTarget::COUNT];
            self.attributes.fill(None);
        }
    }

    /// Binds a buffer to `target`, or unbinds the target when `None`.
    pub fn bind_buffer(&mut self, device: &dyn RenderDevice, target: BufferTarget, id: Option<BufferId>) {
        if transition(&mut self.buffers[target.index()], id, &mut self.stats) {
            device.bind_buffer(target, id);
        }
    }

    /// Unbinds `target` unless it is already unbound.
    pub fn unbind_buffer(&mut self, device: &dyn RenderDevice, target: BufferTarget) {
        self.bind_buffer(device, target, None);
    }

    /// Enables or disables an attribute slot.
    ///
    /// # Panics
    /// If `slot` is not below the configured attribute slot count.
    pub fn set_attribute_enabled(&mut self, device: &dyn RenderDevice, slot: u32, enabled: bool) {
        assert!(
            (slot as usize) < self.attributes.len(),
            "attribute slot {slot} exceeds the {} tracked slots",
            self.attributes.len()
        );
        let tracked = &mut self.attributes[slot as usize];
        if *tracked == Some(enabled) {
            self.stats.binds_elided += 1;
            return;
        }
        *tracked = Some(enabled);
        self.stats.binds_issued += 1;
        device.set_attribute_enabled(slot, enabled);
    }

    /// Binds a texture to `unit`, or empties the unit when `None`.
    ///
    /// # Panics
    /// If `unit` is not below the configured texture unit count.
    pub fn bind_texture(&mut self, device: &dyn RenderDevice, unit: u32, id: Option<TextureId>) {
        assert!(
            (unit as usize) < self.textures.len(),
            "texture unit {unit} exceeds the {} tracked units",
            self.textures.len()
        );
        if transition(&mut self.textures[unit as usize], id, &mut self.stats) {
            device.bind_texture(unit, id);
            if (unit as usize) < self.textured_window {
                self.refresh_texture_flag(device);
            }
        }
    }

    /// Empties `unit` unless it is already empty.
    pub fn unbind_texture(&mut self, device: &dyn RenderDevice, unit: u32) {
        self.bind_texture(device, unit, None);
    }

    /// Makes `id` the current program, or none.
    ///
    /// A newly current program receives the texture flag if the value it last
    /// saw differs from the current occupancy.
    pub fn use_program(&mut self, device: &dyn RenderDevice, id: Option<ProgramId>) {
        if transition(&mut self.program, id, &mut self.stats) {
            device.use_program(id);
            self.push_texture_flag(device);
        }
    }

    /// Counts one draw of `elements` elements.
    pub fn record_draw(&mut self, elements: u32) {
        self.stats.draw_calls += 1;
        self.stats.elements_drawn += u64::from(elements);
    }

    /// Marks a destroyed buffer as unbound wherever it is tracked.
    pub fn invalidate_buffer(&mut self, id: BufferId) {
        for slot in self.buffers.iter_mut().filter(|slot| **slot == Some(id)) {
            *slot = None;
        }
    }

    /// Marks a destroyed vertex array as unbound.
    ///
    /// The device falls back to the default array, whose state is unknown.
    pub fn invalidate_vertex_array(&mut self, id: VertexArrayId) {
        if self.vertex_array == Some(id) {
            self.vertex_array = None;
            self.buffers = [None; BufferTarget::COUNT];
            self.attributes.fill(None);
        }
    }

    /// Marks a destroyed texture as unbound wherever it is tracked.
    ///
    /// The current program is told if the window just became empty.
    pub fn invalidate_texture(&mut self, device: &dyn RenderDevice, id: TextureId) {
        for slot in self.textures.iter_mut().filter(|slot| **slot == Some(id)) {
            *slot = None;
        }
        self.refresh_texture_flag(device);
    }

    /// Forgets a destroyed program.
    pub fn invalidate_program(&mut self, id: ProgramId) {
        if self.program == Some(id) {
            self.program = None;
        }
        self.program_flags.remove(&id);
    }

    /// Returns `true` if any unit in `[0, K)` holds a texture.
    pub fn textured(&self) -> bool {
        self.textured
    }

    /// The tracked vertex array.
    pub fn vertex_array(&self) -> Option<VertexArrayId> {
        self.vertex_array
    }

    /// The tracked buffer of `target`.
    pub fn buffer(&self, target: BufferTarget) -> Option<BufferId> {
        self.buffers[target.index()]
    }

    /// The tracked texture of `unit`, `None` if empty or out of range.
    pub fn texture(&self, unit: u32) -> Option<TextureId> {
        self.textures.get(unit as usize).copied().flatten()
    }

    /// The tracked program.
    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    /// The tracked enable flag of `slot`, `None` if unknown.
    pub fn attribute_enabled(&self, slot: u32) -> Option<bool> {
        self.attributes.get(slot as usize).copied().flatten()
    }

    /// Number of tracked texture units.
    pub fn texture_units(&self) -> u32 {
        self.textures.len() as u32
    }

    /// Number of leading units whose occupancy drives the texture flag.
    pub fn textured_window(&self) -> u32 {
        self.textured_window as u32
    }

    /// Number of tracked attribute slots.
    pub fn attribute_slots(&self) -> u32 {
        self.attributes.len() as u32
    }

    /// Counters accumulated since the last [`take_stats`](Self::take_stats).
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Returns the counters and resets them.
    pub fn take_stats(&mut self) -> FrameStats {
        self.stats.take()
    }

    fn window_occupied(&self) -> bool {
        self.textures
            .iter()
            .take(self.textured_window)
            .any(Option::is_some)
    }

    fn refresh_texture_flag(&mut self, device: &dyn RenderDevice) {
        let textured = self.window_occupied();
        if textured != self.textured {
            self.textured = textured;
            self.push_texture_flag(device);
        }
    }

    fn push_texture_flag(&mut self, device: &dyn RenderDevice) {
        let Some(program) = self.program else {
            return;
        };
        let seen = self.program_flags.get(&program).copied().unwrap_or(false);
        if seen != self.textured {
            device.set_uniform_bool(program, &self.flag_uniform, self.textured);
            self.program_flags.insert(program, self.textured);
            self.stats.uniform_updates += 1;
        }
    }
}
