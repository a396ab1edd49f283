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

//! The render context every renderable operation runs against.

use std::sync::Arc;

use lattice_core::renderer::{ConfigError, FrameStats, RenderDevice, RenderSettings};
use lattice_data::ResourcePools;

use crate::bind_lane::BindState;
use crate::error::BuildError;

/// Everything shared by the renderables of one graphics context.
///
/// There is no global state: pools and bind state live here and are handed
/// to each operation by reference. All operations run on the thread that
/// owns the context.
#[derive(Debug)]
pub struct RenderContext {
    /// The device resources are created on.
    pub device: Arc<dyn RenderDevice>,
    /// Layout, shader and texture pools.
    pub pools: ResourcePools,
    /// Last bound handle per device slot.
    pub binds: BindState,
    /// Settings fixed at creation.
    pub settings: RenderSettings,
}

impl RenderContext {
    /// Creates a context with empty pools and fresh bind state.
    ///
    /// # Errors
    /// * `ConfigError` - If `settings` fail validation.
    pub fn new(device: Arc<dyn RenderDevice>, settings: RenderSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        log::info!(
            "Render context created: {} texture units, {} attribute slots, default strategy {}",
            settings.max_texture_units,
            settings.max_attribute_slots,
            settings.default_strategy
        );
        Ok(Self {
            binds: BindState::new(&settings),
            pools: ResourcePools::new(),
            device,
            settings,
        })
    }

    /// Forgets all bind state. Call once after the graphics context is recreated.
    pub fn reset_bind_state(&mut self) {
        self.binds.reset();
    }

    /// Returns this frame's counters and starts a new frame.
    pub fn end_frame(&mut self) -> FrameStats {
        self.binds.take_stats()
    }

    /// Removes the texture registered under `file` and destroys it.
    ///
    /// Bind state forgets the handle first, so a later handle with the same
    /// raw value is bound again. Renderables whose materials name the file
    /// fail to render until they are recreated.
    ///
    /// # Errors
    /// * `BuildError::Pool` - If no texture is registered under `file`.
    /// * `BuildError::Device` - If the device fails to destroy the texture.
    pub fn unload_texture(&mut self, file: &str) -> Result<(), BuildError> {
        let (id, texture) = self.pools.textures.remove(file)?;
        self.binds.invalidate_texture(self.device.as_ref(), texture);
        self.device.destroy_texture(texture)?;
        log::debug!("Unloaded texture '{file}' ({id})");
        Ok(())
    }

    /// Removes the shader registered under `name` and destroys its program.
    ///
    /// # Errors
    /// * `BuildError::Pool` - If no shader is registered under `name`.
    /// * `BuildError::Device` - If the device fails to destroy the program.
    pub fn unload_shader(&mut self, name: &str) -> Result<(), BuildError> {
        let (id, program) = self.pools.shaders.remove(name)?;
        self.binds.invalidate_program(program);
        self.device.destroy_program(program)?;
        log::debug!("Unloaded shader '{name}' ({id})");
        Ok(())
    }

    /// Releases every pooled shader and texture and resets bind state.
    ///
    /// Renderables must be destroyed before this is called.
    pub fn shutdown(&mut self) {
        self.pools.destroy_all(self.device.as_ref());
        self.binds.reset();
    }
}
