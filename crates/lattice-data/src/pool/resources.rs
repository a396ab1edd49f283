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

use std::borrow::Cow;

use lattice_core::renderer::{
    PoolId, ProgramDescriptor, ProgramId, RenderDevice, TextureDescriptor, TextureId,
};

use super::identity::IdentityPool;
use super::layout::LayoutPool;
use crate::error::{PoolError, ResourceError};

/// The pools of one render context.
///
/// Nothing here is reference counted: a shader or texture must not be removed
/// while a renderable still holds its identity.
#[derive(Debug, Clone)]
pub struct ResourcePools {
    /// Vertex layouts.
    pub layouts: LayoutPool,
    /// Linked programs keyed by shader name.
    pub shaders: IdentityPool<String, ProgramId>,
    /// Textures keyed by filename.
    pub textures: IdentityPool<String, TextureId>,
}

impl Default for ResourcePools {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourcePools {
    /// Creates empty pools.
    pub fn new() -> Self {
        Self {
            layouts: LayoutPool::new(),
            shaders: IdentityPool::new("shader"),
            textures: IdentityPool::new("texture"),
        }
    }

    /// Links a program on `device` and registers it under `name`.
    ///
    /// The device is not touched when `name` is already registered.
    pub fn load_shader(
        &mut self,
        device: &dyn RenderDevice,
        name: &str,
        vertex_stage: &[u8],
        fragment_stage: &[u8],
    ) -> Result<PoolId, ResourceError> {
        if self.shaders.contains(name) {
            return Err(duplicate(self.shaders.name(), name).into());
        }
        let program = device.create_program(&ProgramDescriptor {
            label: Some(Cow::Borrowed(name)),
            vertex_stage: Cow::Borrowed(vertex_stage),
            fragment_stage: Cow::Borrowed(fragment_stage),
        })?;
        log::debug!("Loaded shader '{name}' as {program:?}");
        Ok(self.shaders.add(name.to_owned(), program)?)
    }

    /// Uploads a texture on `device` and registers it under `file`.
    ///
    /// The device is not touched when `file` is already registered.
    pub fn load_texture(
        &mut self,
        device: &dyn RenderDevice,
        file: &str,
        width: u32,
        height: u32,
        texels: &[u8],
    ) -> Result<PoolId, ResourceError> {
        if self.textures.contains(file) {
            return Err(duplicate(self.textures.name(), file).into());
        }
        let texture = device.create_texture(
            &TextureDescriptor {
                label: Some(Cow::Borrowed(file)),
                width,
                height,
            },
            texels,
        )?;
        log::debug!("Loaded texture '{file}' ({width}x{height}) as {texture:?}");
        Ok(self.textures.add(file.to_owned(), texture)?)
    }

    /// Returns the program behind a shader identity.
    pub fn program(&self, id: PoolId) -> Result<ProgramId, PoolError> {
        self.shaders.get_by_id(id).copied()
    }

    /// Returns the texture behind a texture identity.
    pub fn texture(&self, id: PoolId) -> Result<TextureId, PoolError> {
        self.textures.get_by_id(id).copied()
    }

    /// Releases every pooled device resource and empties all pools.
    ///
    /// Textures go first, then shaders, then layouts. Device failures are
    /// logged and do not stop the teardown.
    pub fn destroy_all(&mut self, device: &dyn RenderDevice) {
        self.textures.destroy_all(|_, file, texture| {
            if let Err(e) = device.destroy_texture(texture) {
                log::warn!("Failed to destroy texture '{file}': {e}");
            }
        });
        self.shaders.destroy_all(|_, name, program| {
            if let Err(e) = device.destroy_program(program) {
                log::warn!("Failed to destroy shader '{name}': {e}");
            }
        });
        self.layouts.destroy_all();
    }
}

fn duplicate(pool: &'static str, key: &str) -> PoolError {
    PoolError::DuplicateKey {
        pool,
        key: format!("{key:?}"),
    }
}
