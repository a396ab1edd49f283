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

/// A texture file bound to a texture unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureBinding {
    /// The texture unit.
    pub slot: u32,
    /// The texture's pool key, usually its filename.
    pub file: String,
}

/// The shader and textures a segment is drawn with, referenced by name.
///
/// Names are resolved to pool identities when a draw call list is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MaterialRef {
    /// The shader's pool key. `None` draws without a program.
    pub shader: Option<String>,
    /// Textures in binding order.
    pub textures: Vec<TextureBinding>,
}

impl MaterialRef {
    /// Creates an empty material.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shader name.
    pub fn with_shader(mut self, name: impl Into<String>) -> Self {
        self.shader = Some(name.into());
        self
    }

    /// Appends a texture binding.
    pub fn with_texture(mut self, slot: u32, file: impl Into<String>) -> Self {
        self.textures.push(TextureBinding {
            slot,
            file: file.into(),
        });
        self
    }
}
