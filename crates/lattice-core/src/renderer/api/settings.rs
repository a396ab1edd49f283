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

//! Render context configuration.

use serde::{Deserialize, Serialize};

use crate::layout::{Channel, Encoding};
use crate::renderer::api::enums::IndexFormat;
use crate::renderer::api::strategy::{IndexMode, StorageStrategy};
use crate::renderer::error::ConfigError;

/// The on-the-wire encoding chosen for each vertex channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelEncodings {
    /// Encoding of color components.
    pub color: Encoding,
    /// Encoding of normal components.
    pub normal: Encoding,
    /// Encoding of texture coordinates.
    pub tex_coord: Encoding,
    /// Encoding of positions.
    pub position: Encoding,
}

impl ChannelEncodings {
    /// Returns the encoding configured for `channel`.
    pub const fn get(&self, channel: Channel) -> Encoding {
        match channel {
            Channel::Color => self.color,
            Channel::Normal => self.normal,
            Channel::TexCoord => self.tex_coord,
            Channel::Position => self.position,
        }
    }
}

impl Default for ChannelEncodings {
    fn default() -> Self {
        Self {
            color: Encoding::Float32,
            normal: Encoding::Float32,
            tex_coord: Encoding::Float32,
            position: Encoding::Float32,
        }
    }
}

/// Settings fixed for the lifetime of a render context.
///
/// Slot and unit counts are read once when bind state is created; changing
/// them afterwards requires a new context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Number of texture units tracked by bind state.
    pub max_texture_units: u32,
    /// Units `[0, K)` whose occupancy drives the texture-presence uniform.
    pub textured_unit_window: u32,
    /// Name of the boolean uniform toggled when textures appear or disappear.
    pub texture_flag_uniform: String,
    /// Number of vertex attribute slots tracked by bind state.
    pub max_attribute_slots: u32,
    /// Required index encoding. `None` picks the narrowest format per mesh.
    pub index_format: Option<IndexFormat>,
    /// Per-channel numeric encodings used when resolving layout descriptors.
    pub channel_encodings: ChannelEncodings,
    /// Strategy used by renderables created without an explicit one.
    pub default_strategy: StorageStrategy,
    /// Index handling used by renderables created without an explicit one.
    pub default_index_mode: IndexMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_texture_units: 8,
            textured_unit_window: 1,
            texture_flag_uniform: "u_textured".to_owned(),
            max_attribute_slots: 8,
            index_format: None,
            channel_encodings: ChannelEncodings::default(),
            default_strategy: StorageStrategy::default(),
            default_index_mode: IndexMode::default(),
        }
    }
}

impl RenderSettings {
    /// Parses settings from RON text and validates them.
    ///
    /// Missing fields keep their default values.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let settings: RenderSettings = ron::from_str(text)?;
        settings.validate()?;
        log::debug!(
            "Loaded render settings: {} texture units (window {}), {} attribute slots, strategy {}",
            settings.max_texture_units,
            settings.textured_unit_window,
            settings.max_attribute_slots,
            settings.default_strategy
        );
        Ok(settings)
    }

    /// Serializes the settings to pretty RON text.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Checks that the counts are usable by bind state.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_texture_units == 0 {
            return Err(ConfigError::NoTextureUnits);
        }
        if self.textured_unit_window > self.max_texture_units {
            return Err(ConfigError::TextureWindowTooLarge {
                window: self.textured_unit_window,
                units: self.max_texture_units,
            });
        }
        let required = Channel::ORDER
            .iter()
            .map(|channel| channel.attribute_slot() + 1)
            .max()
            .unwrap_or(0);
        if self.max_attribute_slots < required {
            return Err(ConfigError::TooFewAttributeSlots {
                slots: self.max_attribute_slots,
                required,
            });
        }
        if self.texture_flag_uniform.is_empty() {
            return Err(ConfigError::EmptyUniformName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::strategy::BufferLayoutMode;

    #[test]
    fn test_defaults_are_valid() {
        let settings = RenderSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_texture_units, 8);
        assert_eq!(settings.textured_unit_window, 1);
        assert_eq!(settings.index_format, None);
        assert_eq!(
            settings.channel_encodings.get(Channel::Normal),
            Encoding::Float32
        );
    }

    #[test]
    fn test_ron_overrides_only_listed_fields() {
        let text = r#"(
            textured_unit_window: 2,
            index_format: Some(Uint32),
            channel_encodings: (color: Unorm8),
            default_strategy: Buffers(layout: PerChannel, vertex_array: false),
        )"#;
        let settings = RenderSettings::from_ron_str(text).unwrap();
        assert_eq!(settings.textured_unit_window, 2);
        assert_eq!(settings.max_texture_units, 8);
        assert_eq!(settings.index_format, Some(IndexFormat::Uint32));
        assert_eq!(settings.channel_encodings.color, Encoding::Unorm8);
        assert_eq!(settings.channel_encodings.position, Encoding::Float32);
        assert_eq!(
            settings.default_strategy,
            StorageStrategy::Buffers {
                layout: BufferLayoutMode::PerChannel,
                vertex_array: false,
            }
        );
    }

    #[test]
    fn test_window_larger_than_units_is_rejected() {
        let err = RenderSettings::from_ron_str("(max_texture_units: 2, textured_unit_window: 3)")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TextureWindowTooLarge {
                window: 3,
                units: 2
            }
        ));
    }

    #[test]
    fn test_attribute_slots_must_cover_every_channel() {
        let err = RenderSettings::from_ron_str("(max_attribute_slots: 2)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooFewAttributeSlots {
                slots: 2,
                required: 4
            }
        ));
    }

    #[test]
    fn test_malformed_text_is_a_parse_error() {
        let err = RenderSettings::from_ron_str("(max_texture_units: \"eight\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_pretty_text_parses_back() {
        let settings = RenderSettings {
            max_texture_units: 4,
            ..Default::default()
        };
        let text = settings.to_ron_string().unwrap();
        assert_eq!(RenderSettings::from_ron_str(&text).unwrap(), settings);
    }
}
