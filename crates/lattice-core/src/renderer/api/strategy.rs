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

//! The closed set of vertex storage strategies a renderable can use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How vertex data of a buffered renderable is split across device buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BufferLayoutMode {
    /// One buffer holding every channel of a vertex next to each other.
    #[default]
    Interleaved,
    /// One tightly packed buffer per channel.
    PerChannel,
}

/// How segment indices are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IndexMode {
    /// Indices are uploaded to a shared index array and drawn with indexed draws.
    #[default]
    Indexed,
    /// Indexed segments are expanded into plain vertex runs while filling.
    Expanded,
}

/// Where and how a renderable keeps its vertex data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageStrategy {
    /// No storage: the mesh is replayed as a recorded list of immediate commands.
    Immediate,
    /// Per-channel arrays kept in client memory and handed to the device at draw time.
    ClientArrays,
    /// Device-resident buffers.
    Buffers {
        /// How channels are split across buffers.
        layout: BufferLayoutMode,
        /// Whether a vertex array captures the bindings at build time.
        vertex_array: bool,
    },
}

impl StorageStrategy {
    /// Interleaved buffers restored through a vertex array.
    pub const INTERLEAVED_VERTEX_ARRAY: StorageStrategy = StorageStrategy::Buffers {
        layout: BufferLayoutMode::Interleaved,
        vertex_array: true,
    };

    /// Every strategy, for exhaustive tests and tooling.
    pub const ALL: [StorageStrategy; 6] = [
        StorageStrategy::Immediate,
        StorageStrategy::ClientArrays,
        StorageStrategy::Buffers {
            layout: BufferLayoutMode::Interleaved,
            vertex_array: false,
        },
        StorageStrategy::INTERLEAVED_VERTEX_ARRAY,
        StorageStrategy::Buffers {
            layout: BufferLayoutMode::PerChannel,
            vertex_array: false,
        },
        StorageStrategy::Buffers {
            layout: BufferLayoutMode::PerChannel,
            vertex_array: true,
        },
    ];

    /// Returns `true` if this strategy allocates device buffers.
    pub const fn uses_device_buffers(self) -> bool {
        matches!(self, StorageStrategy::Buffers { .. })
    }

    /// Returns `true` if this strategy can issue indexed draws.
    pub const fn supports_indices(self) -> bool {
        !matches!(self, StorageStrategy::Immediate)
    }
}

impl Default for StorageStrategy {
    fn default() -> Self {
        Self::INTERLEAVED_VERTEX_ARRAY
    }
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageStrategy::Immediate => write!(f, "immediate"),
            StorageStrategy::ClientArrays => write!(f, "client-arrays"),
            StorageStrategy::Buffers {
                layout,
                vertex_array,
            } => {
                let layout = match layout {
                    BufferLayoutMode::Interleaved => "interleaved",
                    BufferLayoutMode::PerChannel => "per-channel",
                };
                if *vertex_array {
                    write!(f, "{layout}+vertex-array")
                } else {
                    write!(f, "{layout}")
                }
            }
        }
    }
}
