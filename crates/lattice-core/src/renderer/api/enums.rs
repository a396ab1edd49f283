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

//! Generic rendering enums.

use serde::{Deserialize, Serialize};

/// Defines how vertices are connected to form a geometric primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Vertices are rendered as isolated points.
    Points,
    /// Every two vertices form a line.
    Lines,
    /// A connected line strip.
    LineStrip,
    /// A connected line strip closed back to its first vertex.
    LineLoop,
    /// Every three vertices form a triangle.
    Triangles,
    /// A connected triangle strip.
    TriangleStrip,
    /// A triangle fan around the first vertex.
    TriangleFan,
    /// Every four vertices form a quad.
    Quads,
    /// A connected quad strip.
    QuadStrip,
    /// A single convex polygon.
    Polygon,
}

/// Specifies the data type of indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexFormat {
    /// Indices are 16-bit unsigned integers.
    Uint16,
    /// Indices are 32-bit unsigned integers.
    Uint32,
}

impl IndexFormat {
    /// Returns the size in bytes of a single index.
    pub const fn size(self) -> usize {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }

    /// Returns the largest index value this format can represent.
    pub const fn max_value(self) -> u32 {
        match self {
            IndexFormat::Uint16 => u16::MAX as u32,
            IndexFormat::Uint32 => u32::MAX,
        }
    }

    /// Returns `true` if `index` can be stored without truncation.
    pub const fn fits(self, index: u32) -> bool {
        index <= self.max_value()
    }

    /// Returns the narrowest format able to hold `max_index`.
    pub const fn narrowest_for(max_index: u32) -> Self {
        if IndexFormat::Uint16.fits(max_index) {
            IndexFormat::Uint16
        } else {
            IndexFormat::Uint32
        }
    }
}
