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

use lattice_core::geometry::Mesh;
use lattice_core::renderer::{PoolId, PrimitiveTopology, RenderDevice};
use lattice_data::ResourcePools;

use crate::bind_lane::BindState;
use crate::build_lane::SegmentSpan;
use crate::error::BuildError;

/// What one segment needs to be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    /// Topology.
    pub topology: PrimitiveTopology,
    /// Elements submitted by the draw.
    pub element_count: u32,
    /// First vertex of a plain vertex run.
    pub first_vertex: u32,
    /// Byte offset into the index array for indexed draws.
    pub index_offset: Option<u64>,
    /// Shader identity, [`PoolId::NONE`] for no program.
    pub shader: PoolId,
    /// Texture identities per unit.
    pub textures: Vec<(u32, PoolId)>,
}

/// Per-segment draw records of one mesh snapshot.
///
/// Names are resolved to pool identities once, at build time. The list is
/// replaced as a whole when the mesh structure changes and never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawCallList {
    records: Vec<DrawRecord>,
}

impl DrawCallList {
    /// Builds the records of `mesh`, whose segments were filled into `spans`.
    ///
    /// # Errors
    /// * `BuildError::UnresolvedShader` / `UnresolvedTexture` - If a material
    ///   names a resource not present in `pools`.
    /// * `BuildError::TextureUnitOutOfRange` - If a material uses a unit at or
    ///   past `texture_units`.
    pub fn build(
        mesh: &Mesh,
        spans: &[SegmentSpan],
        pools: &ResourcePools,
        texture_units: u32,
    ) -> Result<Self, BuildError> {
        let mut records = Vec::with_capacity(spans.len());
        for (index, (segment, span)) in mesh.segments().iter().zip(spans).enumerate() {
            let mut shader = PoolId::NONE;
            let mut textures = Vec::new();
            if let Some(material) = segment.material() {
                if let Some(name) = &material.shader {
                    shader = pools.shaders.find(name.as_str()).map(|(id, _)| id).ok_or_else(|| {
                        BuildError::UnresolvedShader {
                            mesh: mesh.label().to_owned(),
                            segment: index,
                            name: name.clone(),
                        }
                    })?;
                }
                for binding in &material.textures {
                    if binding.slot >= texture_units {
                        return Err(BuildError::TextureUnitOutOfRange {
                            mesh: mesh.label().to_owned(),
                            segment: index,
                            slot: binding.slot,
                            units: texture_units,
                        });
                    }
                    let id = pools
                        .textures
                        .find(binding.file.as_str())
                        .map(|(id, _)| id)
                        .ok_or_else(|| BuildError::UnresolvedTexture {
                            mesh: mesh.label().to_owned(),
                            segment: index,
                            slot: binding.slot,
                            file: binding.file.clone(),
                        })?;
                    textures.push((binding.slot, id));
                }
            }
            records.push(DrawRecord {
                topology: segment.topology(),
                element_count: span.element_count,
                first_vertex: span.first_vertex,
                index_offset: span.index_offset,
                shader,
                textures,
            });
        }
        log::debug!(
            "Built {} draw records for mesh '{}'",
            records.len(),
            mesh.label()
        );
        Ok(Self { records })
    }

    /// The records, in segment order.
    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Binds each record's program and textures, then calls `draw` with the
    /// record and its segment index.
    ///
    /// Texture units in the flag window that a record does not name are
    /// emptied so the previous segment's textures do not leak into it.
    /// Records with no elements are skipped.
    pub fn replay(
        &self,
        device: &dyn RenderDevice,
        pools: &ResourcePools,
        binds: &mut BindState,
        mut draw: impl FnMut(&mut BindState, usize, &DrawRecord),
    ) -> Result<(), BuildError> {
        for (segment, record) in self.records.iter().enumerate() {
            if record.element_count == 0 {
                continue;
            }
            let program = if record.shader == PoolId::NONE {
                None
            } else {
                Some(pools.program(record.shader)?)
            };
            binds.use_program(device, program);

            for unit in 0..binds.textured_window() {
                if !record.textures.iter().any(|(slot, _)| *slot == unit) {
                    binds.unbind_texture(device, unit);
                }
            }
            for &(unit, texture) in &record.textures {
                binds.bind_texture(device, unit, Some(pools.texture(texture)?));
            }

            draw(binds, segment, record);
            binds.record_draw(record.element_count);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::geometry::{MaterialRef, Segment};
    use lattice_core::layout::Channel;
    use lattice_core::renderer::{ProgramId, TextureId};

    fn span(first_vertex: u32, count: u32) -> SegmentSpan {
        SegmentSpan {
            first_vertex,
            vertex_count: count,
            element_count: count,
            index_offset: None,
        }
    }

    fn mesh_with(material: MaterialRef) -> Mesh {
        Mesh::new("textured")
            .with_channel(Channel::Position, 2)
            .with_segment(
                Segment::new(PrimitiveTopology::Lines, 2)
                    .with_channel(Channel::Position, vec![0.0; 4])
                    .with_material(material),
            )
    }

    #[test]
    fn test_names_resolve_to_pool_identities() {
        let mut pools = ResourcePools::new();
        let shader = pools.shaders.add("flat".to_owned(), ProgramId(1)).unwrap();
        let texture = pools
            .textures
            .add("wall.png".to_owned(), TextureId(2))
            .unwrap();
        let mesh = mesh_with(MaterialRef::new().with_shader("flat").with_texture(2, "wall.png"));

        let list = DrawCallList::build(&mesh, &[span(0, 2)], &pools, 8).unwrap();
        assert_eq!(list.len(), 1);
        let record = &list.records()[0];
        assert_eq!(record.shader, shader);
        assert_eq!(record.textures, vec![(2, texture)]);
        assert_eq!(record.topology, PrimitiveTopology::Lines);
    }

    #[test]
    fn test_segments_without_material_draw_without_a_program() {
        let mesh = Mesh::new("plain")
            .with_channel(Channel::Position, 2)
            .with_segment(
                Segment::new(PrimitiveTopology::Lines, 2).with_channel(Channel::Position, vec![0.0; 4]),
            );
        let list = DrawCallList::build(&mesh, &[span(0, 2)], &ResourcePools::new(), 8).unwrap();
        assert_eq!(list.records()[0].shader, PoolId::NONE);
        assert!(list.records()[0].textures.is_empty());
    }

    #[test]
    fn test_unknown_names_are_build_errors() {
        let pools = ResourcePools::new();
        let mesh = mesh_with(MaterialRef::new().with_shader("missing"));
        assert!(matches!(
            DrawCallList::build(&mesh, &[span(0, 2)], &pools, 8),
            Err(BuildError::UnresolvedShader { segment: 0, .. })
        ));

        let mesh = mesh_with(MaterialRef::new().with_texture(0, "missing.png"));
        assert!(matches!(
            DrawCallList::build(&mesh, &[span(0, 2)], &pools, 8),
            Err(BuildError::UnresolvedTexture { slot: 0, .. })
        ));
    }

    #[test]
    fn test_texture_unit_past_limit_is_rejected() {
        let mut pools = ResourcePools::new();
        pools
            .textures
            .add("a.png".to_owned(), TextureId(1))
            .unwrap();
        let mesh = mesh_with(MaterialRef::new().with_texture(4, "a.png"));
        assert!(matches!(
            DrawCallList::build(&mesh, &[span(0, 2)], &pools, 4),
            Err(BuildError::TextureUnitOutOfRange { slot: 4, units: 4, .. })
        ));
    }
}
