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

//! Turns a mesh into the byte streams or commands a storage strategy uploads.

use lattice_core::geometry::{Mesh, Segment};
use lattice_core::layout::{Channel, ChannelFormat, InterleavedLayout, PerChannelLayout};
use lattice_core::renderer::{
    BufferLayoutMode, ImmediateCommand, IndexFormat, IndexMode, PoolId, StorageStrategy,
};
use lattice_data::LayoutEntry;

use super::encode::{encode_indices, encode_into};
use crate::error::BuildError;

/// Where one segment landed in the filled vertex and index data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpan {
    /// First emitted vertex of the segment.
    pub first_vertex: u32,
    /// Vertices emitted for the segment.
    pub vertex_count: u32,
    /// Elements a draw of this segment submits.
    pub element_count: u32,
    /// Byte offset of the segment's indices, `None` for a plain vertex run.
    pub index_offset: Option<u64>,
}

/// Encoded data of one channel stored on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStream {
    /// The channel.
    pub channel: Channel,
    /// Its format.
    pub format: ChannelFormat,
    /// Tightly packed values, `format.byte_width()` bytes per vertex.
    pub bytes: Vec<u8>,
}

/// The shared index array of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexData {
    /// Encoding of every index.
    pub format: IndexFormat,
    /// Encoded indices, already rebased to the first vertex of their segment.
    pub bytes: Vec<u8>,
}

/// Vertex data in the shape a storage strategy consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexData {
    /// Nothing to store or draw.
    Empty,
    /// One block with every channel of a vertex next to each other.
    Interleaved {
        /// Stride and channel offsets.
        layout: InterleavedLayout,
        /// Encoded vertices.
        bytes: Vec<u8>,
    },
    /// One block per channel, in fixed channel order.
    PerChannel(Vec<ChannelStream>),
    /// One command list per segment.
    Immediate(Vec<Vec<ImmediateCommand>>),
}

/// Everything a renderable needs to upload one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledMesh {
    /// One span per mesh segment, in segment order.
    pub spans: Vec<SegmentSpan>,
    /// Total vertices emitted.
    pub vertex_count: u32,
    /// Encoded vertex data.
    pub vertices: VertexData,
    /// Shared index array, present only when some segment draws indexed.
    pub indices: Option<IndexData>,
}

/// How [`fill`] lays data out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOptions {
    /// The strategy the data is destined for.
    pub strategy: StorageStrategy,
    /// Whether indices are kept or expanded.
    pub index_mode: IndexMode,
    /// Required index encoding, `None` for the narrowest that fits.
    pub index_format: Option<IndexFormat>,
}

impl FillOptions {
    fn keeps_indices(&self) -> bool {
        self.index_mode == IndexMode::Indexed && self.strategy.supports_indices()
    }
}

/// Calls `emit` with the source index of every vertex `segment` emits, in order.
///
/// Every strategy walks vertices through this, so vertex `n` of one strategy
/// is vertex `n` of any other.
pub fn for_each_vertex(segment: &Segment, expand: bool, mut emit: impl FnMut(usize)) {
    match segment.indices().filter(|_| expand) {
        Some(indices) => indices.iter().for_each(|&i| emit(i as usize)),
        None => (0..segment.vertex_count()).for_each(emit),
    }
}

fn vertex_values(segment: &Segment, channel: Channel, components: u8, source: usize) -> &[f32] {
    let n = usize::from(components);
    segment
        .channel(channel)
        .and_then(|data| data.get(source * n..(source + 1) * n))
        .unwrap_or_default()
}

fn to_u32(mesh: &Mesh, count: u64) -> Result<u32, BuildError> {
    u32::try_from(count).map_err(|_| BuildError::TooManyVertices {
        mesh: mesh.label().to_owned(),
        count,
    })
}

/// Fills `mesh` against the pooled layout `layout_id`.
///
/// The mesh is validated first. Every channel the mesh declares must be present
/// in the layout with the same component count; the layout decides encodings.
///
/// # Errors
/// * `BuildError::Geometry` - If the mesh is malformed.
/// * `BuildError::ChannelMismatch` - If the layout has a different channel shape.
/// * `BuildError::IndexOverflow` - If a rebased index does not fit the required format.
/// * `BuildError::TooManyVertices` - If the emitted vertex count exceeds `u32`.
pub fn fill(
    mesh: &Mesh,
    layout_id: PoolId,
    layout: &LayoutEntry,
    options: &FillOptions,
) -> Result<FilledMesh, BuildError> {
    mesh.validate()?;
    for channel in Channel::ORDER {
        let declared = layout.descriptor.get(channel).map(|f| f.components);
        if declared != mesh.components(channel) {
            return Err(BuildError::ChannelMismatch {
                mesh: mesh.label().to_owned(),
                layout: layout_id,
                channel,
            });
        }
    }

    let keep_indices = options.keeps_indices();
    if mesh.has_indices() && options.index_mode == IndexMode::Indexed && !keep_indices {
        log::warn!(
            "Mesh '{}': {} storage cannot draw indexed, expanding indices",
            mesh.label(),
            options.strategy
        );
    }

    // Spans and rebased indices. Index offsets are patched once the format is known.
    let mut spans = Vec::with_capacity(mesh.segments().len());
    let mut indices: Vec<u32> = Vec::new();
    let mut index_ranges: Vec<(usize, usize)> = Vec::new();
    let mut emitted: u64 = 0;
    for segment in mesh.segments() {
        let first_vertex = to_u32(mesh, emitted)?;
        let (vertex_count, element_count, index_start) = match segment.indices() {
            Some(segment_indices) if keep_indices => {
                let start = indices.len();
                for &i in segment_indices {
                    indices.push(to_u32(mesh, u64::from(first_vertex) + u64::from(i))?);
                }
                (
                    segment.vertex_count() as u64,
                    segment_indices.len() as u64,
                    Some(start),
                )
            }
            Some(segment_indices) => {
                let n = segment_indices.len() as u64;
                (n, n, None)
            }
            None => {
                let n = segment.vertex_count() as u64;
                (n, n, None)
            }
        };
        if let Some(start) = index_start {
            index_ranges.push((spans.len(), start));
        }
        spans.push(SegmentSpan {
            first_vertex,
            vertex_count: to_u32(mesh, vertex_count)?,
            element_count: to_u32(mesh, element_count)?,
            index_offset: index_start.map(|start| start as u64),
        });
        emitted += vertex_count;
    }
    let vertex_count = to_u32(mesh, emitted)?;

    if layout.descriptor.is_empty() || vertex_count == 0 {
        log::debug!("Mesh '{}' has nothing to fill", mesh.label());
        return Ok(FilledMesh {
            spans,
            vertex_count,
            vertices: VertexData::Empty,
            indices: None,
        });
    }

    let indices = if indices.is_empty() {
        None
    } else {
        let format = index_format(mesh, &index_ranges, &indices, options)?;
        for span in &mut spans {
            if let Some(start) = span.index_offset.as_mut() {
                *start *= format.size() as u64;
            }
        }
        Some(IndexData {
            format,
            bytes: encode_indices(format, &indices),
        })
    };

    let expand = !keep_indices;
    let vertices = match options.strategy {
        StorageStrategy::Immediate => VertexData::Immediate(fill_immediate(mesh, layout)),
        StorageStrategy::Buffers {
            layout: BufferLayoutMode::Interleaved,
            ..
        } => fill_interleaved(mesh, &layout.interleaved, vertex_count, expand),
        StorageStrategy::ClientArrays
        | StorageStrategy::Buffers {
            layout: BufferLayoutMode::PerChannel,
            ..
        } => fill_per_channel(mesh, layout, vertex_count, expand),
    };

    log::debug!(
        "Filled mesh '{}' for {}: {} segments, {} vertices, {} indices",
        mesh.label(),
        options.strategy,
        spans.len(),
        vertex_count,
        indices
            .as_ref()
            .map_or(0, |i| i.bytes.len() / i.format.size())
    );
    Ok(FilledMesh {
        spans,
        vertex_count,
        vertices,
        indices,
    })
}

fn index_format(
    mesh: &Mesh,
    ranges: &[(usize, usize)],
    indices: &[u32],
    options: &FillOptions,
) -> Result<IndexFormat, BuildError> {
    let Some(format) = options.index_format else {
        let max = indices.iter().copied().max().unwrap_or_default();
        return Ok(IndexFormat::narrowest_for(max));
    };
    if let Some(position) = indices.iter().position(|&i| !format.fits(i)) {
        // The offending segment is the last one whose indices start at or before it.
        let segment = ranges
            .iter()
            .rev()
            .find(|(_, start)| *start <= position)
            .map_or(0, |(segment, _)| *segment);
        return Err(BuildError::IndexOverflow {
            mesh: mesh.label().to_owned(),
            segment,
            index: u64::from(indices[position]),
            format,
        });
    }
    Ok(format)
}

fn fill_interleaved(
    mesh: &Mesh,
    layout: &InterleavedLayout,
    vertex_count: u32,
    expand: bool,
) -> VertexData {
    let stride = layout.stride() as usize;
    let mut bytes = vec![0u8; vertex_count as usize * stride];
    let mut vertex = 0usize;
    for segment in mesh.segments() {
        for_each_vertex(segment, expand, |source| {
            let base = vertex * stride;
            for placement in layout.placements() {
                let start = base + placement.offset as usize;
                let end = start + placement.format.byte_width() as usize;
                encode_into(
                    placement.format,
                    vertex_values(segment, placement.channel, placement.format.components, source),
                    &mut bytes[start..end],
                );
            }
            vertex += 1;
        });
    }
    VertexData::Interleaved {
        layout: layout.clone(),
        bytes,
    }
}

fn fill_per_channel(
    mesh: &Mesh,
    layout: &LayoutEntry,
    vertex_count: u32,
    expand: bool,
) -> VertexData {
    let extents = PerChannelLayout::compute(&layout.descriptor, vertex_count as usize);
    let streams = extents
        .extents()
        .iter()
        .map(|extent| {
            let width = extent.format.byte_width() as usize;
            let mut bytes = vec![0u8; extent.size as usize];
            let mut vertex = 0usize;
            for segment in mesh.segments() {
                for_each_vertex(segment, expand, |source| {
                    let start = vertex * width;
                    encode_into(
                        extent.format,
                        vertex_values(segment, extent.channel, extent.format.components, source),
                        &mut bytes[start..start + width],
                    );
                    vertex += 1;
                });
            }
            ChannelStream {
                channel: extent.channel,
                format: extent.format,
                bytes,
            }
        })
        .collect();
    VertexData::PerChannel(streams)
}

fn fill_immediate(mesh: &Mesh, layout: &LayoutEntry) -> Vec<Vec<ImmediateCommand>> {
    mesh.segments()
        .iter()
        .map(|segment| {
            let mut commands = vec![ImmediateCommand::Begin(segment.topology())];
            for_each_vertex(segment, true, |source| {
                // Position comes last in the fixed order and emits the vertex.
                for (channel, format) in layout.descriptor.present() {
                    commands.push(ImmediateCommand::attribute(
                        channel,
                        vertex_values(segment, channel, format.components, source),
                    ));
                }
            });
            commands.push(ImmediateCommand::End);
            commands
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::layout::{Encoding, LayoutDescriptor};
    use lattice_core::renderer::{ChannelEncodings, PrimitiveTopology};
    use lattice_data::LayoutPool;

    fn options(strategy: StorageStrategy, index_mode: IndexMode) -> FillOptions {
        FillOptions {
            strategy,
            index_mode,
            index_format: None,
        }
    }

    fn entry_for(mesh: &Mesh) -> (PoolId, LayoutEntry) {
        let mut pool = LayoutPool::new();
        let id = pool
            .resolve(&mesh.layout_descriptor(&ChannelEncodings::default()))
            .unwrap();
        (id, pool.get_by_id(id).unwrap().clone())
    }

    fn quad() -> Mesh {
        Mesh::new("quad")
            .with_channel(Channel::Position, 3)
            .with_channel(Channel::Color, 4)
            .with_segment(
                Segment::new(PrimitiveTopology::Quads, 4)
                    .with_channel(
                        Channel::Position,
                        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
                    )
                    .with_channel(Channel::Color, vec![0.5; 16]),
            )
    }

    fn two_indexed_triangles() -> Mesh {
        let segment = |z: f32| {
            Segment::new(PrimitiveTopology::Triangles, 3)
                .with_channel(Channel::Position, vec![0.0, 1.0, z, 2.0, 3.0, z, 4.0, 5.0, z])
                .with_indices(vec![2, 1, 0])
        };
        Mesh::new("pair")
            .with_channel(Channel::Position, 3)
            .with_segment(segment(0.0))
            .with_segment(segment(1.0))
    }

    #[test]
    fn test_interleaved_scenario_places_color_first() {
        let mesh = quad();
        let (id, entry) = entry_for(&mesh);
        let filled = fill(
            &mesh,
            id,
            &entry,
            &options(StorageStrategy::default(), IndexMode::Indexed),
        )
        .unwrap();

        let VertexData::Interleaved { layout, bytes } = &filled.vertices else {
            panic!("expected interleaved data");
        };
        assert_eq!(layout.stride(), 28);
        assert_eq!(bytes.len(), 4 * 28);
        // Vertex 1: color at 0, position x at 16.
        assert_eq!(&bytes[28..32], bytemuck::bytes_of(&0.5f32));
        assert_eq!(&bytes[28 + 16..28 + 20], bytemuck::bytes_of(&1.0f32));
        assert_eq!(
            filled.spans,
            vec![SegmentSpan {
                first_vertex: 0,
                vertex_count: 4,
                element_count: 4,
                index_offset: None,
            }]
        );
        assert!(filled.indices.is_none());
    }

    #[test]
    fn test_indices_are_rebased_per_segment() {
        let mesh = two_indexed_triangles();
        let (id, entry) = entry_for(&mesh);
        let filled = fill(
            &mesh,
            id,
            &entry,
            &options(StorageStrategy::default(), IndexMode::Indexed),
        )
        .unwrap();

        let indices = filled.indices.unwrap();
        assert_eq!(indices.format, IndexFormat::Uint16);
        assert_eq!(indices.bytes, encode_indices(IndexFormat::Uint16, &[2, 1, 0, 5, 4, 3]));
        assert_eq!(filled.spans[0].index_offset, Some(0));
        assert_eq!(filled.spans[1].index_offset, Some(6));
        assert_eq!(filled.spans[1].first_vertex, 3);
        assert_eq!(filled.vertex_count, 6);
    }

    #[test]
    fn test_expanded_mode_emits_vertices_in_index_order() {
        let mesh = two_indexed_triangles();
        let (id, entry) = entry_for(&mesh);
        let filled = fill(
            &mesh,
            id,
            &entry,
            &options(StorageStrategy::default(), IndexMode::Expanded),
        )
        .unwrap();

        assert!(filled.indices.is_none());
        assert!(filled.spans.iter().all(|s| s.index_offset.is_none()));
        let VertexData::Interleaved { bytes, .. } = &filled.vertices else {
            panic!("expected interleaved data");
        };
        // The first emitted vertex is source vertex 2: (4, 5, 0).
        assert_eq!(&bytes[..4], bytemuck::bytes_of(&4.0f32));
    }

    #[test]
    fn test_immediate_always_expands_and_sends_position_last() {
        let mut mesh = two_indexed_triangles().with_channel(Channel::Normal, 3);
        for i in 0..2 {
            if let Some(segment) = mesh.segment_mut(i) {
                segment.set_channel(Channel::Normal, vec![0.0, 0.0, 1.0].repeat(3));
            }
        }
        let (id, entry) = entry_for(&mesh);
        let filled = fill(
            &mesh,
            id,
            &entry,
            &options(StorageStrategy::Immediate, IndexMode::Indexed),
        )
        .unwrap();

        assert!(filled.indices.is_none());
        let VertexData::Immediate(lists) = &filled.vertices else {
            panic!("expected immediate commands");
        };
        assert_eq!(lists.len(), 2);
        let first = &lists[0];
        assert_eq!(first[0], ImmediateCommand::Begin(PrimitiveTopology::Triangles));
        assert_eq!(first[1], ImmediateCommand::attribute(Channel::Normal, &[0.0, 0.0, 1.0]));
        assert_eq!(first[2], ImmediateCommand::attribute(Channel::Position, &[4.0, 5.0, 0.0]));
        assert_eq!(first.last(), Some(&ImmediateCommand::End));
        assert_eq!(first.iter().filter(|c| c.emits_vertex()).count(), 3);
    }

    #[test]
    fn test_per_channel_streams_follow_fixed_order() {
        let mesh = quad();
        let (id, entry) = entry_for(&mesh);
        let strategy = StorageStrategy::Buffers {
            layout: BufferLayoutMode::PerChannel,
            vertex_array: false,
        };
        let filled = fill(&mesh, id, &entry, &options(strategy, IndexMode::Indexed)).unwrap();
        let VertexData::PerChannel(streams) = &filled.vertices else {
            panic!("expected per-channel data");
        };
        let channels: Vec<_> = streams.iter().map(|s| s.channel).collect();
        assert_eq!(channels, [Channel::Color, Channel::Position]);
        assert_eq!(streams[0].bytes.len(), 64);
        assert_eq!(streams[1].bytes.len(), 48);
    }

    #[test]
    fn test_client_arrays_keep_one_array_per_channel() {
        let mesh = quad();
        let (id, entry) = entry_for(&mesh);
        let filled = fill(
            &mesh,
            id,
            &entry,
            &options(StorageStrategy::ClientArrays, IndexMode::Indexed),
        )
        .unwrap();
        let VertexData::PerChannel(streams) = &filled.vertices else {
            panic!("expected per-channel data, got {:?}", filled.vertices);
        };
        assert_eq!(streams.len(), 2);
        for stream in streams {
            let width = stream.format.byte_width() as usize;
            assert_eq!(stream.bytes.len(), width * 4, "{}", stream.channel);
        }
        assert_eq!(&streams[1].bytes[12..16], bytemuck::bytes_of(&1.0f32));
    }

    #[test]
    fn test_required_narrow_format_overflow_is_an_error() {
        let big = 70_000;
        let mesh = Mesh::new("big")
            .with_channel(Channel::Position, 1)
            .with_segment(
                Segment::new(PrimitiveTopology::Points, big)
                    .with_channel(Channel::Position, vec![0.0; big])
                    .with_indices(vec![0, 69_999]),
            );
        let (id, entry) = entry_for(&mesh);
        let mut opts = options(StorageStrategy::default(), IndexMode::Indexed);
        opts.index_format = Some(IndexFormat::Uint16);

        match fill(&mesh, id, &entry, &opts) {
            Err(BuildError::IndexOverflow {
                mesh,
                segment,
                index,
                format,
            }) => {
                assert_eq!(mesh, "big");
                assert_eq!(segment, 0);
                assert_eq!(index, 69_999);
                assert_eq!(format, IndexFormat::Uint16);
            }
            other => panic!("expected IndexOverflow, got {other:?}"),
        }

        opts.index_format = None;
        let filled = fill(&mesh, id, &entry, &opts).unwrap();
        assert_eq!(filled.indices.unwrap().format, IndexFormat::Uint32);
    }

    #[test]
    fn test_short_channel_fails_fast() {
        let mesh = Mesh::new("short")
            .with_channel(Channel::Position, 3)
            .with_segment(
                Segment::new(PrimitiveTopology::Triangles, 3)
                    .with_channel(Channel::Position, vec![0.0; 6]),
            );
        let (id, entry) = entry_for(&mesh);
        let result = fill(
            &mesh,
            id,
            &entry,
            &options(StorageStrategy::default(), IndexMode::Indexed),
        );
        assert!(matches!(result, Err(BuildError::Geometry(_))));
    }

    #[test]
    fn test_layout_with_other_shape_is_a_mismatch() {
        let mesh = quad();
        let mut pool = LayoutPool::new();
        let other = LayoutDescriptor::empty()
            .with(Channel::Position, ChannelFormat::float32(3))
            .with(Channel::Normal, ChannelFormat::float32(3));
        let id = pool.register("other", other).unwrap();
        let entry = pool.get_by_id(id).unwrap().clone();
        let result = fill(
            &mesh,
            id,
            &entry,
            &options(StorageStrategy::default(), IndexMode::Indexed),
        );
        assert!(matches!(
            result,
            Err(BuildError::ChannelMismatch {
                channel: Channel::Color,
                ..
            })
        ));
    }

    #[test]
    fn test_layout_encodings_are_honored() {
        let mesh = quad();
        let mut pool = LayoutPool::new();
        let descriptor = LayoutDescriptor::empty()
            .with(Channel::Color, ChannelFormat::new(4, Encoding::Unorm8))
            .with(Channel::Position, ChannelFormat::float32(3));
        let id = pool.register("packed", descriptor).unwrap();
        let entry = pool.get_by_id(id).unwrap().clone();
        let filled = fill(
            &mesh,
            id,
            &entry,
            &options(StorageStrategy::default(), IndexMode::Indexed),
        )
        .unwrap();
        let VertexData::Interleaved { layout, bytes } = &filled.vertices else {
            panic!("expected interleaved data");
        };
        assert_eq!(layout.stride(), 16);
        assert_eq!(&bytes[..4], &[128, 128, 128, 128]);
    }

    #[test]
    fn test_channel_less_mesh_fills_nothing() {
        let mesh = Mesh::new("empty").with_segment(Segment::new(PrimitiveTopology::Points, 0));
        let (id, entry) = entry_for(&mesh);
        let filled = fill(
            &mesh,
            id,
            &entry,
            &options(StorageStrategy::default(), IndexMode::Indexed),
        )
        .unwrap();
        assert_eq!(filled.vertices, VertexData::Empty);
        assert_eq!(filled.spans.len(), 1);
    }
}
