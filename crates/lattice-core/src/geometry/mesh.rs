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

use super::material::MaterialRef;
use crate::layout::{Channel, ChannelFormat, LayoutDescriptor};
use crate::renderer::api::{ChannelEncodings, PoolId, PrimitiveTopology};
use crate::renderer::error::GeometryError;

/// One drawable chunk of a mesh.
///
/// Channel arrays are flat: vertex `i` of a channel with `n` components occupies
/// `data[i * n..(i + 1) * n]`. Indices, when present, are relative to the
/// segment's own vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    topology: PrimitiveTopology,
    vertex_count: usize,
    channels: [Vec<f32>; Channel::COUNT],
    indices: Option<Vec<u32>>,
    material: Option<MaterialRef>,
}

impl Segment {
    /// Creates a segment of `vertex_count` vertices with no channel data.
    pub fn new(topology: PrimitiveTopology, vertex_count: usize) -> Self {
        Self {
            topology,
            vertex_count,
            channels: Default::default(),
            indices: None,
            material: None,
        }
    }

    /// Sets the data of one channel.
    pub fn with_channel(mut self, channel: Channel, data: Vec<f32>) -> Self {
        self.set_channel(channel, data);
        self
    }

    /// Sets the index array.
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Sets the material.
    pub fn with_material(mut self, material: MaterialRef) -> Self {
        self.material = Some(material);
        self
    }

    /// Replaces the data of one channel. An empty vector removes it.
    pub fn set_channel(&mut self, channel: Channel, data: Vec<f32>) {
        self.channels[channel.index()] = data;
    }

    /// Primitive topology.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of elements a draw submits: the index count if indexed, else the vertex count.
    pub fn element_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.vertex_count, |indices| indices.len())
    }

    /// Returns the data of `channel`, or `None` if the segment has none.
    pub fn channel(&self, channel: Channel) -> Option<&[f32]> {
        let data = &self.channels[channel.index()];
        (!data.is_empty()).then_some(data.as_slice())
    }

    /// Index array, if any.
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Material, if any.
    pub fn material(&self) -> Option<&MaterialRef> {
        self.material.as_ref()
    }
}

/// An ordered list of segments sharing one channel shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    label: String,
    components: [u8; Channel::COUNT],
    segments: Vec<Segment>,
    layout_hint: Option<PoolId>,
}

impl Mesh {
    /// Creates an empty mesh with no channels.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            components: [0; Channel::COUNT],
            segments: Vec::new(),
            layout_hint: None,
        }
    }

    /// Declares `channel` with `components` components per vertex.
    pub fn with_channel(mut self, channel: Channel, components: u8) -> Self {
        self.components[channel.index()] = components;
        self
    }

    /// Appends a segment.
    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Attaches a layout identity returned by a previous build.
    ///
    /// Builds verify the hint against the mesh's own shape and skip resolving
    /// the descriptor through the pool when it matches.
    pub fn with_layout_hint(mut self, layout: PoolId) -> Self {
        self.layout_hint = Some(layout);
        self
    }

    /// Appends a segment.
    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Mutable access to one segment, for data-only updates.
    pub fn segment_mut(&mut self, index: usize) -> Option<&mut Segment> {
        self.segments.get_mut(index)
    }

    /// The mesh label used in logs and errors.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Segments in draw order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Layout identity hint, if any.
    pub fn layout_hint(&self) -> Option<PoolId> {
        self.layout_hint
    }

    /// Component count of `channel`, or `None` if not declared.
    pub fn components(&self, channel: Channel) -> Option<u8> {
        match self.components[channel.index()] {
            0 => None,
            n => Some(n),
        }
    }

    /// Returns `true` if `channel` is declared.
    pub fn has_channel(&self, channel: Channel) -> bool {
        self.components(channel).is_some()
    }

    /// Total number of vertices across segments.
    pub fn vertex_count(&self) -> usize {
        self.segments.iter().map(Segment::vertex_count).sum()
    }

    /// Returns `true` if any segment is indexed.
    pub fn has_indices(&self) -> bool {
        self.segments.iter().any(|s| s.indices.is_some())
    }

    /// Builds the layout descriptor of this mesh using `encodings` for each channel.
    pub fn layout_descriptor(&self, encodings: &ChannelEncodings) -> LayoutDescriptor {
        let mut descriptor = LayoutDescriptor::empty();
        for channel in Channel::ORDER {
            if let Some(components) = self.components(channel) {
                descriptor.set(
                    channel,
                    Some(ChannelFormat::new(components, encodings.get(channel))),
                );
            }
        }
        descriptor
    }

    /// Checks every segment against the declared channel shape.
    ///
    /// A declared channel must hold exactly `vertex_count × components` floats in
    /// every segment; an undeclared channel must hold none. Indices must refer to
    /// vertices of their own segment.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for channel in Channel::ORDER {
            if let Some(components @ 5..) = self.components(channel) {
                return Err(GeometryError::BadComponentCount {
                    mesh: self.label.clone(),
                    channel,
                    components,
                });
            }
        }

        for (index, segment) in self.segments.iter().enumerate() {
            for channel in Channel::ORDER {
                match (self.components(channel), segment.channel(channel)) {
                    (Some(_), None) if segment.vertex_count > 0 => {
                        return Err(GeometryError::MissingChannel {
                            mesh: self.label.clone(),
                            segment: index,
                            channel,
                        });
                    }
                    (None, Some(_)) => {
                        return Err(GeometryError::UnexpectedChannel {
                            mesh: self.label.clone(),
                            segment: index,
                            channel,
                        });
                    }
                    (Some(components), data) => {
                        let expected = segment.vertex_count * usize::from(components);
                        let actual = data.map_or(0, <[f32]>::len);
                        if actual != expected {
                            return Err(GeometryError::ChannelLength {
                                mesh: self.label.clone(),
                                segment: index,
                                channel,
                                expected,
                                actual,
                            });
                        }
                    }
                    (None, None) => {}
                }
            }

            if let Some(indices) = segment.indices() {
                if let Some(&bad) = indices
                    .iter()
                    .find(|&&i| i as usize >= segment.vertex_count)
                {
                    return Err(GeometryError::IndexOutOfRange {
                        mesh: self.label.clone(),
                        segment: index,
                        index: bad,
                        vertex_count: segment.vertex_count,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Encoding;

    fn quad() -> Mesh {
        Mesh::new("quad")
            .with_channel(Channel::Position, 3)
            .with_channel(Channel::Color, 4)
            .with_segment(
                Segment::new(PrimitiveTopology::Quads, 4)
                    .with_channel(Channel::Position, vec![0.0; 12])
                    .with_channel(Channel::Color, vec![1.0; 16]),
            )
    }

    #[test]
    fn test_valid_mesh_passes() {
        let mesh = quad();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.vertex_count(), 4);
        assert!(!mesh.has_indices());
        assert_eq!(mesh.segments()[0].element_count(), 4);
    }

    #[test]
    fn test_missing_channel_names_mesh_segment_and_channel() {
        let mesh = quad().with_channel(Channel::Normal, 3);
        let err = mesh.validate().unwrap_err();
        assert_eq!(
            err,
            GeometryError::MissingChannel {
                mesh: "quad".into(),
                segment: 0,
                channel: Channel::Normal,
            }
        );
        assert_eq!(err.mesh(), "quad");
    }

    #[test]
    fn test_short_channel_fails_instead_of_zero_filling() {
        let mut mesh = quad();
        if let Some(segment) = mesh.segment_mut(0) {
            segment.set_channel(Channel::Position, vec![0.0; 9]);
        }
        assert!(matches!(
            mesh.validate(),
            Err(GeometryError::ChannelLength {
                channel: Channel::Position,
                expected: 12,
                actual: 9,
                ..
            })
        ));
    }

    #[test]
    fn test_undeclared_channel_data_is_rejected() {
        let mesh = quad().with_segment(
            Segment::new(PrimitiveTopology::Points, 1)
                .with_channel(Channel::Position, vec![0.0; 3])
                .with_channel(Channel::Color, vec![0.0; 4])
                .with_channel(Channel::TexCoord, vec![0.0; 2]),
        );
        assert!(matches!(
            mesh.validate(),
            Err(GeometryError::UnexpectedChannel {
                segment: 1,
                channel: Channel::TexCoord,
                ..
            })
        ));
    }

    #[test]
    fn test_index_past_segment_end_is_rejected() {
        let mesh = Mesh::new("tri").with_channel(Channel::Position, 2).with_segment(
            Segment::new(PrimitiveTopology::Triangles, 3)
                .with_channel(Channel::Position, vec![0.0; 6])
                .with_indices(vec![0, 1, 3]),
        );
        assert!(matches!(
            mesh.validate(),
            Err(GeometryError::IndexOutOfRange { index: 3, vertex_count: 3, .. })
        ));
    }

    #[test]
    fn test_component_count_above_four_is_rejected() {
        let mesh = Mesh::new("wide").with_channel(Channel::Color, 5);
        assert!(matches!(
            mesh.validate(),
            Err(GeometryError::BadComponentCount { components: 5, .. })
        ));
    }

    #[test]
    fn test_layout_descriptor_uses_configured_encodings() {
        let encodings = ChannelEncodings {
            color: Encoding::Unorm8,
            ..Default::default()
        };
        let desc = quad().layout_descriptor(&encodings);
        assert_eq!(
            desc.get(Channel::Color),
            Some(ChannelFormat::new(4, Encoding::Unorm8))
        );
        assert_eq!(desc.get(Channel::Position), Some(ChannelFormat::float32(3)));
        assert!(!desc.has(Channel::Normal));
    }
}
