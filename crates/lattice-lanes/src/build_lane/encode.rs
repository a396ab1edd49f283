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

use lattice_core::layout::{ChannelFormat, Encoding};
use lattice_core::renderer::IndexFormat;

/// Writes `values` encoded as `format` to the start of `out`.
///
/// `out` must hold at least `format.byte_width()` bytes and `values` exactly
/// `format.components` floats. Integer encodings round and saturate.
pub(crate) fn encode_into(format: ChannelFormat, values: &[f32], out: &mut [u8]) {
    let size = format.encoding.size() as usize;
    for (component, &value) in values.iter().enumerate() {
        let target = &mut out[component * size..(component + 1) * size];
        match format.encoding {
            Encoding::Float32 => target.copy_from_slice(bytemuck::bytes_of(&value)),
            Encoding::Float64 => target.copy_from_slice(bytemuck::bytes_of(&f64::from(value))),
            Encoding::Int16 => {
                // `as` saturates float to int conversions
                let value = value.round() as i16;
                target.copy_from_slice(bytemuck::bytes_of(&value));
            }
            Encoding::Int32 => {
                let value = value.round() as i32;
                target.copy_from_slice(bytemuck::bytes_of(&value));
            }
            Encoding::Unorm8 => target[0] = (value.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }
}

/// Encodes indices that are already known to fit `format`.
pub(crate) fn encode_indices(format: IndexFormat, indices: &[u32]) -> Vec<u8> {
    match format {
        IndexFormat::Uint16 => {
            let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            bytemuck::cast_slice(&narrow).to_vec()
        }
        IndexFormat::Uint32 => bytemuck::cast_slice(indices).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float32_is_copied_verbatim() {
        let mut out = [0u8; 8];
        encode_into(ChannelFormat::float32(2), &[1.5, -3.0], &mut out);
        assert_eq!(&out[..4], bytemuck::bytes_of(&1.5f32));
        assert_eq!(&out[4..], bytemuck::bytes_of(&-3.0f32));
    }

    #[test]
    fn test_integers_round_and_saturate() {
        let mut out = [0u8; 6];
        encode_into(
            ChannelFormat::new(3, Encoding::Int16),
            &[2.6, -1e9, 40000.0],
            &mut out,
        );
        let decoded: Vec<i16> = out
            .chunks(2)
            .map(bytemuck::pod_read_unaligned::<i16>)
            .collect();
        assert_eq!(decoded, [3, i16::MIN, i16::MAX]);
    }

    #[test]
    fn test_unorm8_clamps_to_unit_range() {
        let mut out = [0u8; 3];
        encode_into(ChannelFormat::new(3, Encoding::Unorm8), &[-0.5, 0.5, 2.0], &mut out);
        assert_eq!(out, [0, 128, 255]);
    }

    #[test]
    fn test_narrow_indices_take_two_bytes_each() {
        let bytes = encode_indices(IndexFormat::Uint16, &[1, 2, 65535]);
        assert_eq!(bytes.len(), 6);
        let decoded: Vec<u16> = bytes
            .chunks(2)
            .map(bytemuck::pod_read_unaligned::<u16>)
            .collect();
        assert_eq!(decoded, [1, 2, 65535]);
        assert_eq!(encode_indices(IndexFormat::Uint32, &[1]).len(), 4);
    }
}
