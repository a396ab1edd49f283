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

use bytemuck::pod_read_unaligned;
use lattice_core::layout::{ChannelFormat, Encoding};
use lattice_core::renderer::IndexFormat;

/// Returns `len` bytes at `offset`, or `None` if the range is out of bounds.
pub(super) fn slice_at(bytes: &[u8], offset: u64, len: usize) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    bytes.get(start..start.checked_add(len)?)
}

/// Decodes one vertex worth of `format` from the start of `bytes`.
pub(super) fn decode_attribute(format: ChannelFormat, bytes: &[u8]) -> Option<Vec<f32>> {
    let size = format.encoding.size() as usize;
    (0..usize::from(format.components))
        .map(|c| {
            let chunk = bytes.get(c * size..(c + 1) * size)?;
            Some(match format.encoding {
                Encoding::Float32 => pod_read_unaligned::<f32>(chunk),
                Encoding::Float64 => pod_read_unaligned::<f64>(chunk) as f32,
                Encoding::Int16 => f32::from(pod_read_unaligned::<i16>(chunk)),
                Encoding::Int32 => pod_read_unaligned::<i32>(chunk) as f32,
                Encoding::Unorm8 => f32::from(chunk[0]) / 255.0,
            })
        })
        .collect()
}

/// Reads the `position`-th index of an index array starting at `offset`.
pub(super) fn read_index(
    format: IndexFormat,
    bytes: &[u8],
    offset: u64,
    position: u32,
) -> Option<u32> {
    let at = offset + u64::from(position) * format.size() as u64;
    let chunk = slice_at(bytes, at, format.size())?;
    Some(match format {
        IndexFormat::Uint16 => u32::from(pod_read_unaligned::<u16>(chunk)),
        IndexFormat::Uint32 => pod_read_unaligned::<u32>(chunk),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_each_encoding() {
        let bytes = bytemuck::bytes_of(&[1.5f32, -2.0]).to_vec();
        assert_eq!(
            decode_attribute(ChannelFormat::float32(2), &bytes),
            Some(vec![1.5, -2.0])
        );
        let bytes = bytemuck::bytes_of(&[7i16, -3]).to_vec();
        assert_eq!(
            decode_attribute(ChannelFormat::new(2, Encoding::Int16), &bytes),
            Some(vec![7.0, -3.0])
        );
        assert_eq!(
            decode_attribute(ChannelFormat::new(2, Encoding::Unorm8), &[255, 0]),
            Some(vec![1.0, 0.0])
        );
    }

    #[test]
    fn test_short_input_decodes_to_none() {
        assert_eq!(decode_attribute(ChannelFormat::float32(3), &[0; 8]), None);
        assert_eq!(slice_at(&[0; 4], 2, 4), None);
    }

    #[test]
    fn test_reads_indices_at_offset() {
        let bytes = bytemuck::bytes_of(&[9u16, 4, 2]).to_vec();
        assert_eq!(read_index(IndexFormat::Uint16, &bytes, 2, 0), Some(4));
        assert_eq!(read_index(IndexFormat::Uint16, &bytes, 2, 1), Some(2));
        assert_eq!(read_index(IndexFormat::Uint16, &bytes, 2, 2), None);
    }
}
