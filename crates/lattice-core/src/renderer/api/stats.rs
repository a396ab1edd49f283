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

//! Render statistics.

/// Per-frame counters collected while binding and replaying draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Number of draw calls issued to the device.
    pub draw_calls: u32,
    /// Total number of elements (vertices or indices) submitted.
    pub elements_drawn: u64,
    /// Bind calls that reached the device.
    pub binds_issued: u32,
    /// Bind calls skipped because the slot already held the handle.
    pub binds_elided: u32,
    /// Uniform writes issued for the texture-presence flag.
    pub uniform_updates: u32,
}

impl FrameStats {
    /// Returns the accumulated counters and resets them to zero.
    pub fn take(&mut self) -> FrameStats {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_resets_counters() {
        let mut stats = FrameStats {
            draw_calls: 3,
            elements_drawn: 36,
            ..Default::default()
        };
        let taken = stats.take();
        assert_eq!(taken.draw_calls, 3);
        assert_eq!(taken.elements_drawn, 36);
        assert_eq!(stats, FrameStats::default());
    }
}
