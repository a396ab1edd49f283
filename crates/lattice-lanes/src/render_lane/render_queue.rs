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

#[derive(Debug, Clone, Copy, PartialEq)]
struct QueuedItem<K> {
    key: K,
    position: [f32; 3],
    transparent: bool,
}

/// Per-frame draw order for a set of renderables.
///
/// Opaque items keep submission order. Transparent items follow them, farthest
/// from the eye first.
#[derive(Debug, Clone)]
pub struct RenderQueue<K> {
    eye: [f32; 3],
    items: Vec<QueuedItem<K>>,
}

impl<K> Default for RenderQueue<K> {
    fn default() -> Self {
        Self::new([0.0; 3])
    }
}

impl<K> RenderQueue<K> {
    /// Creates an empty queue viewed from `eye`.
    pub fn new(eye: [f32; 3]) -> Self {
        Self {
            eye,
            items: Vec::new(),
        }
    }

    /// Moves the eye.
    pub fn set_eye(&mut self, eye: [f32; 3]) {
        self.eye = eye;
    }

    /// Queues `key` at world `position`.
    pub fn push(&mut self, key: K, position: [f32; 3], transparent: bool) {
        self.items.push(QueuedItem {
            key,
            position,
            transparent,
        });
    }

    /// Empties the queue for the next frame. The eye is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn distance_squared(&self, position: [f32; 3]) -> f32 {
        position
            .iter()
            .zip(self.eye)
            .map(|(p, e)| (p - e) * (p - e))
            .sum()
    }

    /// Keys in draw order.
    ///
    /// Distances compare with [`f32::total_cmp`], so equal distances keep
    /// submission order and NaN positions sort as farthest.
    pub fn sorted(&self) -> Vec<&K> {
        let mut transparent: Vec<(f32, &K)> = self
            .items
            .iter()
            .filter(|item| item.transparent)
            .map(|item| {
                let distance = self.distance_squared(item.position);
                // NaN carries either sign, so pin it to the far end.
                let distance = if distance.is_nan() { f32::INFINITY } else { distance };
                (distance, &item.key)
            })
            .collect();
        transparent.sort_by(|a, b| b.0.total_cmp(&a.0));

        self.items
            .iter()
            .filter(|item| !item.transparent)
            .map(|item| &item.key)
            .chain(transparent.into_iter().map(|(_, key)| key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_first_in_submission_order() {
        let mut queue = RenderQueue::default();
        queue.push("far-opaque", [0.0, 0.0, 50.0], false);
        queue.push("glass", [0.0, 0.0, 1.0], true);
        queue.push("near-opaque", [0.0, 0.0, 1.0], false);
        assert_eq!(queue.sorted(), [&"far-opaque", &"near-opaque", &"glass"]);
    }

    #[test]
    fn test_transparent_back_to_front() {
        let mut queue = RenderQueue::new([0.0, 0.0, 0.0]);
        queue.push(1, [0.0, 0.0, 2.0], true);
        queue.push(2, [0.0, 0.0, -9.0], true);
        queue.push(3, [0.5, 0.0, 0.0], true);
        assert_eq!(queue.sorted(), [&2, &1, &3]);

        queue.set_eye([0.0, 0.0, -9.0]);
        assert_eq!(queue.sorted(), [&1, &3, &2]);
    }

    #[test]
    fn test_distances_below_one_unit_still_order() {
        let mut queue = RenderQueue::default();
        queue.push('a', [0.1, 0.0, 0.0], true);
        queue.push('b', [0.3, 0.0, 0.0], true);
        assert_eq!(queue.sorted(), [&'b', &'a']);
    }

    #[test]
    fn test_nan_positions_draw_first_whatever_their_sign() {
        let mut queue = RenderQueue::default();
        queue.push('a', [1.0, 0.0, 0.0], true);
        queue.push('n', [-f32::NAN, 0.0, 0.0], true);
        queue.push('p', [0.0, f32::NAN, 0.0], true);
        assert_eq!(queue.sorted(), [&'n', &'p', &'a']);
    }

    #[test]
    fn test_ties_keep_submission_order() {
        let mut queue = RenderQueue::default();
        queue.push('x', [1.0, 0.0, 0.0], true);
        queue.push('y', [0.0, 1.0, 0.0], true);
        assert_eq!(queue.sorted(), [&'x', &'y']);
        queue.clear();
        assert!(queue.is_empty());
    }
}
