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

use lattice_core::layout::{InterleavedLayout, LayoutDescriptor};
use lattice_core::renderer::PoolId;

use super::identity::IdentityPool;
use crate::error::PoolError;

/// Key of a layout pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayoutKey {
    /// Registered explicitly under a caller-chosen name.
    Named(String),
    /// Resolved by value: the descriptor is its own key.
    Shape(LayoutDescriptor),
}

/// Metadata shared by every mesh with the same channel shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    /// The descriptor.
    pub descriptor: LayoutDescriptor,
    /// Its interleaved layout, computed once at registration.
    pub interleaved: InterleavedLayout,
}

impl LayoutEntry {
    fn new(descriptor: LayoutDescriptor) -> Self {
        Self {
            interleaved: InterleavedLayout::compute(&descriptor),
            descriptor,
        }
    }
}

/// Pool of layout descriptors.
///
/// [`resolve`](Self::resolve) collapses equal descriptors to one identity.
/// [`register`](Self::register) always creates a new entry under its name,
/// even when an equal descriptor is already pooled.
#[derive(Debug, Clone)]
pub struct LayoutPool {
    pool: IdentityPool<LayoutKey, LayoutEntry>,
}

impl Default for LayoutPool {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            pool: IdentityPool::new("layout"),
        }
    }

    /// Returns the identity shared by every descriptor equal to `descriptor`.
    pub fn resolve(&mut self, descriptor: &LayoutDescriptor) -> Result<PoolId, PoolError> {
        self.pool
            .get_or_add_with(LayoutKey::Shape(*descriptor), |_| {
                log::debug!(
                    "New vertex layout with {} channels, stride {}",
                    descriptor.channel_count(),
                    descriptor.vertex_width()
                );
                Ok::<_, PoolError>(LayoutEntry::new(*descriptor))
            })
    }

    /// Registers `descriptor` under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        descriptor: LayoutDescriptor,
    ) -> Result<PoolId, PoolError> {
        self.pool
            .add(LayoutKey::Named(name.into()), LayoutEntry::new(descriptor))
    }

    /// Returns the identity `descriptor` resolves to, or [`PoolId::NOT_FOUND`].
    pub fn unique_id(&self, descriptor: &LayoutDescriptor) -> PoolId {
        self.pool.unique_id(&LayoutKey::Shape(*descriptor))
    }

    /// Returns the entry of `id`.
    pub fn get_by_id(&self, id: PoolId) -> Result<&LayoutEntry, PoolError> {
        self.pool.get_by_id(id)
    }

    /// Returns the entry registered under `name`.
    pub fn get_named(&self, name: &str) -> Result<&LayoutEntry, PoolError> {
        self.pool.get(&LayoutKey::Named(name.to_owned()))
    }

    /// Number of pooled layouts.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Returns `true` if no layout is pooled.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Drops every layout. Layouts own no device resources.
    pub fn destroy_all(&mut self) {
        self.pool.destroy_all(|_, _, _| {});
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::layout::{Channel, ChannelFormat};

    fn shape() -> LayoutDescriptor {
        LayoutDescriptor::empty()
            .with(Channel::Position, ChannelFormat::float32(3))
            .with(Channel::Normal, ChannelFormat::float32(3))
    }

    #[test]
    fn test_equal_descriptors_resolve_to_one_identity() {
        let mut pool = LayoutPool::new();
        let a = pool.resolve(&shape()).unwrap();
        let b = pool.resolve(&shape()).unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.unique_id(&shape()), a);
        assert_eq!(pool.get_by_id(a).unwrap().interleaved.stride(), 24);
    }

    #[test]
    fn test_named_registration_keeps_distinct_entries() {
        let mut pool = LayoutPool::new();
        let a = pool.register("lit", shape()).unwrap();
        let b = pool.register("lit-copy", shape()).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
        let resolved = pool.resolve(&shape()).unwrap();
        assert_eq!(pool.resolve(&shape()).unwrap(), resolved);
        assert_eq!(pool.len(), 3);
        assert!(matches!(
            pool.register("lit", shape()),
            Err(PoolError::DuplicateKey { .. })
        ));
        assert_eq!(pool.get_named("lit").unwrap().descriptor, shape());
    }

    #[test]
    fn test_distinct_descriptors_get_distinct_identities() {
        let mut pool = LayoutPool::new();
        let a = pool.resolve(&shape()).unwrap();
        let b = pool
            .resolve(&shape().with(Channel::Color, ChannelFormat::float32(4)))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(
            pool.unique_id(&LayoutDescriptor::empty()),
            PoolId::NOT_FOUND
        );
    }
}
