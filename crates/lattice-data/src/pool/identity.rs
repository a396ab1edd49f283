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

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use lattice_core::renderer::PoolId;

use crate::error::PoolError;

#[derive(Debug, Clone)]
struct Entry<K, R> {
    key: K,
    resource: R,
}

/// A dedup cache mapping a key to a stable identity and a resource.
///
/// Identities are assigned sequentially from [`PoolId::FIRST`] and are never
/// handed out twice during the pool's lifetime, not even after a removal or a
/// [`destroy_all`](Self::destroy_all). Both directions (key to identity and
/// identity to entry) are always updated together.
#[derive(Debug, Clone)]
pub struct IdentityPool<K, R> {
    name: &'static str,
    ids: HashMap<K, PoolId>,
    entries: BTreeMap<PoolId, Entry<K, R>>,
    next_id: i32,
}

impl<K, R> IdentityPool<K, R>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Creates an empty pool. `name` appears in errors and logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ids: HashMap::new(),
            entries: BTreeMap::new(),
            next_id: PoolId::FIRST.0,
        }
    }

    /// The pool name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers `resource` under `key` and returns its new identity.
    ///
    /// # Errors
    /// * `PoolError::DuplicateKey` - If `key` is already registered. The existing
    ///   entry is left untouched.
    pub fn add(&mut self, key: K, resource: R) -> Result<PoolId, PoolError> {
        if self.ids.contains_key(&key) {
            return Err(PoolError::DuplicateKey {
                pool: self.name,
                key: format!("{key:?}"),
            });
        }
        let id = self.allocate_id()?;
        log::trace!("{} pool: registered {:?} as {}", self.name, key, id);
        self.ids.insert(key.clone(), id);
        self.entries.insert(id, Entry { key, resource });
        Ok(id)
    }

    /// Returns the identity of `key`, registering the resource built by `make`
    /// first if the key is new. `make` is not called for a known key.
    pub fn get_or_add_with<E>(
        &mut self,
        key: K,
        make: impl FnOnce(&K) -> Result<R, E>,
    ) -> Result<PoolId, E>
    where
        E: From<PoolError>,
    {
        if let Some(&id) = self.ids.get(&key) {
            return Ok(id);
        }
        let resource = make(&key)?;
        Ok(self.add(key, resource)?)
    }

    /// Returns the resource registered under `key`.
    pub fn get<Q>(&self, key: &Q) -> Result<&R, PoolError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let id = self.lookup(key)?;
        self.get_by_id(id)
    }

    /// Returns the resource registered under `id`.
    pub fn get_by_id(&self, id: PoolId) -> Result<&R, PoolError> {
        self.entries
            .get(&id)
            .map(|entry| &entry.resource)
            .ok_or(PoolError::IdNotFound {
                pool: self.name,
                id,
            })
    }

    /// Returns the key registered under `id`.
    pub fn key_of(&self, id: PoolId) -> Result<&K, PoolError> {
        self.entries
            .get(&id)
            .map(|entry| &entry.key)
            .ok_or(PoolError::IdNotFound {
                pool: self.name,
                id,
            })
    }

    /// Returns the identity of `key`, or [`PoolId::NOT_FOUND`].
    pub fn unique_id<Q>(&self, key: &Q) -> PoolId
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ids.get(key).copied().unwrap_or(PoolId::NOT_FOUND)
    }

    /// Returns the identity and resource of `key`, if registered.
    pub fn find<Q>(&self, key: &Q) -> Option<(PoolId, &R)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.ids.get(key)?;
        self.entries.get(&id).map(|entry| (id, &entry.resource))
    }

    /// Returns `true` if `key` is registered.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ids.contains_key(key)
    }

    /// Unregisters `key` and returns its identity and resource.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<(PoolId, R), PoolError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let id = self.lookup(key)?;
        let entry = self.entries.remove(&id).ok_or(PoolError::IdNotFound {
            pool: self.name,
            id,
        })?;
        self.ids.remove(key);
        log::trace!("{} pool: removed {:?} ({})", self.name, entry.key, id);
        Ok((id, entry.resource))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pool has no live entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates live entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &K, &R)> + '_ {
        self.entries
            .iter()
            .map(|(&id, entry)| (id, &entry.key, &entry.resource))
    }

    /// Hands every entry to `teardown`, newest first, and empties the pool.
    ///
    /// Identity assignment continues where it left off.
    pub fn destroy_all(&mut self, mut teardown: impl FnMut(PoolId, K, R)) {
        let entries = std::mem::take(&mut self.entries);
        self.ids.clear();
        if !entries.is_empty() {
            log::debug!("{} pool: destroying {} entries", self.name, entries.len());
        }
        for (id, entry) in entries.into_iter().rev() {
            teardown(id, entry.key, entry.resource);
        }
    }

    fn lookup<Q>(&self, key: &Q) -> Result<PoolId, PoolError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.ids
            .get(key)
            .copied()
            .ok_or_else(|| PoolError::KeyNotFound {
                pool: self.name,
                key: format!("{key:?}"),
            })
    }

    fn allocate_id(&mut self) -> Result<PoolId, PoolError> {
        let id = PoolId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(PoolError::Exhausted { pool: self.name })?;
        Ok(id)
    }
}
