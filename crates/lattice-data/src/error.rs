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

//! Errors raised by identity pools.

use lattice_core::renderer::{DeviceError, PoolId};
use thiserror::Error;

/// Misuse of an identity pool. Always a caller bug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// `add` was called with a key that is already registered.
    #[error("{pool} pool: key {key} is already registered")]
    DuplicateKey {
        /// Name of the pool.
        pool: &'static str,
        /// Debug rendering of the key.
        key: String,
    },
    /// A lookup or removal named a key that is not registered.
    #[error("{pool} pool: key {key} is not registered")]
    KeyNotFound {
        /// Name of the pool.
        pool: &'static str,
        /// Debug rendering of the key.
        key: String,
    },
    /// A lookup named an identity that is not live.
    #[error("{pool} pool: identity {id} is not live")]
    IdNotFound {
        /// Name of the pool.
        pool: &'static str,
        /// The identity.
        id: PoolId,
    },
    /// The pool ran out of positive identities.
    #[error("{pool} pool: identities exhausted")]
    Exhausted {
        /// Name of the pool.
        pool: &'static str,
    },
}

/// Failure while loading a device resource into a pool.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The pool rejected the key.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The device failed to create the resource.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}
