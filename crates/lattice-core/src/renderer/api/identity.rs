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

//! Stable integer identities handed out by identity pools.

use std::fmt;

/// A stable identity assigned by an identity pool.
///
/// Live identities are strictly positive and assigned sequentially from `1`.
/// Zero and negative values are reserved sentinels, see [`PoolId::NONE`] and
/// [`PoolId::NOT_FOUND`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub i32);

impl PoolId {
    /// "No resource": used by draw records whose segment has no shader.
    pub const NONE: PoolId = PoolId(0);

    /// Returned by optional lookups when a key is not registered.
    pub const NOT_FOUND: PoolId = PoolId(-1);

    /// The first identity a pool assigns.
    pub const FIRST: PoolId = PoolId(1);

    /// Returns `true` if this identity can refer to a live pool entry.
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PoolId::NONE => write!(f, "none"),
            PoolId::NOT_FOUND => write!(f, "not-found"),
            PoolId(raw) => write!(f, "#{raw}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_not_valid() {
        assert!(!PoolId::NONE.is_valid());
        assert!(!PoolId::NOT_FOUND.is_valid());
        assert!(PoolId::FIRST.is_valid());
    }

    #[test]
    fn test_display_names_sentinels() {
        assert_eq!(PoolId::NONE.to_string(), "none");
        assert_eq!(PoolId::NOT_FOUND.to_string(), "not-found");
        assert_eq!(PoolId(12).to_string(), "#12");
    }
}
