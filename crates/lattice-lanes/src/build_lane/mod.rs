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

//! Build lane - encodes mesh data for upload.
//!
//! Every strategy fills segments in mesh order and vertices in the same
//! per-segment order, so data built for one strategy lines up with indices
//! built for another.

mod encode;
mod fill;

pub use fill::*;
