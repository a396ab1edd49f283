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

//! Data types exchanged between the pipeline and a [`RenderDevice`](super::RenderDevice).

pub mod command;
pub mod enums;
pub mod identity;
pub mod resource;
pub mod settings;
pub mod stats;
pub mod strategy;

pub use self::command::*;
pub use self::enums::*;
pub use self::identity::PoolId;
pub use self::resource::*;
pub use self::settings::{ChannelEncodings, RenderSettings};
pub use self::stats::FrameStats;
pub use self::strategy::{BufferLayoutMode, IndexMode, StorageStrategy};
