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

//! A software render device that keeps everything in memory.
//!
//! [`HeadlessDevice`] behaves like a stateful graphics context: buffers hold
//! real bytes, vertex arrays capture attribute state and the index binding,
//! and every draw fetches the vertices it would have rasterized. Each call is
//! appended to a log so callers can count exactly what reached the device.

mod decode;
mod device;
mod record;

pub use self::device::HeadlessDevice;
pub use self::record::{DeviceCall, FetchedVertex, HeadlessDraw, RecordedSource};
