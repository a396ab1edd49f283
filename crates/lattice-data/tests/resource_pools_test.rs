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

use lattice_core::renderer::{DeviceError, PoolId};
use lattice_data::{PoolError, ResourceError, ResourcePools};
use lattice_infra::{DeviceCall, HeadlessDevice};

#[test]
fn test_shaders_and_textures_get_dense_identities() {
    let device = HeadlessDevice::new();
    let mut pools = ResourcePools::new();
    let flat = pools.load_shader(&device, "flat", b"vs", b"fs").unwrap();
    let lit = pools.load_shader(&device, "lit", b"vs", b"fs").unwrap();
    let brick = pools
        .load_texture(&device, "brick.png", 2, 2, &[0; 16])
        .unwrap();

    assert_eq!(flat, PoolId::FIRST);
    assert_eq!(lit, PoolId(2));
    assert_eq!(brick, PoolId::FIRST);
    assert_eq!(pools.shaders.unique_id("lit"), lit);
    assert_eq!(pools.shaders.unique_id("missing"), PoolId::NOT_FOUND);
    assert_ne!(pools.program(flat).unwrap(), pools.program(lit).unwrap());
    assert_eq!(device.live_programs(), 2);
    assert_eq!(device.live_textures(), 1);
}

#[test]
fn test_duplicate_names_leave_the_device_alone() {
    let device = HeadlessDevice::new();
    let mut pools = ResourcePools::new();
    pools.load_shader(&device, "flat", b"vs", b"fs").unwrap();
    device.clear_calls();

    let result = pools.load_shader(&device, "flat", b"vs", b"fs");
    assert!(matches!(
        result,
        Err(ResourceError::Pool(PoolError::DuplicateKey { pool: "shader", .. }))
    ));
    assert!(device.calls().is_empty());
    assert_eq!(pools.shaders.len(), 1);
}

#[test]
fn test_device_failure_registers_nothing() {
    let device = HeadlessDevice::new();
    let mut pools = ResourcePools::new();
    let result = pools.load_shader(&device, "broken", b"", b"fs");
    assert!(matches!(
        result,
        Err(ResourceError::Device(DeviceError::Backend(_)))
    ));
    assert!(pools.shaders.is_empty());
}

#[test]
fn test_unknown_identity_is_reported() {
    let pools = ResourcePools::new();
    assert!(matches!(
        pools.texture(PoolId(7)),
        Err(PoolError::IdNotFound { pool: "texture", id: PoolId(7) })
    ));
}

#[test]
fn test_destroy_all_releases_textures_then_shaders() {
    let device = HeadlessDevice::new();
    let mut pools = ResourcePools::new();
    let shader = pools.load_shader(&device, "flat", b"vs", b"fs").unwrap();
    let first = pools.load_texture(&device, "a.png", 1, 1, &[0; 4]).unwrap();
    let second = pools.load_texture(&device, "b.png", 1, 1, &[0; 4]).unwrap();
    let program = pools.program(shader).unwrap();
    let textures = [pools.texture(first).unwrap(), pools.texture(second).unwrap()];
    device.clear_calls();

    pools.destroy_all(&device);
    assert_eq!(
        device.calls(),
        [
            DeviceCall::DestroyTexture(textures[1]),
            DeviceCall::DestroyTexture(textures[0]),
            DeviceCall::DestroyProgram(program),
        ]
    );
    assert!(pools.shaders.is_empty());
    assert!(pools.textures.is_empty());
    assert_eq!(device.live_programs(), 0);
    assert_eq!(device.live_textures(), 0);
}
