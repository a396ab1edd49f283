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

use std::sync::Arc;

use lattice_core::layout::Channel;
use lattice_core::renderer::{
    BufferLayoutMode, BufferTarget, IndexMode, PrimitiveTopology, ProgramId, RenderSettings,
    StorageStrategy,
};
use lattice_core::{MaterialRef, Mesh, Segment};
use lattice_infra::{DeviceCall, HeadlessDevice};
use lattice_lanes::{BuildError, RenderContext, RenderQueue, Renderable};

fn triangle(label: &str, material: Option<MaterialRef>) -> Mesh {
    let mut segment = Segment::new(PrimitiveTopology::Triangles, 3)
        .with_channel(Channel::Position, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
        .with_channel(Channel::TexCoord, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    if let Some(material) = material {
        segment = segment.with_material(material);
    }
    Mesh::new(label)
        .with_channel(Channel::Position, 3)
        .with_channel(Channel::TexCoord, 2)
        .with_segment(segment)
}

struct Scene {
    device: HeadlessDevice,
    ctx: RenderContext,
    program: ProgramId,
}

fn scene() -> Scene {
    lattice_infra::logging::init_for_tests();
    let device = HeadlessDevice::new();
    let mut ctx = RenderContext::new(Arc::new(device.clone()), RenderSettings::default()).unwrap();
    let shader = ctx
        .pools
        .load_shader(ctx.device.as_ref(), "textured", b"vs", b"fs")
        .unwrap();
    ctx.pools
        .load_texture(ctx.device.as_ref(), "brick.png", 1, 1, &[255; 4])
        .unwrap();
    let program = ctx.pools.program(shader).unwrap();
    Scene {
        device,
        ctx,
        program,
    }
}

fn brick() -> MaterialRef {
    MaterialRef::new()
        .with_shader("textured")
        .with_texture(0, "brick.png")
}

#[test]
fn test_shared_program_and_texture_bind_once() {
    let Scene {
        device,
        mut ctx,
        program,
    } = scene();
    let mut a = Renderable::with_defaults("a", &ctx.settings);
    let mut b = Renderable::with_defaults("b", &ctx.settings);
    a.create(&mut ctx, &triangle("a", Some(brick()))).unwrap();
    b.create(&mut ctx, &triangle("b", Some(brick()))).unwrap();
    ctx.end_frame();
    device.clear_calls();

    for _ in 0..2 {
        a.render(&mut ctx).unwrap();
        b.render(&mut ctx).unwrap();
    }

    let count = |pred: fn(&DeviceCall) -> bool| device.count_calls(pred);
    assert_eq!(count(|c| matches!(c, DeviceCall::UseProgram(_))), 1);
    assert_eq!(count(|c| matches!(c, DeviceCall::BindTexture { .. })), 1);
    assert_eq!(count(|c| matches!(c, DeviceCall::BindVertexArray(_))), 4);
    assert_eq!(
        count(|c| matches!(c, DeviceCall::SetUniformBool { .. })),
        1
    );
    assert_eq!(device.uniform(program, "u_textured"), Some(true));

    let stats = ctx.end_frame();
    assert_eq!(stats.draw_calls, 4);
    assert_eq!(stats.binds_issued, 6);
    assert_eq!(stats.binds_elided, 6);
    assert_eq!(stats.uniform_updates, 1);

    a.destroy(&mut ctx);
    b.destroy(&mut ctx);
}

#[test]
fn test_texture_flag_follows_unit_occupancy() {
    let Scene {
        device,
        mut ctx,
        program,
    } = scene();
    let mut textured = Renderable::with_defaults("textured", &ctx.settings);
    let mut plain = Renderable::with_defaults("plain", &ctx.settings);
    textured
        .create(&mut ctx, &triangle("textured", Some(brick())))
        .unwrap();
    plain
        .create(
            &mut ctx,
            &triangle("plain", Some(MaterialRef::new().with_shader("textured"))),
        )
        .unwrap();

    textured.render(&mut ctx).unwrap();
    assert_eq!(device.uniform(program, "u_textured"), Some(true));
    assert_eq!(device.draws()[0].textures.len(), 1);

    plain.render(&mut ctx).unwrap();
    assert_eq!(device.uniform(program, "u_textured"), Some(false));
    assert!(device.draws()[1].textures.is_empty());

    textured.render(&mut ctx).unwrap();
    assert_eq!(device.uniform(program, "u_textured"), Some(true));
    assert_eq!(ctx.end_frame().uniform_updates, 3);
}

#[test]
fn test_context_reset_forces_rebinds() {
    let Scene {
        device, mut ctx, ..
    } = scene();
    let mut renderable = Renderable::with_defaults("a", &ctx.settings);
    renderable
        .create(&mut ctx, &triangle("a", Some(brick())))
        .unwrap();
    renderable.render(&mut ctx).unwrap();
    device.clear_calls();

    renderable.render(&mut ctx).unwrap();
    assert_eq!(device.count_calls(DeviceCall::is_bind), 0);

    ctx.reset_bind_state();
    renderable.render(&mut ctx).unwrap();
    // Vertex array, program, texture.
    assert_eq!(device.count_calls(DeviceCall::is_bind), 3);
}

#[test]
fn test_non_vertex_array_strategy_rebinds_after_switch() {
    let Scene {
        device, mut ctx, ..
    } = scene();
    let strategy = StorageStrategy::Buffers {
        layout: BufferLayoutMode::Interleaved,
        vertex_array: false,
    };
    let mut loose = Renderable::new("loose", strategy, IndexMode::Indexed);
    let mut boxed = Renderable::with_defaults("boxed", &ctx.settings);
    loose.create(&mut ctx, &triangle("loose", None)).unwrap();
    boxed.create(&mut ctx, &triangle("boxed", None)).unwrap();
    let vertex_binds = |device: &HeadlessDevice| {
        device.count_calls(|c| {
            matches!(
                c,
                DeviceCall::BindBuffer {
                    target: BufferTarget::Vertex,
                    ..
                }
            )
        })
    };

    loose.render(&mut ctx).unwrap();
    device.clear_calls();
    loose.render(&mut ctx).unwrap();
    assert_eq!(vertex_binds(&device), 0);

    // Switching to another vertex array forgets every buffer binding.
    boxed.render(&mut ctx).unwrap();
    device.clear_calls();
    loose.render(&mut ctx).unwrap();
    assert_eq!(vertex_binds(&device), 1);

    let draws = device.draws();
    assert_eq!(draws[0].vertex_array, None);
    assert_eq!(draws[0].channel_values(Channel::TexCoord)[1], [1.0, 0.0]);
}

#[test]
fn test_unknown_material_names_fail_the_build() {
    let Scene { mut ctx, .. } = scene();
    let mut renderable = Renderable::with_defaults("a", &ctx.settings);
    let missing = MaterialRef::new().with_texture(0, "missing.png");
    assert!(matches!(
        renderable.create(&mut ctx, &triangle("a", Some(missing))),
        Err(BuildError::UnresolvedTexture { slot: 0, .. })
    ));
}

#[test]
fn test_removed_shader_fails_at_render() {
    let Scene { mut ctx, .. } = scene();
    let mut renderable = Renderable::with_defaults("a", &ctx.settings);
    renderable
        .create(&mut ctx, &triangle("a", Some(brick())))
        .unwrap();
    ctx.pools.shaders.remove("textured").unwrap();
    assert!(matches!(
        renderable.render(&mut ctx),
        Err(BuildError::Pool(_))
    ));
}

#[test]
fn test_unloading_a_texture_invalidates_its_binding() {
    let Scene {
        device,
        mut ctx,
        program,
    } = scene();
    let mut renderable = Renderable::with_defaults("a", &ctx.settings);
    renderable
        .create(&mut ctx, &triangle("a", Some(brick())))
        .unwrap();
    renderable.render(&mut ctx).unwrap();
    let texture = ctx.binds.texture(0).unwrap();
    assert!(ctx.binds.textured());

    ctx.unload_texture("brick.png").unwrap();
    assert_eq!(ctx.binds.texture(0), None);
    assert!(!ctx.binds.textured());
    assert_eq!(device.uniform(program, "u_textured"), Some(false));
    assert_eq!(device.live_textures(), 0);
    assert!(ctx.pools.textures.is_empty());

    // A recycled handle value must reach the device.
    device.clear_calls();
    ctx.binds.bind_texture(ctx.device.as_ref(), 0, Some(texture));
    assert_eq!(
        device.count_calls(|c| matches!(c, DeviceCall::BindTexture { .. })),
        1
    );

    assert!(matches!(
        renderable.render(&mut ctx),
        Err(BuildError::Pool(_))
    ));
    assert!(matches!(
        ctx.unload_texture("brick.png"),
        Err(BuildError::Pool(_))
    ));
}

#[test]
fn test_unloading_a_shader_invalidates_the_program() {
    let Scene {
        device,
        mut ctx,
        program,
    } = scene();
    let mut renderable = Renderable::with_defaults("a", &ctx.settings);
    renderable
        .create(&mut ctx, &triangle("a", Some(brick())))
        .unwrap();
    renderable.render(&mut ctx).unwrap();
    assert_eq!(ctx.binds.program(), Some(program));

    ctx.unload_shader("textured").unwrap();
    assert_eq!(ctx.binds.program(), None);
    assert_eq!(device.live_programs(), 0);

    ctx.pools
        .load_shader(ctx.device.as_ref(), "textured", b"vs", b"fs")
        .unwrap();
    renderable
        .create(&mut ctx, &triangle("a", Some(brick())))
        .unwrap();
    device.clear_calls();
    renderable.render(&mut ctx).unwrap();

    let reloaded = ctx
        .pools
        .program(ctx.pools.shaders.unique_id("textured"))
        .unwrap();
    assert_eq!(
        device.count_calls(|c| matches!(c, DeviceCall::UseProgram(_))),
        1
    );
    assert_eq!(ctx.binds.program(), Some(reloaded));
    assert_eq!(device.uniform(reloaded, "u_textured"), Some(true));
}

#[test]
fn test_queue_orders_renderables() {
    let Scene {
        device, mut ctx, ..
    } = scene();
    let mut renderables: Vec<Renderable> = (0..3)
        .map(|i| Renderable::with_defaults(format!("r{i}"), &ctx.settings))
        .collect();
    for r in &mut renderables {
        let mesh = triangle(r.label(), None);
        r.create(&mut ctx, &mesh).unwrap();
    }

    let mut queue = RenderQueue::new([0.0, 0.0, 0.0]);
    queue.push(0usize, [0.0, 0.0, -1.0], true);
    queue.push(1usize, [0.0, 0.0, 0.0], false);
    queue.push(2usize, [0.0, 0.0, -8.0], true);
    let order: Vec<usize> = queue.sorted().into_iter().copied().collect();
    assert_eq!(order, [1, 2, 0]);

    for &i in &order {
        renderables[i].render(&mut ctx).unwrap();
    }
    assert_eq!(device.draws().len(), 3);
    // Equal shapes share one pooled layout.
    assert_eq!(ctx.pools.layouts.len(), 1);
    assert!(renderables
        .iter()
        .all(|r| r.layout_id() == renderables[0].layout_id()));
}
