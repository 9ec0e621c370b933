//! Physics-driven chains against the point-mass world.

use coil_runtime::prelude::*;

const DT: f32 = 0.02;

fn physics_chain(world: &mut PointMassWorld, segments: usize, speed: f32) -> ChainBody {
    let config = ChainConfig::default()
        .with_segments(segments)
        .with_mode(DriveMode::Physics);
    let leader = LeaderConfig::default().with_speed(speed);
    let world: &mut dyn PhysicsWorld = world;
    ChainBody::new(config, &leader, Pose::at(Vec3::ZERO), Some(world)).unwrap()
}

/// One fixed step followed by one frame, the way a host interleaves them.
fn tick(body: &mut ChainBody, world: &mut PointMassWorld) {
    let world: &mut dyn PhysicsWorld = world;
    body.fixed_update(DT, Some(&mut *world)).unwrap();
    world.step(DT);
    body.frame_update(DT, Some(world)).unwrap();
}

#[test]
fn every_part_gets_a_body() {
    let mut world = PointMassWorld::new();
    let mut body = physics_chain(&mut world, 4, 0.0);

    assert_eq!(world.body_count(), 5);
    assert_eq!(body.live_bodies(), 5);
    assert!(body.leader().body().is_some());
    assert!(body.chain().segments().iter().all(|s| s.body().is_some()));

    body.despawn(&mut world);
}

#[test]
fn shoved_segment_settles_back_into_line() {
    let mut world = PointMassWorld::new();
    let mut body = physics_chain(&mut world, 3, 0.0);

    let shoved = body.chain().segments()[1].clone();
    let handle = shoved.body().unwrap();
    world
        .set_pose(handle, Pose::at(shoved.position() + Vec3::new(1.5, 0.0, 0.0)))
        .unwrap();

    for _ in 0..600 {
        tick(&mut body, &mut world);
    }

    for (i, gap) in body.chain().gaps().iter().enumerate() {
        assert!((gap - 1.0).abs() < 0.3, "gap {} is {}", i, gap);
    }
    for position in body.chain().positions() {
        assert!(position.is_finite());
    }

    body.despawn(&mut world);
}

#[test]
fn moving_physics_chain_trails_the_leader() {
    let mut world = PointMassWorld::new();
    let mut body = physics_chain(&mut world, 3, 2.0);

    for _ in 0..200 {
        tick(&mut body, &mut world);
    }

    let leader = body.leader().pose().position;
    assert!(leader.y > 1.0, "leader only reached {}", leader.y);
    for segment in body.chain().segments() {
        assert!(segment.position().is_finite());
        assert!(segment.position().y < leader.y);
    }

    body.despawn(&mut world);
}

#[test]
fn add_and_remove_manage_bodies() {
    let mut world = PointMassWorld::new();
    let mut body = physics_chain(&mut world, 2, 0.0);

    let world_ref: &mut dyn PhysicsWorld = &mut world;
    body.add_segment(Some(&mut *world_ref)).unwrap();
    assert_eq!(world_ref.body_count(), 4);

    let tail_body = body.chain().tail().and_then(|s| s.body()).unwrap();
    body.remove_segment(Some(world_ref)).unwrap();
    assert_eq!(world.body_count(), 3);
    assert!(!world.contains(tail_body));

    body.despawn(&mut world);
}

#[test]
fn despawn_releases_every_body() {
    let mut world = PointMassWorld::new();
    let mut body = physics_chain(&mut world, 5, 3.0);
    for _ in 0..10 {
        tick(&mut body, &mut world);
    }

    assert_eq!(body.despawn(&mut world), 6);
    assert_eq!(world.body_count(), 0);
    assert_eq!(body.live_bodies(), 0);
}

#[test]
fn kinematic_leader_with_physics_segments() {
    let mut world = PointMassWorld::new();
    let config = ChainConfig::default()
        .with_segments(3)
        .with_mode(DriveMode::Physics);
    let leader = LeaderConfig::default()
        .with_speed(1.0)
        .with_mode(DriveMode::Kinematic);
    let world_ref: &mut dyn PhysicsWorld = &mut world;
    let mut body = ChainBody::new(config, &leader, Pose::at(Vec3::ZERO), Some(world_ref)).unwrap();

    assert!(body.leader().body().is_none());
    assert_eq!(world.body_count(), 3);

    for _ in 0..50 {
        tick(&mut body, &mut world);
    }
    assert!((body.leader().pose().position.y - 1.0).abs() < 1e-3);

    body.despawn(&mut world);
}

/// A physics leader with no segments, steered by `turn`.
fn steered_leader(world: &mut PointMassWorld, leader: LeaderConfig, turn: f32) -> ChainBody {
    let config = ChainConfig::default()
        .with_segments(0)
        .with_mode(DriveMode::Physics);
    let world: &mut dyn PhysicsWorld = world;
    let mut body = ChainBody::new(config, &leader, Pose::at(Vec3::ZERO), Some(world)).unwrap();
    body.set_turn_input(turn);
    body
}

#[test]
fn physics_leader_ignores_steering_inside_the_dead_zone() {
    let mut world = PointMassWorld::new();
    let mut body = steered_leader(&mut world, LeaderConfig::default().with_speed(2.0), 0.005);
    let handle = body.leader().body().unwrap();

    for _ in 0..100 {
        tick(&mut body, &mut world);
        assert_eq!(world.angular_velocity(handle).unwrap(), 0.0);
    }
    assert!((body.leader().pose().forward() - Vec3::Y).length() < 1e-5);

    // Just past the dead zone the body starts to spin
    body.set_turn_input(0.02);
    tick(&mut body, &mut world);
    assert!(world.angular_velocity(handle).unwrap() < 0.0);

    body.despawn(&mut world);
}

#[test]
fn physics_leader_turns_right_on_positive_input() {
    let mut world = PointMassWorld::new();
    let config = LeaderConfig::default().with_speed(2.0).with_turn_rate(90.0);
    let mut body = steered_leader(&mut world, config, 1.0);

    for _ in 0..60 {
        tick(&mut body, &mut world);
    }

    let pose = body.leader().pose();
    assert!(pose.forward().x > 0.5, "forward is {:?}", pose.forward());
    assert!(pose.position.x > 0.0, "position is {:?}", pose.position);

    body.despawn(&mut world);
}

#[test]
fn physics_leader_respects_speed_and_spin_caps() {
    let mut world = PointMassWorld::new();
    let config = LeaderConfig::default().with_speed(3.0).with_turn_rate(90.0);
    let mut body = steered_leader(&mut world, config, 1.0);
    let handle = body.leader().body().unwrap();
    let max_spin = 90f32.to_radians();

    let mut fastest = 0.0f32;
    let mut fastest_spin = 0.0f32;
    for _ in 0..300 {
        tick(&mut body, &mut world);
        fastest = fastest.max(world.velocity(handle).unwrap().length());
        fastest_spin = fastest_spin.max(world.angular_velocity(handle).unwrap().abs());
    }

    // One step of acceleration may land past a cap before the next clamp
    assert!(fastest <= 3.0 + 1e-3, "speed reached {}", fastest);
    assert!(fastest_spin <= max_spin * (1.0 + DT) + 1e-4, "spin reached {}", fastest_spin);
    assert!(fastest_spin > 0.9 * max_spin);

    body.despawn(&mut world);
}

#[test]
fn bounded_physics_leader_is_pulled_back_inside() {
    let mut world = PointMassWorld::new();
    let bounds = Bounds::new(Vec2::new(-2.0, -2.0), Vec2::new(2.0, 2.0));
    let config = LeaderConfig::default().with_speed(5.0).with_bounds(bounds);
    let mut body = steered_leader(&mut world, config, 0.3);
    let handle = body.leader().body().unwrap();

    let mut reached_edge = false;
    for _ in 0..500 {
        let world_ref: &mut dyn PhysicsWorld = &mut world;
        body.fixed_update(DT, Some(&mut *world_ref)).unwrap();
        // Forces are applied from inside the rectangle
        assert!(bounds.contains(body.leader().pose().position));
        assert!(bounds.contains(world_ref.pose(handle).unwrap().position));
        world_ref.step(DT);
        body.frame_update(DT, Some(world_ref)).unwrap();

        // Never more than one step outside
        let position = body.leader().pose().position;
        assert!(bounds.clamp(position).distance(position) <= 5.0 * DT + 1e-3);
        reached_edge |= position.x.abs() >= 1.9 || position.y.abs() >= 1.9;
    }
    assert!(reached_edge);

    body.despawn(&mut world);
}
