use crate::{Body, Config, PendingRemoval};
use hecs::{Without, World};

/// Fold accumulated impulses into velocity, then apply linear damping
pub fn apply_forces(world: &mut World, config: &Config) {
    for (_entity, body) in world.query_mut::<Without<&mut Body, &PendingRemoval>>() {
        if body.force != glam::Vec2::ZERO {
            body.vel += body.force * body.inv_mass() * config.force_scale;
            body.force = glam::Vec2::ZERO;
        }
        body.vel *= 1.0 - body.damping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_piece, BodyKind};
    use glam::Vec2;

    #[test]
    fn test_damping_scales_velocity() {
        let mut world = World::new();
        let config = Config::new();
        let e = create_piece(&mut world, &config, BodyKind::Light, Vec2::new(300.0, 300.0));
        world.get::<&mut Body>(e).unwrap().vel = Vec2::new(10.0, 0.0);

        apply_forces(&mut world, &config);

        let body = world.get::<&Body>(e).unwrap();
        assert!((body.vel.x - 9.5).abs() < 1e-5, "5% damping per tick");
    }

    #[test]
    fn test_force_becomes_velocity_once() {
        let mut world = World::new();
        let config = Config {
            linear_damping: 0.0,
            ..Config::default()
        };
        let e = create_piece(&mut world, &config, BodyKind::Dark, Vec2::new(300.0, 300.0));
        let mass = world.get::<&Body>(e).unwrap().mass;
        world.get::<&mut Body>(e).unwrap().force = Vec2::new(0.001, 0.0);

        apply_forces(&mut world, &config);
        apply_forces(&mut world, &config);

        let body = world.get::<&Body>(e).unwrap();
        let expected = 0.001 / mass * config.force_scale;
        assert!((body.vel.x - expected).abs() < 1e-4);
        assert_eq!(body.force, Vec2::ZERO, "Force is consumed");
    }

    #[test]
    fn test_pending_bodies_are_frozen() {
        let mut world = World::new();
        let config = Config::new();
        let e = create_piece(&mut world, &config, BodyKind::Light, Vec2::new(300.0, 300.0));
        world.get::<&mut Body>(e).unwrap().vel = Vec2::new(10.0, 0.0);
        world.insert_one(e, PendingRemoval::new(3)).unwrap();

        apply_forces(&mut world, &config);

        assert_eq!(world.get::<&Body>(e).unwrap().vel.x, 10.0);
    }
}
