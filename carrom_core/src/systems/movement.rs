use crate::{Body, PendingRemoval};
use hecs::{Without, World};

/// Advance positions by a fraction of one tick's velocity
pub fn integrate(world: &mut World, fraction: f32) {
    for (_entity, body) in world.query_mut::<Without<&mut Body, &PendingRemoval>>() {
        body.pos += body.vel * fraction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_piece, BodyKind, Config};
    use glam::Vec2;

    #[test]
    fn test_integrate_moves_by_velocity() {
        let mut world = World::new();
        let config = Config::new();
        let e = create_piece(&mut world, &config, BodyKind::Light, Vec2::new(100.0, 100.0));
        world.get::<&mut Body>(e).unwrap().vel = Vec2::new(4.0, -2.0);

        integrate(&mut world, 0.5);

        assert_eq!(world.get::<&Body>(e).unwrap().pos, Vec2::new(102.0, 99.0));
    }
}
