use crate::{Body, CollisionEvent, Events, PendingRemoval, PhysicsEvent};
use glam::Vec2;
use hecs::{Entity, Without, World};

/// Resolve every overlapping pair of live bodies
///
/// Pairs are checked brute-force in entity order so both clients resolve
/// contacts in the same sequence.
pub fn resolve_collisions(world: &mut World, events: &mut Events) {
    let mut bodies: Vec<(Entity, Body)> = world
        .query::<Without<&Body, &PendingRemoval>>()
        .iter()
        .map(|(entity, body)| (entity, *body))
        .collect();
    bodies.sort_by_key(|(entity, _)| entity.id());

    let mut touched = false;
    for j in 1..bodies.len() {
        let (head, tail) = bodies.split_at_mut(j);
        let (entity_b, body_b) = &mut tail[0];
        for (entity_a, body_a) in head.iter_mut() {
            if let Some(impact_speed) = resolve_pair(body_a, body_b) {
                touched = true;
                events.push(PhysicsEvent::Collision(CollisionEvent {
                    a: *entity_a,
                    b: *entity_b,
                    impact_speed,
                }));
            }
        }
    }

    if !touched {
        return;
    }

    for (entity, body) in bodies {
        if let Ok(mut slot) = world.get::<&mut Body>(entity) {
            *slot = body;
        }
    }
}

/// Separate and bounce two overlapping discs
///
/// Returns the approach speed along the line of centers when the discs
/// overlapped; zero for a pair that was already separating.
/// Overlap is removed along the line of centers in inverse-mass proportion
/// before the restitution impulse, which is only applied while the discs
/// are still approaching.
pub fn resolve_pair(a: &mut Body, b: &mut Body) -> Option<f32> {
    let delta = b.pos - a.pos;
    let min_dist = a.radius + b.radius;
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let inv_a = a.inv_mass();
    let inv_b = b.inv_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return None;
    }

    let dist = dist_sq.sqrt();
    // Coincident centers: pick a fixed axis to stay deterministic
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };

    let penetration = min_dist - dist;
    a.pos -= normal * (penetration * inv_a / inv_sum);
    b.pos += normal * (penetration * inv_b / inv_sum);

    let closing = (b.vel - a.vel).dot(normal);
    if closing >= 0.0 {
        return Some(0.0);
    }
    let restitution = a.restitution.max(b.restitution);
    let impulse = -(1.0 + restitution) * closing / inv_sum;
    a.vel -= normal * (impulse * inv_a);
    b.vel += normal * (impulse * inv_b);

    Some(-closing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_piece, create_striker, BodyKind, Config};

    fn setup_world() -> (World, Config, Events) {
        (World::new(), Config::new(), Events::new())
    }

    fn piece(pos: Vec2, vel: Vec2) -> Body {
        Body::new(BodyKind::Light, pos, 12.0, 0.001, 0.8, 0.05).with_velocity(vel)
    }

    #[test]
    fn test_head_on_equal_mass_loses_energy() {
        let v = 6.0;
        let mut a = piece(Vec2::new(100.0, 100.0), Vec2::new(v, 0.0));
        let mut b = piece(Vec2::new(123.0, 100.0), Vec2::ZERO);

        let speed = resolve_pair(&mut a, &mut b);

        assert_eq!(speed, Some(v));
        // Momentum conserved
        assert!((a.vel.x + b.vel.x - v).abs() < 1e-4);
        // Separation speed is restitution times closing speed
        assert!((b.vel.x - a.vel.x - 0.8 * v).abs() < 1e-4);
        assert!((b.vel.x - 5.4).abs() < 1e-4, "Target takes most of the speed");
        assert!((a.vel.x - 0.6).abs() < 1e-4, "Not a perfect swap");
        assert_eq!(a.vel.y, 0.0);
    }

    #[test]
    fn test_positional_correction_removes_overlap() {
        let mut a = piece(Vec2::new(100.0, 100.0), Vec2::ZERO);
        let mut b = piece(Vec2::new(110.0, 100.0), Vec2::ZERO);

        resolve_pair(&mut a, &mut b);

        let gap = (b.pos - a.pos).length();
        assert!((gap - 24.0).abs() < 1e-4, "Discs should just touch");
        assert_eq!(a.vel, Vec2::ZERO, "Resting overlap injects no energy");
        assert_eq!(b.vel, Vec2::ZERO);
    }

    #[test]
    fn test_separating_pair_keeps_velocity() {
        let mut a = piece(Vec2::new(100.0, 100.0), Vec2::new(-1.0, 0.0));
        let mut b = piece(Vec2::new(120.0, 100.0), Vec2::new(1.0, 0.0));

        let speed = resolve_pair(&mut a, &mut b);

        assert_eq!(speed, Some(0.0), "Separating overlap is not an impact");
        assert_eq!(a.vel, Vec2::new(-1.0, 0.0));
        assert_eq!(b.vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_glancing_contact_reports_normal_speed() {
        // Moving along x, touching a disc that sits mostly below
        let mut a = piece(Vec2::new(100.0, 100.0), Vec2::new(6.0, 0.0));
        let mut b = piece(Vec2::new(112.0, 120.0), Vec2::ZERO);

        let speed = resolve_pair(&mut a, &mut b).unwrap();

        let normal = (Vec2::new(112.0, 120.0) - Vec2::new(100.0, 100.0)).normalize();
        assert!((speed - 6.0 * normal.x).abs() < 1e-4);
        assert!(speed < 6.0);
    }

    #[test]
    fn test_no_contact_when_apart() {
        let mut a = piece(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0));
        let mut b = piece(Vec2::new(125.0, 100.0), Vec2::ZERO);
        assert_eq!(resolve_pair(&mut a, &mut b), None);
    }

    #[test]
    fn test_heavier_striker_pushes_piece() {
        let (mut world, config, mut events) = setup_world();
        let striker = create_striker(&mut world, &config, Vec2::new(300.0, 300.0));
        let target = create_piece(&mut world, &config, BodyKind::Queen, Vec2::new(300.0, 271.0));
        world.get::<&mut Body>(striker).unwrap().vel = Vec2::new(0.0, -10.0);

        resolve_collisions(&mut world, &mut events);

        let striker_body = *world.get::<&Body>(striker).unwrap();
        let target_body = *world.get::<&Body>(target).unwrap();
        assert!(target_body.vel.y < -10.0, "Light piece flies faster than the striker");
        assert!(striker_body.vel.y < 0.0, "Heavier striker keeps moving forward");
        assert_eq!(events.iter().count(), 1, "One collision event per contact");
        match events.iter().next() {
            Some(PhysicsEvent::Collision(hit)) => {
                assert_eq!(hit.a, striker);
                assert_eq!(hit.b, target);
                assert!((hit.impact_speed - 10.0).abs() < 1e-4);
            }
            other => panic!("Expected collision event, got {other:?}"),
        };
    }

    #[test]
    fn test_pending_bodies_do_not_collide() {
        let (mut world, config, mut events) = setup_world();
        let a = create_piece(&mut world, &config, BodyKind::Light, Vec2::new(300.0, 300.0));
        create_piece(&mut world, &config, BodyKind::Dark, Vec2::new(305.0, 300.0));
        world.insert_one(a, PendingRemoval::new(3)).unwrap();

        resolve_collisions(&mut world, &mut events);

        assert!(events.is_empty());
    }
}
