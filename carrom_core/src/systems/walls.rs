use crate::{Body, Board, Events, PendingRemoval, PhysicsEvent};
use hecs::{Without, World};

/// Bounce bodies whose edge crossed a wall back into the interior
///
/// The offending velocity component is reflected and scaled by the body's
/// restitution; the position is clamped so the edge touches the wall.
pub fn resolve_walls(world: &mut World, board: &Board, events: &mut Events) {
    let min = board.interior_min();
    let max = board.interior_max();

    for (entity, body) in world.query_mut::<Without<&mut Body, &PendingRemoval>>() {
        let mut hit = false;

        if body.pos.x - body.radius < min {
            body.pos.x = min + body.radius;
            if body.vel.x < 0.0 {
                body.vel.x = -body.vel.x * body.restitution;
            }
            hit = true;
        } else if body.pos.x + body.radius > max {
            body.pos.x = max - body.radius;
            if body.vel.x > 0.0 {
                body.vel.x = -body.vel.x * body.restitution;
            }
            hit = true;
        }

        if body.pos.y - body.radius < min {
            body.pos.y = min + body.radius;
            if body.vel.y < 0.0 {
                body.vel.y = -body.vel.y * body.restitution;
            }
            hit = true;
        } else if body.pos.y + body.radius > max {
            body.pos.y = max - body.radius;
            if body.vel.y > 0.0 {
                body.vel.y = -body.vel.y * body.restitution;
            }
            hit = true;
        }

        if hit {
            events.push(PhysicsEvent::WallHit {
                body: entity,
                speed: body.speed(),
            });
        }
    }
}
