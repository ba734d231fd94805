use crate::{Body, Board, CaptureEvent, Events, PendingRemoval, PhysicsEvent, PlayerNumber};
use glam::Vec2;
use hecs::{Entity, Without, World};

/// Mark every live body whose center entered a pocket as captured
///
/// Captured bodies are frozen and tagged with [`PendingRemoval`]; the
/// marker keeps them from being captured a second time. Returns the
/// captured entities in entity order.
pub fn detect_pockets(
    world: &mut World,
    board: &Board,
    removal_delay_ticks: u32,
    shooter: PlayerNumber,
    events: &mut Events,
) -> Vec<Entity> {
    let mut captured: Vec<_> = world
        .query::<Without<&Body, &PendingRemoval>>()
        .iter()
        .filter_map(|(entity, body)| {
            board
                .pocket_at(body.pos)
                .map(|pocket| (entity, body.kind, pocket))
        })
        .collect();
    captured.sort_by_key(|(entity, _, _)| entity.id());

    let mut marked = Vec::with_capacity(captured.len());
    for (entity, kind, pocket) in captured {
        if world
            .insert_one(entity, PendingRemoval::new(removal_delay_ticks))
            .is_err()
        {
            continue;
        }
        if let Ok(mut body) = world.get::<&mut Body>(entity) {
            body.vel = Vec2::ZERO;
            body.force = Vec2::ZERO;
        }
        log::debug!("Captured {} in pocket {pocket}", kind.label());
        events.push(PhysicsEvent::Capture(CaptureEvent {
            body: entity,
            kind,
            player: shooter,
            pocket,
        }));
        marked.push(entity);
    }
    marked
}
