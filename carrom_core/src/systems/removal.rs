use crate::PendingRemoval;
use hecs::{Entity, World};

/// Count down captured bodies and despawn the expired ones
pub fn process_removals(world: &mut World) -> Vec<Entity> {
    let mut expired: Vec<Entity> = Vec::new();

    for (entity, pending) in world.query_mut::<&mut PendingRemoval>() {
        if pending.tick() {
            expired.push(entity);
        }
    }
    expired.sort_by_key(|entity| entity.id());

    for entity in &expired {
        let _ = world.despawn(*entity);
    }
    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_piece, Body, BodyKind, Config};
    use glam::Vec2;

    #[test]
    fn test_removal_after_delay() {
        let mut world = World::new();
        let config = Config::new();
        let e = create_piece(&mut world, &config, BodyKind::Light, Vec2::new(60.0, 60.0));
        world.insert_one(e, PendingRemoval::new(2)).unwrap();

        assert!(process_removals(&mut world).is_empty());
        assert!(world.contains(e), "Lingers for the delay");
        assert_eq!(process_removals(&mut world), vec![e]);
        assert!(!world.contains(e));
        assert!(world.get::<&Body>(e).is_err());
    }
}
