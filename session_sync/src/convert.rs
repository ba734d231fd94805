use carrom_core::{PlayerNumber, ShotEvent};
use glam::Vec2;
use proto::{ShotRecord, Vec2f};

fn to_wire(v: Vec2) -> Vec2f {
    Vec2f::new(v.x, v.y)
}

fn from_wire(v: Vec2f) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Stored form of a shot
pub fn shot_record(shot: &ShotEvent) -> ShotRecord {
    ShotRecord {
        player: shot.player.as_u8(),
        force: to_wire(shot.force),
        position: to_wire(shot.position),
        timestamp: shot.timestamp_ms,
    }
}

/// Shot from its stored form; `None` for an unknown player number
pub fn shot_event(record: &ShotRecord) -> Option<ShotEvent> {
    Some(ShotEvent {
        player: PlayerNumber::from_u8(record.player)?,
        force: from_wire(record.force),
        position: from_wire(record.position),
        timestamp_ms: record.timestamp,
    })
}
