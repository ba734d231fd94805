use glam::Vec2;

use crate::{BodyKind, Config};

/// Standard rack around the queen, in units of the rack gap
///
/// Inner ring of six, outer ring of twelve. Even indices are dark pieces,
/// odd indices light.
const RING_OFFSETS: [(f32, f32); 18] = [
    // Inner ring
    (0.0, -1.0),
    (0.866, -0.5),
    (0.866, 0.5),
    (0.0, 1.0),
    (-0.866, 0.5),
    (-0.866, -0.5),
    // Outer ring
    (0.0, -2.0),
    (0.866, -1.5),
    (1.732, -1.0),
    (1.732, 0.0),
    (1.732, 1.0),
    (0.866, 1.5),
    (0.0, 2.0),
    (-0.866, 1.5),
    (-1.732, 1.0),
    (-1.732, 0.0),
    (-1.732, -1.0),
    (-0.866, -1.5),
];

/// Piece kinds and positions for a fresh rack, queen first
pub fn rack_layout(config: &Config, center: Vec2) -> Vec<(BodyKind, Vec2)> {
    let gap = config.piece_radius * config.rack_gap_factor;
    let mut layout = Vec::with_capacity(RING_OFFSETS.len() + 1);
    layout.push((BodyKind::Queen, center));
    for (index, (dx, dy)) in RING_OFFSETS.iter().enumerate() {
        let kind = if index % 2 == 0 {
            BodyKind::Dark
        } else {
            BodyKind::Light
        };
        layout.push((kind, center + Vec2::new(*dx, *dy) * gap));
    }
    layout
}
