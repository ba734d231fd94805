//! Deterministic carrom simulation
//!
//! Fixed-tick rigid-disc physics, pocket capture, turn sequencing, shot
//! gestures and score accounting. Nothing in this crate touches the
//! network or a wall clock.

pub mod board;
pub mod components;
pub mod config;
pub mod error;
pub mod params;
pub mod physics;
pub mod rack;
pub mod resources;
pub mod score;
pub mod shot;
pub mod systems;
pub mod turn;

pub use board::*;
pub use components::*;
pub use config::*;
pub use error::*;
pub use params::*;
pub use physics::*;
pub use rack::*;
pub use resources::*;
pub use score::*;
pub use shot::*;
pub use turn::*;

use hecs::{Entity, World};
use systems::*;

/// Run one fixed tick of the simulation
///
/// Order: expire captured bodies, fold forces and damping into velocity,
/// then for each substep resolve contacts, integrate, bounce off walls and
/// check pockets. Returns the bodies captured during this tick.
pub fn tick(
    world: &mut World,
    board: &Board,
    config: &Config,
    events: &mut Events,
    shooter: PlayerNumber,
) -> Vec<Entity> {
    // 1. Despawn bodies whose removal delay ran out
    process_removals(world);

    // 2. Impulses and damping
    apply_forces(world, config);

    let substeps = config.substeps();
    let fraction = 1.0 / substeps as f32;
    let mut captured = Vec::new();
    for _ in 0..substeps {
        // 3. Body-body contacts
        resolve_collisions(world, events);

        // 4. Integrate positions
        integrate(world, fraction);

        // 5. Walls
        resolve_walls(world, board, events);

        // 6. Pockets
        captured.extend(detect_pockets(
            world,
            board,
            config.removal_delay_ticks,
            shooter,
            events,
        ));
    }
    captured
}

/// Helper to create a piece entity
pub fn create_piece(
    world: &mut World,
    config: &Config,
    kind: BodyKind,
    pos: glam::Vec2,
) -> Entity {
    world.spawn((Body::new(
        kind,
        pos,
        config.piece_radius,
        config.piece_density,
        config.restitution,
        config.linear_damping,
    ),))
}

/// Helper to create a striker entity
pub fn create_striker(world: &mut World, config: &Config, pos: glam::Vec2) -> Entity {
    world.spawn((Body::new(
        BodyKind::Striker,
        pos,
        config.striker_radius,
        config.striker_density,
        config.restitution,
        config.linear_damping,
    ),))
}
