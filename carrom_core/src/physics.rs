use glam::Vec2;
use hecs::{Entity, Without, World};

use crate::{
    create_piece, create_striker, rack_layout, tick, Body, BodyKind, Board, Config, Events,
    FixedClock, PendingRemoval, PhysicsError, PhysicsEvent, PlayerNumber,
};

/// Identity of a body in the physics world
pub type BodyId = Entity;

/// Owns every body on the board and advances them in fixed ticks
pub struct PhysicsWorld {
    world: World,
    board: Board,
    config: Config,
    clock: FixedClock,
    events: Events,
    striker: Option<Entity>,
}

impl PhysicsWorld {
    pub fn new(config: Config) -> Self {
        Self {
            world: World::new(),
            board: Board::from_config(&config),
            clock: FixedClock::new(config.fixed_dt, config.max_dt),
            config,
            events: Events::new(),
            striker: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of fixed ticks simulated so far
    pub fn tick_count(&self) -> u64 {
        self.clock.tick
    }

    /// Add a body; a new striker replaces the current one
    pub fn add_body(&mut self, body: Body) -> BodyId {
        if body.kind == BodyKind::Striker {
            self.clear_striker();
        }
        let entity = self.world.spawn((body,));
        if body.kind == BodyKind::Striker {
            self.striker = Some(entity);
        }
        entity
    }

    /// Remove a body immediately, returning its last state
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body, PhysicsError> {
        let body = *self
            .world
            .get::<&Body>(id)
            .map_err(|_| PhysicsError::UnknownBody(id))?;
        let _ = self.world.despawn(id);
        if self.striker == Some(id) {
            self.striker = None;
        }
        Ok(body)
    }

    /// Queue an impulse; it becomes velocity on the next tick
    pub fn apply_impulse(&mut self, id: BodyId, force: Vec2) -> Result<(), PhysicsError> {
        if self.world.get::<&PendingRemoval>(id).is_ok() {
            return Err(PhysicsError::Captured(id));
        }
        let mut body = self
            .world
            .get::<&mut Body>(id)
            .map_err(|_| PhysicsError::UnknownBody(id))?;
        body.force += force;
        Ok(())
    }

    /// Spawn a fresh striker, clamped into the interior
    pub fn spawn_striker(&mut self, pos: Vec2) -> BodyId {
        self.clear_striker();
        let pos = self.board.clamp(pos, self.config.striker_radius);
        let entity = create_striker(&mut self.world, &self.config, pos);
        self.striker = Some(entity);
        entity
    }

    /// Move the resting striker, e.g. to where a remote shot was taken
    pub fn place_striker(&mut self, pos: Vec2) -> Result<(), PhysicsError> {
        let id = self.striker.ok_or(PhysicsError::NoStriker)?;
        let pos = self.board.clamp(pos, self.config.striker_radius);
        let mut body = self
            .world
            .get::<&mut Body>(id)
            .map_err(|_| PhysicsError::UnknownBody(id))?;
        body.pos = pos;
        body.vel = Vec2::ZERO;
        body.force = Vec2::ZERO;
        Ok(())
    }

    fn clear_striker(&mut self) {
        if let Some(previous) = self.striker.take() {
            let _ = self.world.despawn(previous);
        }
    }

    pub fn striker(&self) -> Option<BodyId> {
        self.striker
    }

    pub fn striker_position(&self) -> Option<Vec2> {
        let id = self.striker?;
        self.world.get::<&Body>(id).ok().map(|body| body.pos)
    }

    /// Replace all pieces with the standard rack around the board center
    pub fn rack(&mut self) {
        let pieces: Vec<Entity> = self
            .world
            .query::<&Body>()
            .iter()
            .filter(|(_, body)| body.kind.is_piece())
            .map(|(entity, _)| entity)
            .collect();
        for entity in pieces {
            let _ = self.world.despawn(entity);
        }
        for (kind, pos) in rack_layout(&self.config, self.board.center()) {
            create_piece(&mut self.world, &self.config, kind, pos);
        }
    }

    /// Accumulate frame time and run every whole tick that is due
    ///
    /// Returns the number of ticks simulated.
    pub fn step(&mut self, dt: f32, shooter: PlayerNumber) -> u32 {
        let due = self.accumulate(dt);
        for _ in 0..due {
            self.tick(shooter);
        }
        due
    }

    /// Add frame time without simulating; returns how many ticks are due
    ///
    /// For callers that need to inspect the world between ticks.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.clock.advance(dt)
    }

    /// Run exactly one fixed tick
    pub fn tick(&mut self, shooter: PlayerNumber) {
        let captured = tick(
            &mut self.world,
            &self.board,
            &self.config,
            &mut self.events,
            shooter,
        );
        if let Some(striker) = self.striker {
            if captured.contains(&striker) {
                log::debug!("Striker pocketed");
                self.striker = None;
            }
        }
        self.clock.tick += 1;
    }

    pub fn body(&self, id: BodyId) -> Option<Body> {
        self.world.get::<&Body>(id).ok().map(|body| *body)
    }

    /// Live bodies in entity order (captured bodies excluded)
    pub fn bodies(&self) -> Vec<(BodyId, Body)> {
        let mut bodies: Vec<(BodyId, Body)> = self
            .world
            .query::<Without<&Body, &PendingRemoval>>()
            .iter()
            .map(|(entity, body)| (entity, *body))
            .collect();
        bodies.sort_by_key(|(entity, _)| entity.id());
        bodies
    }

    /// Captured bodies still waiting for despawn
    pub fn pending_removals(&self) -> Vec<(BodyId, Body)> {
        let mut bodies: Vec<(BodyId, Body)> = self
            .world
            .query::<(&Body, &PendingRemoval)>()
            .iter()
            .map(|(entity, (body, _))| (entity, *body))
            .collect();
        bodies.sort_by_key(|(entity, _)| entity.id());
        bodies
    }

    pub fn has_pending_removals(&self) -> bool {
        self.world
            .query::<&PendingRemoval>()
            .iter()
            .next()
            .is_some()
    }

    /// Number of live pieces left (striker excluded)
    pub fn piece_count(&self) -> usize {
        self.world
            .query::<Without<&Body, &PendingRemoval>>()
            .iter()
            .filter(|(_, body)| body.kind.is_piece())
            .count()
    }

    /// True when every live body moves slower than `epsilon` units per tick
    pub fn is_at_rest(&self, epsilon: f32) -> bool {
        self.world
            .query::<Without<&Body, &PendingRemoval>>()
            .iter()
            .all(|(_, body)| body.speed() < epsilon)
    }

    /// Zero the residual velocity of every live body
    pub fn settle(&mut self) {
        for (_entity, body) in self
            .world
            .query_mut::<Without<&mut Body, &PendingRemoval>>()
        {
            body.vel = Vec2::ZERO;
        }
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.world
            .query::<Without<&Body, &PendingRemoval>>()
            .iter()
            .map(|(_, body)| body.kinetic_energy())
            .sum()
    }

    /// Take every event reported since the last drain
    pub fn drain_events(&mut self) -> Vec<PhysicsEvent> {
        self.events.drain()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
