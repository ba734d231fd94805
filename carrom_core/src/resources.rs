use hecs::Entity;

use crate::components::{BodyKind, PlayerNumber};

/// Fixed-step clock
///
/// Frame time is accumulated and consumed in whole ticks so every client
/// runs the same sequence of steps regardless of frame-rate jitter.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub fixed_dt: f32,
    pub max_dt: f32,
    pub accumulator: f32,
    pub tick: u64,
}

impl FixedClock {
    pub fn new(fixed_dt: f32, max_dt: f32) -> Self {
        Self {
            fixed_dt,
            max_dt,
            accumulator: 0.0,
            tick: 0,
        }
    }

    /// Add frame time and return how many whole ticks are due
    pub fn advance(&mut self, dt: f32) -> u32 {
        if dt.is_nan() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt.min(self.max_dt);
        let mut due = 0;
        while self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            due += 1;
        }
        due
    }

    /// Tick length in milliseconds
    pub fn tick_ms(&self) -> f32 {
        self.fixed_dt * 1000.0
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(crate::Params::FIXED_DT, crate::Params::MAX_DT)
    }
}

/// Two bodies touched during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub a: Entity,
    pub b: Entity,
    pub impact_speed: f32,
}

/// A body fell into a pocket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureEvent {
    pub body: Entity,
    pub kind: BodyKind,
    pub player: PlayerNumber,
    pub pocket: usize,
}

/// Everything the physics world reports to its collaborators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsEvent {
    Collision(CollisionEvent),
    Capture(CaptureEvent),
    WallHit { body: Entity, speed: f32 },
}

/// Events that occurred since the last drain
#[derive(Debug, Clone, Default)]
pub struct Events {
    items: Vec<PhysicsEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PhysicsEvent) {
        self.items.push(event);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhysicsEvent> {
        self.items.iter()
    }

    pub fn drain(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.items)
    }

    pub fn captures(&self) -> impl Iterator<Item = &CaptureEvent> {
        self.items.iter().filter_map(|event| match event {
            PhysicsEvent::Capture(capture) => Some(capture),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_consumes_whole_ticks() {
        let mut clock = FixedClock::new(0.25, 1.0);
        assert_eq!(clock.advance(0.875), 3);
        assert_eq!(clock.accumulator, 0.125);
        assert_eq!(clock.advance(0.125), 1, "Remainder carries over");
    }

    #[test]
    fn test_clock_clamps_large_frames() {
        let mut clock = FixedClock::new(0.25, 1.0);
        assert_eq!(clock.advance(10.0), 4);
    }

    #[test]
    fn test_clock_ignores_non_positive_dt() {
        let mut clock = FixedClock::new(0.01, 0.05);
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.advance(f32::NAN), 0);
        assert_eq!(clock.accumulator, 0.0);
    }

    #[test]
    fn test_events_drain() {
        let mut world = hecs::World::new();
        let e = world.spawn((1u8,));
        let mut events = Events::new();
        events.push(PhysicsEvent::WallHit { body: e, speed: 1.0 });
        events.push(PhysicsEvent::Capture(CaptureEvent {
            body: e,
            kind: BodyKind::Queen,
            player: PlayerNumber::One,
            pocket: 0,
        }));
        assert_eq!(events.captures().count(), 1);
        let drained = events.drain();
        assert_eq!(drained.len(), 2);
        assert!(events.is_empty());
    }
}
