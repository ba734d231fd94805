use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Kind of disc on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    Striker,
    Light,
    Dark,
    Queen,
}

impl BodyKind {
    pub fn is_piece(self) -> bool {
        !matches!(self, BodyKind::Striker)
    }

    pub fn label(self) -> &'static str {
        match self {
            BodyKind::Striker => "striker",
            BodyKind::Light => "light",
            BodyKind::Dark => "dark",
            BodyKind::Queen => "queen",
        }
    }
}

/// Player seat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerNumber {
    #[default]
    One,
    Two,
}

impl PlayerNumber {
    pub fn other(self) -> Self {
        match self {
            PlayerNumber::One => PlayerNumber::Two,
            PlayerNumber::Two => PlayerNumber::One,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            PlayerNumber::One => 1,
            PlayerNumber::Two => 2,
        }
    }

    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            1 => Some(PlayerNumber::One),
            2 => Some(PlayerNumber::Two),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Body component - a rigid disc
///
/// Velocity is measured in board units per tick. `force` accumulates
/// impulses until the next tick folds them into velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub kind: BodyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub force: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
    pub damping: f32,
}

impl Body {
    /// Create a resting disc; mass is density times area
    pub fn new(
        kind: BodyKind,
        pos: Vec2,
        radius: f32,
        density: f32,
        restitution: f32,
        damping: f32,
    ) -> Self {
        Self {
            kind,
            pos,
            vel: Vec2::ZERO,
            force: Vec2::ZERO,
            radius,
            mass: density * std::f32::consts::PI * radius * radius,
            restitution,
            damping,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn inv_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.vel.length_squared()
    }
}

/// Captured body lingering before despawn
///
/// Bodies carrying this marker are logically gone: they do not collide,
/// move, or count toward rest detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRemoval {
    pub ticks_left: u32,
}

impl PendingRemoval {
    pub fn new(ticks: u32) -> Self {
        Self { ticks_left: ticks }
    }

    /// Count down one tick; true once the body should be despawned
    pub fn tick(&mut self) -> bool {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        self.ticks_left == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_from_density() {
        let body = Body::new(BodyKind::Striker, Vec2::ZERO, 18.0, 0.002, 0.8, 0.05);
        let expected = 0.002 * std::f32::consts::PI * 324.0;
        assert!((body.mass - expected).abs() < 1e-5);
        assert!((body.inv_mass() * body.mass - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_player_number_alternates() {
        assert_eq!(PlayerNumber::One.other(), PlayerNumber::Two);
        assert_eq!(PlayerNumber::Two.other(), PlayerNumber::One);
        assert_eq!(PlayerNumber::from_u8(2), Some(PlayerNumber::Two));
        assert_eq!(PlayerNumber::from_u8(3), None);
    }

    #[test]
    fn test_pending_removal_counts_down() {
        let mut pending = PendingRemoval::new(2);
        assert!(!pending.tick());
        assert!(pending.tick());
        assert!(pending.tick(), "Stays expired");
    }
}
