use glam::Vec2;
use thiserror::Error;

use crate::{Config, PlayerNumber, TurnMachine, TurnPhase};

/// Why a pointer gesture did not become a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureRejection {
    #[error("input is locked for this player")]
    InputLocked,
    #[error("press is too far from the striker")]
    OutOfReach,
    #[error("no aim in progress")]
    NotAiming,
    #[error("drag too short to shoot")]
    InvalidGesture,
    #[error("no striker on the board")]
    NoStriker,
}

/// A fired shot, local or replicated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotEvent {
    pub player: PlayerNumber,
    pub force: Vec2,
    /// Striker position at release
    pub position: Vec2,
    pub timestamp_ms: u64,
}

/// Turns a press-drag-release gesture into a striker impulse
///
/// The force points away from the drag and its magnitude grows linearly
/// with drag length up to full power.
#[derive(Debug, Clone)]
pub struct ShotController {
    anchor: Option<Vec2>,
    pointer: Vec2,
    capture_radius: f32,
    drag_to_power: f32,
    power_to_force: f32,
    min_drag: f32,
    guide_scale: f32,
}

impl ShotController {
    pub fn new(config: &Config) -> Self {
        Self {
            anchor: None,
            pointer: Vec2::ZERO,
            capture_radius: config.aim_capture_radius,
            drag_to_power: config.drag_to_power,
            power_to_force: config.power_to_force,
            min_drag: config.min_drag,
            guide_scale: config.aim_guide_scale,
        }
    }

    pub fn is_aiming(&self) -> bool {
        self.anchor.is_some()
    }

    /// Start aiming if the press lands near the striker
    pub fn press(
        &mut self,
        point: Vec2,
        striker: Option<Vec2>,
        turn: &mut TurnMachine,
        local: Option<PlayerNumber>,
    ) -> Result<(), GestureRejection> {
        if !turn.accepts_input(local) || turn.phase() != TurnPhase::Idle {
            return Err(GestureRejection::InputLocked);
        }
        let striker = striker.ok_or(GestureRejection::NoStriker)?;
        if point.distance(striker) >= self.capture_radius {
            return Err(GestureRejection::OutOfReach);
        }
        if !turn.begin_aim() {
            return Err(GestureRejection::InputLocked);
        }
        self.anchor = Some(point);
        self.pointer = point;
        Ok(())
    }

    /// Track the pointer while aiming; ignored otherwise
    pub fn drag(&mut self, point: Vec2) {
        if self.anchor.is_some() {
            self.pointer = point;
        }
    }

    fn drag_vector(&self) -> Option<Vec2> {
        self.anchor.map(|anchor| self.pointer - anchor)
    }

    /// Shot strength in `[0, 1]`
    pub fn power(&self) -> f32 {
        self.drag_vector()
            .map(|drag| (drag.length() / self.drag_to_power).min(1.0))
            .unwrap_or(0.0)
    }

    /// Drag angle in radians
    pub fn angle(&self) -> f32 {
        self.drag_vector()
            .map(|drag| drag.y.atan2(drag.x))
            .unwrap_or(0.0)
    }

    /// Anchor and far end of the aim line, for the overlay
    pub fn aim_guide(&self) -> Option<(Vec2, Vec2)> {
        let anchor = self.anchor?;
        let drag = self.pointer - anchor;
        Some((anchor, anchor - drag * self.guide_scale))
    }

    /// Force for a drag vector, or `None` below the minimum drag
    pub fn force_for_drag(&self, drag: Vec2) -> Option<Vec2> {
        let length = drag.length();
        if length <= self.min_drag {
            return None;
        }
        let power = (length / self.drag_to_power).min(1.0);
        Some(-drag / length * power * self.power_to_force)
    }

    /// Finish the gesture
    ///
    /// A long enough drag fires and moves the turn in flight. A short one is
    /// discarded and returns the turn to idle.
    pub fn release(
        &mut self,
        player: PlayerNumber,
        striker: Option<Vec2>,
        now_ms: u64,
        turn: &mut TurnMachine,
    ) -> Result<ShotEvent, GestureRejection> {
        let drag = self.drag_vector().ok_or(GestureRejection::NotAiming)?;
        self.anchor = None;

        let Some(force) = self.force_for_drag(drag) else {
            log::debug!("Discarding short drag of {:.1}", drag.length());
            turn.cancel_aim();
            return Err(GestureRejection::InvalidGesture);
        };
        let Some(position) = striker else {
            turn.cancel_aim();
            return Err(GestureRejection::NoStriker);
        };

        if !turn.shot_fired(player) {
            turn.cancel_aim();
            return Err(GestureRejection::InputLocked);
        }
        Ok(ShotEvent {
            player,
            force,
            position,
            timestamp_ms: now_ms,
        })
    }

    /// Abandon the gesture without shooting
    pub fn cancel(&mut self, turn: &mut TurnMachine) {
        if self.anchor.take().is_some() {
            turn.cancel_aim();
        }
    }
}

impl Default for ShotController {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
