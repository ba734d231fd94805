//! Scripted play without a display, for the headless binary and tests

use std::sync::atomic::{AtomicU64, Ordering};

use carrom_core::GestureRejection;
use glam::Vec2;
use session_sync::Environment;

use crate::app::App;
use crate::error::ClientError;
use crate::game::UiHooks;
use crate::input::PointerEvent;

pub const FRAME_DT: f32 = 1.0 / 60.0;
pub const FRAME_MS: u64 = 16;

/// Drags cycled through by scripted players, relative to the striker
pub const DEFAULT_DRAGS: [Vec2; 5] = [
    Vec2::new(0.0, 80.0),
    Vec2::new(25.0, 70.0),
    Vec2::new(-30.0, 75.0),
    Vec2::new(10.0, 95.0),
    Vec2::new(-15.0, 60.0),
];

/// Manually advanced clock shared by simulated clients
#[derive(Debug, Default)]
pub struct SimClock {
    now_ms: AtomicU64,
}

impl SimClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Environment for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Press on the striker, drag by `drag` and release
pub fn take_shot<H: UiHooks>(app: &mut App<H>, drag: Vec2) -> Result<(), ClientError> {
    let striker = app
        .game()
        .ok_or(ClientError::NoGame)?
        .physics()
        .striker_position()
        .ok_or(GestureRejection::NoStriker)?;
    app.handle_pointer(PointerEvent::Down(striker))?;
    app.handle_pointer(PointerEvent::Move(striker + drag))?;
    app.handle_pointer(PointerEvent::Up)
}

/// Whether this client is idle and may shoot
pub fn ready_to_shoot<H: UiHooks>(app: &App<H>) -> bool {
    app.game().is_some_and(|game| game.can_shoot())
}

/// Whether this client's game has ended
pub fn finished<H: UiHooks>(app: &App<H>) -> bool {
    app.game().is_some_and(|game| game.is_finished())
}
