//! Pointer input handling

use glam::Vec2;

/// Pointer gesture phases, already in board units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
}

/// Where the board is drawn on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen position of the board's top-left corner
    pub origin: Vec2,
    /// Screen pixels per board unit
    pub scale: f32,
}

impl Viewport {
    pub fn new(origin: Vec2, scale: f32) -> Self {
        Self { origin, scale }
    }

    /// Fit a square board of `board_size` units into a `width` x `height` area, centered
    pub fn fit(width: f32, height: f32, board_size: f32) -> Self {
        let side = width.min(height);
        let scale = if board_size > 0.0 { side / board_size } else { 1.0 };
        let origin = Vec2::new((width - side) / 2.0, (height - side) / 2.0);
        Self { origin, scale }
    }

    /// Map a screen point to board coordinates
    pub fn to_board(&self, screen: Vec2) -> Vec2 {
        if self.scale <= 0.0 {
            return screen - self.origin;
        }
        (screen - self.origin) / self.scale
    }

    pub fn to_screen(&self, board: Vec2) -> Vec2 {
        board * self.scale + self.origin
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0)
    }
}
