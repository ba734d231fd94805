/// Game tuning parameters for carrom
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Board
    pub const BOARD_SIZE: f32 = 600.0;
    pub const WALL_THICKNESS: f32 = 30.0;
    pub const POCKET_RADIUS: f32 = 25.0;
    pub const STRIKER_SPOT_X: f32 = 300.0;
    pub const STRIKER_SPOT_Y: f32 = 550.0;

    // Bodies
    pub const PIECE_RADIUS: f32 = 12.0;
    pub const STRIKER_RADIUS: f32 = 18.0;
    pub const PIECE_DENSITY: f32 = 0.001;
    pub const STRIKER_DENSITY: f32 = 0.002;
    pub const RESTITUTION: f32 = 0.8;
    pub const LINEAR_DAMPING: f32 = 0.05; // fraction of velocity lost per tick
    pub const RACK_GAP_FACTOR: f32 = 2.2; // center spacing in piece radii

    // Shot
    pub const AIM_CAPTURE_RADIUS: f32 = 50.0;
    pub const DRAG_TO_POWER: f32 = 100.0; // drag length at full power
    pub const POWER_TO_FORCE: f32 = 0.015;
    pub const MIN_DRAG: f32 = 5.0;
    pub const AIM_GUIDE_SCALE: f32 = 1.5;

    // Turn
    pub const REST_SPEED: f32 = 0.1; // units per tick
    pub const SETTLE_CONFIRM_TICKS: u32 = 3;
    pub const REMOVAL_DELAY_TICKS: u32 = 6; // ~100 ms at 60 Hz

    // Scoring
    pub const QUEEN_POINTS: u32 = 5;
    pub const DARK_POINTS: u32 = 2;
    pub const LIGHT_POINTS: u32 = 1;

    // Feedback
    pub const COLLISION_FEEDBACK_SPEED: f32 = 2.0;

    // Physics
    pub const FIXED_DT: f32 = 1.0 / 60.0;
    pub const MAX_DT: f32 = 0.25; // Clamp to prevent large catch-up bursts
    pub const SUBSTEPS: u32 = 4;
    pub const FORCE_SCALE: f32 = 4000.0; // full-power shot launches the striker at ~29 units/tick
}
