use serde::{Deserialize, Serialize};

use crate::params::Params;

/// Game configuration
///
/// Built from [`Params`] by default. Every field may be overridden from a
/// config file; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub board_size: f32,
    pub wall_thickness: f32,
    pub pocket_radius: f32,
    pub striker_spot_x: f32,
    pub striker_spot_y: f32,
    pub piece_radius: f32,
    pub striker_radius: f32,
    pub piece_density: f32,
    pub striker_density: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub rack_gap_factor: f32,
    pub aim_capture_radius: f32,
    pub drag_to_power: f32,
    pub power_to_force: f32,
    pub min_drag: f32,
    pub aim_guide_scale: f32,
    pub rest_speed: f32,
    pub settle_confirm_ticks: u32,
    pub removal_delay_ticks: u32,
    pub queen_points: u32,
    pub dark_points: u32,
    pub light_points: u32,
    pub collision_feedback_speed: f32,
    pub fixed_dt: f32,
    pub max_dt: f32,
    pub substeps: u32,
    pub force_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board_size: Params::BOARD_SIZE,
            wall_thickness: Params::WALL_THICKNESS,
            pocket_radius: Params::POCKET_RADIUS,
            striker_spot_x: Params::STRIKER_SPOT_X,
            striker_spot_y: Params::STRIKER_SPOT_Y,
            piece_radius: Params::PIECE_RADIUS,
            striker_radius: Params::STRIKER_RADIUS,
            piece_density: Params::PIECE_DENSITY,
            striker_density: Params::STRIKER_DENSITY,
            restitution: Params::RESTITUTION,
            linear_damping: Params::LINEAR_DAMPING,
            rack_gap_factor: Params::RACK_GAP_FACTOR,
            aim_capture_radius: Params::AIM_CAPTURE_RADIUS,
            drag_to_power: Params::DRAG_TO_POWER,
            power_to_force: Params::POWER_TO_FORCE,
            min_drag: Params::MIN_DRAG,
            aim_guide_scale: Params::AIM_GUIDE_SCALE,
            rest_speed: Params::REST_SPEED,
            settle_confirm_ticks: Params::SETTLE_CONFIRM_TICKS,
            removal_delay_ticks: Params::REMOVAL_DELAY_TICKS,
            queen_points: Params::QUEEN_POINTS,
            dark_points: Params::DARK_POINTS,
            light_points: Params::LIGHT_POINTS,
            collision_feedback_speed: Params::COLLISION_FEEDBACK_SPEED,
            fixed_dt: Params::FIXED_DT,
            max_dt: Params::MAX_DT,
            substeps: Params::SUBSTEPS,
            force_scale: Params::FORCE_SCALE,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default striker spot as a vector
    pub fn striker_spot(&self) -> glam::Vec2 {
        glam::Vec2::new(self.striker_spot_x, self.striker_spot_y)
    }

    /// Substep count, never zero
    pub fn substeps(&self) -> u32 {
        self.substeps.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_match_params() {
        let config = Config::new();
        assert_eq!(config.board_size, 600.0);
        assert_eq!(config.restitution, 0.8);
        assert_eq!(config.striker_spot(), glam::Vec2::new(300.0, 550.0));
    }

    #[test]
    fn test_config_substeps_never_zero() {
        let config = Config {
            substeps: 0,
            ..Config::default()
        };
        assert_eq!(config.substeps(), 1);
    }
}
