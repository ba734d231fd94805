use glam::Vec2;

use crate::config::Config;

/// Circular capture zone in a board corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pocket {
    pub center: Vec2,
    pub radius: f32,
}

impl Pocket {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// True when a point lies strictly inside the capture radius
    pub fn captures(&self, point: Vec2) -> bool {
        (point - self.center).length_squared() < self.radius * self.radius
    }
}

/// Fixed board geometry
///
/// The playable interior is the square `[wall, size - wall]` on both axes.
/// Pockets sit one pocket radius in from each inner corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub size: f32,
    pub wall_thickness: f32,
    pub pockets: [Pocket; 4],
    pub striker_spot: Vec2,
}

impl Board {
    pub fn new(size: f32, wall_thickness: f32, pocket_radius: f32, striker_spot: Vec2) -> Self {
        let near = wall_thickness + pocket_radius;
        let far = size - near;
        let pockets = [
            Pocket::new(Vec2::new(near, near), pocket_radius), // Top-left
            Pocket::new(Vec2::new(far, near), pocket_radius),  // Top-right
            Pocket::new(Vec2::new(near, far), pocket_radius),  // Bottom-left
            Pocket::new(Vec2::new(far, far), pocket_radius),   // Bottom-right
        ];
        Self {
            size,
            wall_thickness,
            pockets,
            striker_spot,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.board_size,
            config.wall_thickness,
            config.pocket_radius,
            config.striker_spot(),
        )
    }

    pub fn interior_min(&self) -> f32 {
        self.wall_thickness
    }

    pub fn interior_max(&self) -> f32 {
        self.size - self.wall_thickness
    }

    pub fn center(&self) -> Vec2 {
        Vec2::splat(self.size / 2.0)
    }

    /// Check that a disc lies fully inside the playable interior
    pub fn contains(&self, pos: Vec2, radius: f32) -> bool {
        let min = self.interior_min() + radius;
        let max = self.interior_max() - radius;
        pos.x >= min && pos.x <= max && pos.y >= min && pos.y <= max
    }

    /// Clamp a disc center into the interior
    pub fn clamp(&self, pos: Vec2, radius: f32) -> Vec2 {
        let min = self.interior_min() + radius;
        let max = self.interior_max() - radius;
        pos.clamp(Vec2::splat(min), Vec2::splat(max))
    }

    /// Index of the pocket capturing this point, if any
    pub fn pocket_at(&self, point: Vec2) -> Option<usize> {
        self.pockets.iter().position(|pocket| pocket.captures(point))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pockets_sit_inside_corners() {
        let board = Board::default();
        assert_eq!(board.pockets[0].center, Vec2::new(55.0, 55.0));
        assert_eq!(board.pockets[3].center, Vec2::new(545.0, 545.0));
        for pocket in &board.pockets {
            assert!(
                board.contains(pocket.center, 0.0),
                "Pocket centers must be reachable from the interior"
            );
        }
    }

    #[test]
    fn test_pocket_at() {
        let board = Board::default();
        assert_eq!(board.pocket_at(Vec2::new(60.0, 60.0)), Some(0));
        assert_eq!(board.pocket_at(Vec2::new(540.0, 60.0)), Some(1));
        assert_eq!(board.pocket_at(board.center()), None);
        // Exactly on the rim is not a capture
        assert_eq!(board.pocket_at(Vec2::new(80.0, 55.0)), None);
    }

    #[test]
    fn test_contains_and_clamp() {
        let board = Board::default();
        assert!(board.contains(board.striker_spot, 18.0));
        assert!(!board.contains(Vec2::new(35.0, 300.0), 12.0));
        assert_eq!(
            board.clamp(Vec2::new(0.0, 700.0), 12.0),
            Vec2::new(42.0, 558.0)
        );
    }
}
