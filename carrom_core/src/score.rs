use crate::{BodyKind, CaptureEvent, Config, PlayerNumber};

/// Points awarded per pocketed kind; the striker is always worth nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointTable {
    pub queen: u32,
    pub dark: u32,
    pub light: u32,
}

impl PointTable {
    pub fn from_config(config: &Config) -> Self {
        Self {
            queen: config.queen_points,
            dark: config.dark_points,
            light: config.light_points,
        }
    }

    pub fn points_for(&self, kind: BodyKind) -> u32 {
        match kind {
            BodyKind::Queen => self.queen,
            BodyKind::Dark => self.dark,
            BodyKind::Light => self.light,
            BodyKind::Striker => 0,
        }
    }
}

impl Default for PointTable {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Running score per player
///
/// Scores only ever grow: captures add points and adopting a remote value
/// never lowers a local one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    one: u32,
    two: u32,
    points: PointTable,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            points: PointTable::from_config(config),
            ..Self::default()
        }
    }

    pub fn points(&self) -> &PointTable {
        &self.points
    }

    pub fn score(&self, player: PlayerNumber) -> u32 {
        match player {
            PlayerNumber::One => self.one,
            PlayerNumber::Two => self.two,
        }
    }

    fn slot(&mut self, player: PlayerNumber) -> &mut u32 {
        match player {
            PlayerNumber::One => &mut self.one,
            PlayerNumber::Two => &mut self.two,
        }
    }

    /// Credit one capture to its player and return the new score
    pub fn award(&mut self, capture: &CaptureEvent) -> u32 {
        let points = self.points.points_for(capture.kind);
        let slot = self.slot(capture.player);
        *slot = slot.saturating_add(points);
        *slot
    }

    /// Commit a turn's captures; returns the players whose score changed
    pub fn commit(&mut self, captures: &[CaptureEvent]) -> Vec<(PlayerNumber, u32)> {
        let mut changed: Vec<(PlayerNumber, u32)> = Vec::new();
        for capture in captures {
            if self.points.points_for(capture.kind) == 0 {
                continue;
            }
            let score = self.award(capture);
            match changed.iter_mut().find(|(player, _)| *player == capture.player) {
                Some(entry) => entry.1 = score,
                None => changed.push((capture.player, score)),
            }
        }
        changed
    }

    /// Take a replicated score if it is ahead of ours
    pub fn adopt(&mut self, player: PlayerNumber, value: u32) -> bool {
        let slot = self.slot(player);
        if value > *slot {
            *slot = value;
            true
        } else {
            false
        }
    }

    /// Player with the higher score, `None` on a tie
    pub fn leader(&self) -> Option<PlayerNumber> {
        match self.one.cmp(&self.two) {
            std::cmp::Ordering::Greater => Some(PlayerNumber::One),
            std::cmp::Ordering::Less => Some(PlayerNumber::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}
