//! Local replica of the shared session

use carrom_core::{PlayerNumber, ShotEvent};
use proto::{GameSession, SessionStatus, ShotRecord};
use session_sync::shot_event;

/// Difference between two consecutive session snapshots
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    Status(SessionStatus),
    Turn(PlayerNumber),
    Score(PlayerNumber, u32),
    RemoteShot(ShotEvent),
    OpponentJoined,
    OpponentLeft,
}

/// What this client last saw of the session
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    initialized: bool,
    status: SessionStatus,
    current_turn: PlayerNumber,
    scores: [u32; 2],
    names: [Option<String>; 2],
    last_shot: Option<ShotRecord>,
    winner: Option<PlayerNumber>,
}

impl SessionView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current_turn(&self) -> PlayerNumber {
        self.current_turn
    }

    pub fn score(&self, player: PlayerNumber) -> u32 {
        self.scores[index(player)]
    }

    pub fn name(&self, player: PlayerNumber) -> Option<&str> {
        self.names[index(player)].as_deref()
    }

    pub fn is_present(&self, player: PlayerNumber) -> bool {
        self.names[index(player)].is_some()
    }

    pub fn winner(&self) -> Option<PlayerNumber> {
        self.winner
    }

    /// Fold a snapshot into the view and report what changed
    ///
    /// A shot is reported when the stored record differs from the last one
    /// seen. Timestamps come from the shooter's clock and are not compared.
    /// Shots authored by `local`, and a shot already present in the first
    /// snapshot, are not reported.
    pub fn apply(&mut self, session: &GameSession, local: Option<PlayerNumber>) -> Vec<SessionChange> {
        let mut changes = Vec::new();
        let first = !self.initialized;
        self.initialized = true;

        if session.status != self.status {
            self.status = session.status;
            changes.push(SessionChange::Status(session.status));
        }
        if session.status == SessionStatus::Finished {
            self.winner = session.winner.and_then(PlayerNumber::from_u8);
        }

        match PlayerNumber::from_u8(session.current_turn) {
            Some(turn) if turn != self.current_turn => {
                self.current_turn = turn;
                changes.push(SessionChange::Turn(turn));
            }
            Some(_) => {}
            None => log::warn!("Ignoring invalid turn {}", session.current_turn),
        }

        for player in [PlayerNumber::One, PlayerNumber::Two] {
            let slot = index(player);
            let record = session.player(player.as_u8());
            let was_present = self.names[slot].is_some();
            self.names[slot] = record.map(|r| r.name.clone());

            if Some(player) != local {
                match (was_present, record.is_some()) {
                    (false, true) => changes.push(SessionChange::OpponentJoined),
                    (true, false) => changes.push(SessionChange::OpponentLeft),
                    _ => {}
                }
            }
            if let Some(record) = record {
                if record.score != self.scores[slot] {
                    self.scores[slot] = record.score;
                    changes.push(SessionChange::Score(player, record.score));
                }
            }
        }

        if let Some(record) = &session.last_shot {
            if self.last_shot.as_ref() != Some(record) {
                self.last_shot = Some(*record);
                let remote = PlayerNumber::from_u8(record.player) != local;
                if !first && remote {
                    match shot_event(record) {
                        Some(shot) => changes.push(SessionChange::RemoteShot(shot)),
                        None => log::warn!("Ignoring shot by unknown player {}", record.player),
                    }
                }
            }
        }

        changes
    }
}

fn index(player: PlayerNumber) -> usize {
    usize::from(player.as_u8() - 1)
}
