use crate::{CaptureEvent, Config, PlayerNumber};

/// Phase of the current turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TurnPhase {
    /// Waiting for the turn owner to aim
    #[default]
    Idle,
    /// A drag gesture is in progress
    Aiming,
    /// Bodies are moving after a shot
    InFlight,
    /// Everything has slowed below the rest speed; waiting for confirmation
    Settling,
}

/// Outcome of a completed turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnSummary {
    pub shooter: PlayerNumber,
    pub next: PlayerNumber,
    pub captures: Vec<CaptureEvent>,
    pub turn_number: u64,
}

/// Sequences a turn from aim to rest and hands the turn over
///
/// Ownership only changes while idle: a shot locks the turn until every
/// body has rested for `confirm_ticks` consecutive ticks and no captured
/// body is still waiting for removal.
#[derive(Debug, Clone)]
pub struct TurnMachine {
    phase: TurnPhase,
    current: PlayerNumber,
    rest_ticks: u32,
    confirm_ticks: u32,
    captures: Vec<CaptureEvent>,
    turns_completed: u64,
}

impl TurnMachine {
    pub fn new(confirm_ticks: u32) -> Self {
        Self {
            phase: TurnPhase::Idle,
            current: PlayerNumber::One,
            rest_ticks: 0,
            confirm_ticks: confirm_ticks.max(1),
            captures: Vec::new(),
            turns_completed: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.settle_confirm_ticks)
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Player who owns the current turn
    pub fn current(&self) -> PlayerNumber {
        self.current
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TurnPhase::Idle
    }

    /// Bodies are still moving or settling from the last shot
    pub fn is_locked(&self) -> bool {
        matches!(self.phase, TurnPhase::InFlight | TurnPhase::Settling)
    }

    pub fn turns_completed(&self) -> u64 {
        self.turns_completed
    }

    /// Captures recorded so far in this turn
    pub fn captures(&self) -> &[CaptureEvent] {
        &self.captures
    }

    /// Whether a local player may aim right now
    ///
    /// `None` means every seat is local (hot-seat play).
    pub fn accepts_input(&self, local: Option<PlayerNumber>) -> bool {
        if self.is_locked() {
            return false;
        }
        match local {
            Some(player) => player == self.current,
            None => true,
        }
    }

    /// Idle -> Aiming
    pub fn begin_aim(&mut self) -> bool {
        if self.phase != TurnPhase::Idle {
            return false;
        }
        self.phase = TurnPhase::Aiming;
        true
    }

    /// Aiming -> Idle after a discarded gesture
    pub fn cancel_aim(&mut self) {
        if self.phase == TurnPhase::Aiming {
            self.phase = TurnPhase::Idle;
        }
    }

    /// InFlight -> Idle for a shot that never reached the board
    ///
    /// Only valid before the first tick has observed it.
    pub fn retract_shot(&mut self) -> bool {
        if self.phase != TurnPhase::InFlight || self.rest_ticks != 0 {
            return false;
        }
        self.phase = TurnPhase::Idle;
        self.captures.clear();
        true
    }

    /// A shot left the striker; locks the turn until the board settles
    ///
    /// Returns false when a shot is already in flight or `shooter` does not
    /// own the turn.
    pub fn shot_fired(&mut self, shooter: PlayerNumber) -> bool {
        if self.is_locked() {
            return false;
        }
        if shooter != self.current {
            log::debug!("Refusing shot by player {shooter}, turn is {}", self.current);
            return false;
        }
        self.phase = TurnPhase::InFlight;
        self.rest_ticks = 0;
        self.captures.clear();
        true
    }

    pub fn record_capture(&mut self, capture: CaptureEvent) {
        self.captures.push(capture);
    }

    /// Take a replicated turn owner; refused unless idle
    pub fn adopt_turn(&mut self, player: PlayerNumber) -> bool {
        if self.phase != TurnPhase::Idle {
            return false;
        }
        self.current = player;
        true
    }

    /// Feed the rest state of one tick
    ///
    /// Returns the summary of the turn on the tick it completes.
    pub fn observe(&mut self, at_rest: bool, removals_pending: bool) -> Option<TurnSummary> {
        match self.phase {
            TurnPhase::Idle | TurnPhase::Aiming => None,
            TurnPhase::InFlight => {
                if !at_rest {
                    return None;
                }
                self.phase = TurnPhase::Settling;
                self.rest_ticks = 1;
                self.try_complete(removals_pending)
            }
            TurnPhase::Settling => {
                if !at_rest {
                    log::debug!("Motion resumed while settling");
                    self.phase = TurnPhase::InFlight;
                    self.rest_ticks = 0;
                    return None;
                }
                self.rest_ticks = self.rest_ticks.saturating_add(1);
                self.try_complete(removals_pending)
            }
        }
    }

    fn try_complete(&mut self, removals_pending: bool) -> Option<TurnSummary> {
        if self.rest_ticks < self.confirm_ticks || removals_pending {
            return None;
        }
        let shooter = self.current;
        let next = shooter.other();
        self.current = next;
        self.phase = TurnPhase::Idle;
        self.rest_ticks = 0;
        self.turns_completed += 1;
        log::debug!("Turn {} complete, player {next} to shoot", self.turns_completed);
        Some(TurnSummary {
            shooter,
            next,
            captures: std::mem::take(&mut self.captures),
            turn_number: self.turns_completed,
        })
    }
}

impl Default for TurnMachine {
    fn default() -> Self {
        Self::new(crate::Params::SETTLE_CONFIRM_TICKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired() -> TurnMachine {
        let mut turn = TurnMachine::new(3);
        assert!(turn.shot_fired(PlayerNumber::One));
        turn
    }

    #[test]
    fn test_turn_completes_after_confirmation() {
        let mut turn = fired();
        assert_eq!(turn.observe(false, false), None);
        assert_eq!(turn.phase(), TurnPhase::InFlight);
        assert_eq!(turn.observe(true, false), None);
        assert_eq!(turn.phase(), TurnPhase::Settling);
        assert_eq!(turn.observe(true, false), None);

        let summary = turn.observe(true, false).expect("turn should complete");

        assert_eq!(summary.shooter, PlayerNumber::One);
        assert_eq!(summary.next, PlayerNumber::Two);
        assert_eq!(summary.turn_number, 1);
        assert_eq!(turn.current(), PlayerNumber::Two);
        assert!(turn.is_idle());
    }

    #[test]
    fn test_motion_resumes_during_settling() {
        let mut turn = fired();
        turn.observe(true, false);
        turn.observe(false, false);
        assert_eq!(turn.phase(), TurnPhase::InFlight);
        turn.observe(true, false);
        turn.observe(true, false);
        assert!(turn.observe(true, false).is_some(), "Window restarts");
    }

    #[test]
    fn test_pending_removal_holds_turn() {
        let mut turn = fired();
        for _ in 0..5 {
            assert_eq!(turn.observe(true, true), None);
        }
        assert_eq!(turn.phase(), TurnPhase::Settling);
        assert!(turn.observe(true, false).is_some());
    }

    #[test]
    fn test_no_ownership_change_while_locked() {
        let mut turn = fired();
        assert!(!turn.adopt_turn(PlayerNumber::Two));
        assert!(!turn.shot_fired(PlayerNumber::Two), "One shot at a time");
        assert!(!turn.accepts_input(Some(PlayerNumber::One)));
        assert!(!turn.accepts_input(None));
        assert_eq!(turn.current(), PlayerNumber::One);
    }

    #[test]
    fn test_shot_refused_for_non_owner() {
        let mut turn = TurnMachine::default();
        assert!(!turn.shot_fired(PlayerNumber::Two));
        assert!(turn.is_idle());
        assert_eq!(turn.current(), PlayerNumber::One);
    }

    #[test]
    fn test_retract_unobserved_shot() {
        let mut turn = fired();
        assert!(turn.retract_shot());
        assert!(turn.is_idle());
        assert_eq!(turn.current(), PlayerNumber::One);

        let mut turn = fired();
        turn.observe(true, false);
        assert!(!turn.retract_shot(), "Settling shots stay on the board");
    }

    #[test]
    fn test_input_only_for_turn_owner() {
        let mut turn = TurnMachine::default();
        assert!(turn.accepts_input(Some(PlayerNumber::One)));
        assert!(!turn.accepts_input(Some(PlayerNumber::Two)));
        assert!(turn.accepts_input(None), "Hot-seat accepts either seat");
        assert!(turn.adopt_turn(PlayerNumber::Two));
        assert!(turn.accepts_input(Some(PlayerNumber::Two)));
    }

    #[test]
    fn test_aim_and_cancel() {
        let mut turn = TurnMachine::default();
        assert!(turn.begin_aim());
        assert!(!turn.begin_aim());
        assert_eq!(turn.phase(), TurnPhase::Aiming);
        turn.cancel_aim();
        assert!(turn.is_idle());
    }

    #[test]
    fn test_turns_alternate() {
        let mut turn = TurnMachine::new(1);
        let mut shooters = Vec::new();
        for _ in 0..4 {
            let shooter = turn.current();
            turn.shot_fired(shooter);
            let summary = turn.observe(true, false).expect("single-tick window");
            shooters.push(summary.shooter);
        }
        assert_eq!(
            shooters,
            vec![
                PlayerNumber::One,
                PlayerNumber::Two,
                PlayerNumber::One,
                PlayerNumber::Two
            ]
        );
    }
}
