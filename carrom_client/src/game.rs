//! Frame driver for one client's game

use std::collections::VecDeque;

use carrom_core::{
    Body, BodyId, BodyKind, Config, GestureRejection, PhysicsEvent, PhysicsWorld, PlayerNumber,
    ScoreLedger, ShotController, ShotEvent, TurnMachine, TurnPhase, TurnSummary,
};
use glam::Vec2;
use proto::{GameSession, SessionStatus};
use session_sync::{SyncChannel, SyncError};

use crate::error::ClientError;
use crate::network::Inbox;
use crate::state::{SessionChange, SessionView};

/// Presentation callbacks (sound, score flashes, banners)
pub trait UiHooks {
    fn on_score_update(&mut self, _kind: BodyKind) {}
    fn on_turn_end(&mut self) {}
    fn on_collision(&mut self, _impact_speed: f32) {}
    fn on_game_over(&mut self, _winner: Option<PlayerNumber>) {}
}

/// Hooks that ignore everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl UiHooks for NoopHooks {}

/// Session writes owed at the end of a local turn, in publish order
#[derive(Debug)]
struct Handover {
    scores: VecDeque<(PlayerNumber, u32)>,
    finish: Option<Option<PlayerNumber>>,
    next: PlayerNumber,
}

impl Handover {
    /// Publish what is left; each write is dropped once the store takes it
    fn publish(&mut self, channel: &SyncChannel) -> Result<(), SyncError> {
        while let Some(&(player, score)) = self.scores.front() {
            channel.publish_score(player, score)?;
            self.scores.pop_front();
        }
        if let Some(winner) = self.finish {
            channel.finish_session(winner)?;
            self.finish = None;
        }
        channel.publish_turn(self.next)
    }
}

/// One client's running game
///
/// Either hot-seat (both seats local, no channel) or online with a
/// [`SyncChannel`]. Remote updates queue in the inbox and are applied at
/// the start of a frame; turn handovers and remote shots that arrive while
/// the board is still moving wait until the turn machine is idle. A turn
/// handover the store refused stays pending and is retried every frame.
pub struct Match {
    physics: PhysicsWorld,
    turn: TurnMachine,
    shot: ShotController,
    ledger: ScoreLedger,
    view: SessionView,
    channel: Option<SyncChannel>,
    local: Option<PlayerNumber>,
    inbox: Inbox,
    pending_turn: Option<PlayerNumber>,
    pending_shots: VecDeque<ShotEvent>,
    pending_scores: Vec<(PlayerNumber, u32)>,
    pending_handover: Option<Handover>,
    running: bool,
    finished: bool,
    winner: Option<PlayerNumber>,
}

impl Match {
    fn with_parts(config: Config, channel: Option<SyncChannel>, local: Option<PlayerNumber>) -> Self {
        let mut physics = PhysicsWorld::new(config.clone());
        physics.rack();
        let spot = physics.board().striker_spot;
        physics.spawn_striker(spot);
        Self {
            physics,
            turn: TurnMachine::from_config(&config),
            shot: ShotController::new(&config),
            ledger: ScoreLedger::from_config(&config),
            view: SessionView::new(),
            channel,
            local,
            inbox: Inbox::new(),
            pending_turn: None,
            pending_shots: VecDeque::new(),
            pending_scores: Vec::new(),
            pending_handover: None,
            running: true,
            finished: false,
            winner: None,
        }
    }

    /// Both players share this client
    pub fn hot_seat(config: Config) -> Self {
        Self::with_parts(config, None, None)
    }

    /// Play through a channel that has already created or joined a session
    pub fn online(config: Config, channel: SyncChannel) -> Result<Self, ClientError> {
        let local = channel
            .player()
            .ok_or(SyncError::NotInSession)?;
        let mut game = Self::with_parts(config, Some(channel), Some(local));
        if let Some(channel) = game.channel.as_mut() {
            game.inbox.attach(channel)?;
        }
        Ok(game)
    }

    pub fn is_online(&self) -> bool {
        self.channel.is_some()
    }

    pub fn local_player(&self) -> Option<PlayerNumber> {
        self.local
    }

    pub fn session_id(&self) -> Option<&str> {
        self.channel.as_ref().and_then(SyncChannel::session_id)
    }

    pub fn now_ms(&self) -> u64 {
        self.channel.as_ref().map_or(0, SyncChannel::now_ms)
    }

    /// Advance by one frame of `dt` seconds
    pub fn frame(&mut self, dt: f32, hooks: &mut dyn UiHooks) -> Result<(), ClientError> {
        if !self.running {
            return Ok(());
        }
        self.flush_handover()?;
        for session in self.inbox.drain() {
            self.apply_session(&session, hooks);
        }
        self.flush_deferred()?;

        let due = self.physics.accumulate(dt);
        for _ in 0..due {
            self.tick(hooks)?;
        }
        Ok(())
    }

    fn tick(&mut self, hooks: &mut dyn UiHooks) -> Result<(), ClientError> {
        self.physics.tick(self.turn.current());

        let feedback_speed = self.physics.config().collision_feedback_speed;
        for event in self.physics.drain_events() {
            match event {
                PhysicsEvent::Collision(hit) => {
                    if hit.impact_speed > feedback_speed {
                        hooks.on_collision(hit.impact_speed);
                    }
                }
                PhysicsEvent::Capture(capture) => {
                    self.turn.record_capture(capture);
                    if capture.kind.is_piece() {
                        hooks.on_score_update(capture.kind);
                    }
                }
                PhysicsEvent::WallHit { .. } => {}
            }
        }

        let rest_speed = self.physics.config().rest_speed;
        let summary = self.turn.observe(
            self.physics.is_at_rest(rest_speed),
            self.physics.has_pending_removals(),
        );
        if let Some(summary) = summary {
            self.complete_turn(summary, hooks)?;
        }
        Ok(())
    }

    fn complete_turn(
        &mut self,
        summary: TurnSummary,
        hooks: &mut dyn UiHooks,
    ) -> Result<(), ClientError> {
        self.physics.settle();
        let changed = self.ledger.commit(&summary.captures);
        let spot = self.physics.board().striker_spot;
        self.physics.spawn_striker(spot);
        hooks.on_turn_end();

        let cleared = self.physics.piece_count() == 0;
        let winner = self.ledger.leader();
        log::info!(
            "Turn {} by player {}: {} captured, scores {}-{}",
            summary.turn_number,
            summary.shooter,
            summary.captures.len(),
            self.ledger.score(PlayerNumber::One),
            self.ledger.score(PlayerNumber::Two)
        );

        if self.channel.is_some() && self.local == Some(summary.shooter) {
            self.pending_handover = Some(Handover {
                scores: changed.into_iter().collect(),
                finish: cleared.then_some(winner),
                next: summary.next,
            });
        }
        if cleared {
            self.finish(winner, hooks);
        }
        self.flush_handover()
    }

    fn flush_handover(&mut self) -> Result<(), ClientError> {
        let (Some(channel), Some(handover)) = (&self.channel, self.pending_handover.as_mut())
        else {
            return Ok(());
        };
        match handover.publish(channel) {
            Ok(()) => {
                self.pending_handover = None;
                Ok(())
            }
            Err(e) => {
                log::warn!("Turn handover not published, retrying next frame: {e}");
                Err(e.into())
            }
        }
    }

    fn finish(&mut self, winner: Option<PlayerNumber>, hooks: &mut dyn UiHooks) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.winner = winner;
        log::info!("Game over, winner: {winner:?}");
        hooks.on_game_over(winner);
    }

    fn apply_session(&mut self, session: &GameSession, hooks: &mut dyn UiHooks) {
        for change in self.view.apply(session, self.local) {
            match change {
                SessionChange::Status(SessionStatus::Finished) => {
                    let winner = self.view.winner();
                    self.finish(winner, hooks);
                }
                SessionChange::Status(status) => log::debug!("Session is {}", status.as_str()),
                SessionChange::Turn(player) => self.pending_turn = Some(player),
                SessionChange::Score(player, value) => self.pending_scores.push((player, value)),
                SessionChange::RemoteShot(shot) => self.pending_shots.push_back(shot),
                SessionChange::OpponentJoined => log::info!("Opponent joined"),
                SessionChange::OpponentLeft => log::info!("Opponent left"),
            }
        }
    }

    /// Apply queued remote shots, then turn handovers, once the board is idle
    ///
    /// A queued shot replays before any handover queued behind it, under
    /// its shooter's turn. Stored turn and scores are adopted only after
    /// every queued shot has been replayed, so a replayed capture is not
    /// counted on top of them.
    fn flush_deferred(&mut self) -> Result<(), ClientError> {
        if !self.turn.is_idle() {
            return Ok(());
        }
        if let Some(shot) = self.pending_shots.pop_front() {
            if shot.player != self.turn.current() {
                log::warn!(
                    "Shot by player {} arrived during turn {}, replaying it as theirs",
                    shot.player,
                    self.turn.current()
                );
                self.turn.adopt_turn(shot.player);
            }
            if self.turn.shot_fired(shot.player) {
                log::debug!("Replaying shot by player {}", shot.player);
                self.launch(shot)?;
            }
            return Ok(());
        }
        if let Some(player) = self.pending_turn.take() {
            self.turn.adopt_turn(player);
        }
        for (player, value) in self.pending_scores.drain(..) {
            self.ledger.adopt(player, value);
        }
        Ok(())
    }

    fn launch(&mut self, shot: ShotEvent) -> Result<(), ClientError> {
        let striker = match self.physics.striker() {
            Some(id) => id,
            None => self.physics.spawn_striker(shot.position),
        };
        self.physics.place_striker(shot.position)?;
        self.physics.apply_impulse(striker, shot.force)?;
        Ok(())
    }

    /// Whether the local player may aim right now
    pub fn can_shoot(&self) -> bool {
        // Online play also waits for the stored turn to reach us
        let playing = match (&self.channel, self.local) {
            (Some(_), Some(local)) => {
                self.view.status() == SessionStatus::Playing && self.view.current_turn() == local
            }
            _ => true,
        };
        self.running
            && !self.finished
            && playing
            && self.pending_shots.is_empty()
            && self.turn.accepts_input(self.local)
    }

    pub fn pointer_down(&mut self, point: Vec2) -> Result<(), ClientError> {
        if !self.can_shoot() {
            return Err(GestureRejection::InputLocked.into());
        }
        let striker = self.physics.striker_position();
        self.shot.press(point, striker, &mut self.turn, self.local)?;
        Ok(())
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        self.shot.drag(point);
    }

    /// Finish the gesture; returns the shot if one was fired
    ///
    /// Online, the shot is published before the striker moves. If the store
    /// refuses it the turn is handed back and the board stays put.
    pub fn pointer_up(&mut self, now_ms: u64) -> Result<Option<ShotEvent>, ClientError> {
        let player = self.local.unwrap_or(self.turn.current());
        let striker = self.physics.striker_position();
        let shot = match self.shot.release(player, striker, now_ms, &mut self.turn) {
            Ok(shot) => shot,
            Err(GestureRejection::InvalidGesture | GestureRejection::NotAiming) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if let Some(channel) = &self.channel {
            if let Err(e) = channel.publish_shot(&shot) {
                log::warn!("Shot by player {player} not published, taking it back: {e}");
                self.turn.retract_shot();
                return Err(e.into());
            }
        }
        self.launch(shot)?;
        Ok(Some(shot))
    }

    /// Put a fresh striker back on its spot
    pub fn reset_striker(&mut self) -> Result<(), ClientError> {
        if !self.can_shoot() {
            return Err(GestureRejection::InputLocked.into());
        }
        self.shot.cancel(&mut self.turn);
        let spot = self.physics.board().striker_spot;
        self.physics.spawn_striker(spot);
        Ok(())
    }

    /// Stop the loop, drop listeners and remove the local player record
    ///
    /// Every step runs even if an earlier one fails; the first error is
    /// returned.
    pub fn leave(&mut self) -> Result<(), ClientError> {
        self.running = false;
        self.shot.cancel(&mut self.turn);
        let result = match self.channel.as_mut() {
            Some(channel) => channel.leave_session().map_err(ClientError::from),
            None => Ok(()),
        };
        self.inbox.drain();
        self.pending_shots.clear();
        self.pending_scores.clear();
        self.pending_handover = None;
        result
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn winner(&self) -> Option<PlayerNumber> {
        self.winner
    }

    pub fn phase(&self) -> TurnPhase {
        self.turn.phase()
    }

    pub fn current_turn(&self) -> PlayerNumber {
        self.turn.current()
    }

    pub fn score(&self, player: PlayerNumber) -> u32 {
        self.ledger.score(player)
    }

    pub fn view(&self) -> &SessionView {
        &self.view
    }

    pub fn opponent_present(&self) -> bool {
        match self.local {
            Some(local) => self.view.is_present(local.other()),
            None => true,
        }
    }

    pub fn power(&self) -> f32 {
        self.shot.power()
    }

    pub fn is_aiming(&self) -> bool {
        self.shot.is_aiming()
    }

    pub fn aim_guide(&self) -> Option<(Vec2, Vec2)> {
        self.shot.aim_guide()
    }

    /// Live bodies for rendering
    pub fn bodies(&self) -> Vec<(BodyId, Body)> {
        self.physics.bodies()
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }
}
