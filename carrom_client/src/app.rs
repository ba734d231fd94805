//! Top-level client: menu state plus the running game

use std::sync::Arc;

use carrom_core::Config;
use glam::Vec2;
use proto::SessionStatus;
use session_sync::{Environment, SharedStore, SyncChannel};

use crate::error::ClientError;
use crate::fsm::{Screen, ScreenAction, ScreenFsm};
use crate::game::{Match, UiHooks};
use crate::input::PointerEvent;

pub struct App<H: UiHooks> {
    fsm: ScreenFsm,
    store: Arc<dyn SharedStore>,
    env: Arc<dyn Environment>,
    config: Config,
    hooks: H,
    game: Option<Match>,
}

impl<H: UiHooks> App<H> {
    pub fn new(
        store: Arc<dyn SharedStore>,
        env: Arc<dyn Environment>,
        config: Config,
        hooks: H,
    ) -> Self {
        Self {
            fsm: ScreenFsm::new(),
            store,
            env,
            config,
            hooks,
            game: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.fsm.screen()
    }

    pub fn game(&self) -> Option<&Match> {
        self.game.as_ref()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    fn fire(&mut self, action: ScreenAction) -> Result<(), ClientError> {
        let screen = self.fsm.screen();
        if self.fsm.fire(action) {
            Ok(())
        } else {
            Err(ClientError::InvalidTransition { screen, action })
        }
    }

    /// Start a hot-seat game on this device
    pub fn start_local(&mut self) -> Result<(), ClientError> {
        self.fire(ScreenAction::StartHotSeat)?;
        self.game = Some(Match::hot_seat(self.config.clone()));
        Ok(())
    }

    /// Rack a new hot-seat game after the last one ended
    pub fn play_again(&mut self) -> Result<(), ClientError> {
        self.fire(ScreenAction::Rematch)?;
        self.game = Some(Match::hot_seat(self.config.clone()));
        Ok(())
    }

    /// Host an online session; returns the code to share
    pub fn host(&mut self, name: &str) -> Result<String, ClientError> {
        self.fire(ScreenAction::HostSession)?;
        let mut channel = SyncChannel::new(self.store.clone(), self.env.clone());
        let code = match channel.create_session(name) {
            Ok(code) => code,
            Err(e) => {
                log::warn!("Could not create session: {e}");
                self.fsm.fire(ScreenAction::ConnectionFailed);
                return Err(e.into());
            }
        };
        self.enter_online(channel)?;
        Ok(code)
    }

    /// Join an online session by code
    pub fn join(&mut self, code: &str, name: &str) -> Result<(), ClientError> {
        self.fire(ScreenAction::JoinSession)?;
        let mut channel = SyncChannel::new(self.store.clone(), self.env.clone());
        if let Err(e) = channel.join_session(code, name) {
            log::warn!("Could not join session {code}: {e}");
            self.fsm.fire(ScreenAction::ConnectionFailed);
            return Err(e.into());
        }
        self.enter_online(channel)
    }

    fn enter_online(&mut self, channel: SyncChannel) -> Result<(), ClientError> {
        match Match::online(self.config.clone(), channel) {
            Ok(game) => {
                self.fire(ScreenAction::SessionReady)?;
                self.game = Some(game);
                Ok(())
            }
            Err(e) => {
                self.fsm.fire(ScreenAction::ConnectionFailed);
                Err(e)
            }
        }
    }

    /// Run one frame and follow the game's progress in the state machine
    pub fn frame(&mut self, dt: f32) -> Result<(), ClientError> {
        let Some(game) = self.game.as_mut() else {
            return Ok(());
        };
        let result = game.frame(dt, &mut self.hooks);

        let screen = self.fsm.screen();
        let playing = game.view().status() == SessionStatus::Playing;
        if screen == Screen::Lobby && playing && game.opponent_present() {
            self.fsm.fire(ScreenAction::OpponentArrived);
        } else if matches!(screen, Screen::Online | Screen::OnlineOver) && !game.opponent_present() {
            self.fsm.fire(ScreenAction::OpponentLeft);
        }
        if self.fsm.screen().is_in_play() && game.is_finished() {
            self.fsm.fire(ScreenAction::BoardCleared);
        }
        result
    }

    fn game_mut(&mut self) -> Result<&mut Match, ClientError> {
        self.game.as_mut().ok_or(ClientError::NoGame)
    }

    pub fn pointer_down(&mut self, point: Vec2) -> Result<(), ClientError> {
        self.game_mut()?.pointer_down(point)
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        if let Some(game) = self.game.as_mut() {
            game.pointer_move(point);
        }
    }

    pub fn pointer_up(&mut self) -> Result<(), ClientError> {
        let now_ms = self.env.now_ms();
        self.game_mut()?.pointer_up(now_ms)?;
        Ok(())
    }

    /// Dispatch a pointer event already mapped to board units
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<(), ClientError> {
        match event {
            PointerEvent::Down(point) => self.pointer_down(point),
            PointerEvent::Move(point) => {
                self.pointer_move(point);
                Ok(())
            }
            PointerEvent::Up => self.pointer_up(),
        }
    }

    pub fn reset_striker(&mut self) -> Result<(), ClientError> {
        self.game_mut()?.reset_striker()
    }

    /// Leave the current game and return to the menu
    pub fn leave(&mut self) -> Result<(), ClientError> {
        let result = match self.game.take() {
            Some(mut game) => game.leave(),
            None => Ok(()),
        };
        if !self.fsm.fire(ScreenAction::Quit) {
            self.fsm.reset();
        }
        result
    }
}
