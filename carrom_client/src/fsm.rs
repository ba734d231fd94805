//! Which screen the client is on
//!
//! Menu, a hot-seat board, or one of the online session stages. The game
//! itself lives in [`crate::game::Match`]; this only decides which actions
//! make sense from where.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Menu,
    HotSeat,
    HotSeatOver,
    Connecting,
    /// Session created, no opponent yet
    Lobby,
    Online,
    OnlineOver,
    OpponentLost,
}

impl Screen {
    pub fn is_online(self) -> bool {
        matches!(
            self,
            Screen::Connecting | Screen::Lobby | Screen::Online | Screen::OnlineOver
        )
    }

    /// A board is in play and input goes to it
    pub fn is_in_play(self) -> bool {
        matches!(self, Screen::HotSeat | Screen::Online)
    }

    pub fn is_over(self) -> bool {
        matches!(self, Screen::HotSeatOver | Screen::OnlineOver)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    StartHotSeat,
    Rematch,
    HostSession,
    JoinSession,
    SessionReady,
    ConnectionFailed,
    OpponentArrived,
    OpponentLeft,
    BoardCleared,
    Quit,
}

/// Where `action` leads from `screen`, if it is allowed there
fn next(screen: Screen, action: ScreenAction) -> Option<Screen> {
    use Screen::*;
    use ScreenAction::*;

    let to = match action {
        StartHotSeat if screen == Menu => HotSeat,
        Rematch if screen == HotSeatOver => HotSeat,
        HostSession | JoinSession if screen == Menu => Connecting,
        SessionReady if screen == Connecting => Lobby,
        ConnectionFailed if screen == Connecting => Menu,
        OpponentArrived if screen == Lobby => Online,
        OpponentLeft if matches!(screen, Online | OnlineOver) => OpponentLost,
        BoardCleared if screen == HotSeat => HotSeatOver,
        BoardCleared if screen == Online => OnlineOver,
        Quit if screen != Menu && screen != Connecting => Menu,
        _ => return None,
    };
    Some(to)
}

#[derive(Debug, Clone, Default)]
pub struct ScreenFsm {
    screen: Screen,
}

impl ScreenFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn allows(&self, action: ScreenAction) -> bool {
        next(self.screen, action).is_some()
    }

    /// Move to the next screen; false (and no change) if `action` is not
    /// allowed here
    pub fn fire(&mut self, action: ScreenAction) -> bool {
        match next(self.screen, action) {
            Some(to) => {
                log::debug!("Screen {:?} -> {to:?} on {action:?}", self.screen);
                self.screen = to;
                true
            }
            None => {
                log::trace!("Ignoring {action:?} on {:?}", self.screen);
                false
            }
        }
    }

    /// Back to the menu from anywhere
    pub fn reset(&mut self) {
        self.screen = Screen::Menu;
    }
}
