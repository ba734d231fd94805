//! Carrom client
//!
//! Glue between pointer input, the deterministic simulation in
//! `carrom_core` and the replicated session in `session_sync`. Rendering and
//! audio live behind [`UiHooks`].

pub mod app;
pub mod error;
pub mod fsm;
pub mod game;
pub mod input;
pub mod network;
pub mod sim;
pub mod state;

pub use app::App;
pub use error::ClientError;
pub use fsm::{Screen, ScreenAction, ScreenFsm};
pub use game::{Match, NoopHooks, UiHooks};
pub use input::{PointerEvent, Viewport};
pub use network::Inbox;
pub use state::{SessionChange, SessionView};
