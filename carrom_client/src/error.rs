use carrom_core::{GestureRejection, PhysicsError};
use session_sync::SyncError;
use thiserror::Error;

use crate::fsm::{Screen, ScreenAction};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Gesture(#[from] GestureRejection),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error("cannot {action:?} from the {screen:?} screen")]
    InvalidTransition { screen: Screen, action: ScreenAction },
    #[error("no game in progress")]
    NoGame,
}
