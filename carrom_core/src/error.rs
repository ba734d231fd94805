use hecs::Entity;

/// Errors raised by [`crate::PhysicsWorld`] body operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhysicsError {
    #[error("unknown body {0:?}")]
    UnknownBody(Entity),
    #[error("body {0:?} has been captured")]
    Captured(Entity),
    #[error("no striker on the board")]
    NoStriker,
}
