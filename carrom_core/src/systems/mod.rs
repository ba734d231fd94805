pub mod collision;
pub mod forces;
pub mod movement;
pub mod pockets;
pub mod removal;
pub mod walls;

pub use collision::*;
pub use forces::*;
pub use movement::*;
pub use pockets::*;
pub use removal::*;
pub use walls::*;
