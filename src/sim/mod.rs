//! Scene simulation
//!
//! Everything that changes from frame to frame lives here. Randomness comes
//! from the scene's seeded RNG only, so a seed plus an input sequence
//! replays the same frames.

pub mod frame;
pub mod picking;
pub mod pieces;
pub mod state;
pub mod tiles;
pub mod transient;
pub mod vector;

pub use frame::{DebugAction, FrameInput, FrameReport, FrameTime, SceneEvent, frame};
pub use picking::pick_and_highlight;
pub use pieces::{PieceId, PieceSet};
pub use state::{PIECE_HALF_EXTENTS, SceneState};
pub use tiles::{Tile, TileSet, TileShape, TileStyle};
pub use transient::{ExpiryReason, TransientKind, TransientObject};
pub use vector::{random_direction, random_point_outside};
