//! Resource bank index parsing, on-demand loading/decompression, and the
//! game-part table (spec §4.4).

pub mod descriptor;
pub mod directory;
pub mod game_part;

pub use descriptor::{Descriptor, ResourceKind};
pub use directory::LoadedResources;
pub use game_part::GamePart;
