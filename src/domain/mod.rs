//! Domain values - pure rules independent of the commit graph

pub mod branch;
pub mod commit;
pub mod merge_message;
pub mod tag;
pub mod version;

pub use branch::Branch;
pub use commit::{Commit, IncrementDirectives, ParsedCommit};
pub use merge_message::MergeMessage;
pub use tag::{Tag, TagPrefix};
pub use version::{IncrementStrategy, Version};
