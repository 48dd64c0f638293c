// Shared domain types, used by both the API layer and the renderers.

pub mod common;
pub mod issue;
pub mod project;
pub mod team;

pub use common::*;
pub use issue::*;
pub use project::*;
pub use team::*;
