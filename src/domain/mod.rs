//! Domain layer types and invariants.

pub mod assets;
pub mod entities;
pub mod error;
pub mod forms;
pub mod player;
pub mod portable_text;
pub mod reactions;
pub mod search;
pub mod slug;
pub mod theme;
pub mod toc;
pub mod travels;
