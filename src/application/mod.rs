//! Application services: page composition, the video widget and reader interactions.

pub mod blog;
pub mod chrome;
pub mod error;
pub mod guard;
pub mod interactions;
pub mod player;
pub mod render;
pub mod repos;
pub mod site;
pub mod stream;
pub mod toast;
pub mod travels;
