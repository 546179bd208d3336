//! Like and bookmark toggles for a post.
//!
//! Reactions are per visitor and are not persisted. The page carries the
//! current state and each toggle returns the next one.

use serde::Deserialize;

/// Like count shown for learning posts that carry no stats.
pub const DEFAULT_LEARNING_LIKES: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ReactionState {
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub bookmarked: bool,
}

impl ReactionState {
    pub fn new(likes: u64) -> Self {
        Self {
            liked: false,
            likes,
            bookmarked: false,
        }
    }

    /// Flip the like flag, adjusting the count by one in either direction.
    pub fn toggle_like(self) -> Self {
        if self.liked {
            Self {
                liked: false,
                likes: self.likes.saturating_sub(1),
                ..self
            }
        } else {
            Self {
                liked: true,
                likes: self.likes.saturating_add(1),
                ..self
            }
        }
    }

    pub fn toggle_bookmark(self) -> Self {
        Self {
            bookmarked: !self.bookmarked,
            ..self
        }
    }

    pub fn like_message(&self) -> &'static str {
        if self.liked { "Liked post" } else { "Removed like" }
    }

    pub fn bookmark_message(&self) -> &'static str {
        if self.bookmarked {
            "Added to bookmarks"
        } else {
            "Removed from bookmarks"
        }
    }

    pub fn bookmark_label(&self) -> &'static str {
        if self.bookmarked { "Saved" } else { "Save" }
    }
}
