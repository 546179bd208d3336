//! Client-side style filtering of general posts.

use crate::domain::entities::GeneralPost;

/// Queries longer than this report an empty result to the reader.
pub const NOTICE_MIN_QUERY_CHARS: usize = 2;

/// Case-insensitive substring match over title, description and tags.
///
/// A blank query matches every post.
pub fn matches_query(post: &GeneralPost, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    post.title.to_lowercase().contains(&needle)
        || post
            .desc
            .as_deref()
            .is_some_and(|desc| desc.to_lowercase().contains(&needle))
        || post
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

pub fn filter_posts<'a>(posts: &'a [GeneralPost], query: &str) -> Vec<&'a GeneralPost> {
    posts
        .iter()
        .filter(|post| matches_query(post, query))
        .collect()
}

/// Whether an empty result for `query` deserves a "nothing found" notice.
pub fn wants_empty_notice(query: &str) -> bool {
    query.trim().chars().count() > NOTICE_MIN_QUERY_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, desc: Option<&str>, tags: &[&str]) -> GeneralPost {
        GeneralPost {
            title: title.to_string(),
            desc: desc.map(str::to_string),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            ..GeneralPost::default()
        }
    }

    #[test]
    fn matches_title_description_and_tags() {
        let posts = vec![
            post("Rust Ownership", None, &[]),
            post("Trip notes", Some("Hiking the RUSTY ridge"), &[]),
            post("Cooking", None, &["rustic"]),
            post("Gardening", Some("Tomatoes"), &["plants"]),
        ];

        let found = filter_posts(&posts, "rust");
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|post| post.title != "Gardening"));
    }

    #[test]
    fn blank_query_matches_everything() {
        let posts = vec![post("A", None, &[]), post("B", None, &[])];
        assert_eq!(filter_posts(&posts, "   ").len(), 2);
    }

    #[test]
    fn notice_only_for_queries_longer_than_two_chars() {
        assert!(!wants_empty_notice("ab"));
        assert!(wants_empty_notice("abc"));
        assert!(!wants_empty_notice("  a "));
    }
}
