//! Fixed GROQ queries issued against the content store.
//!
//! Detail and general projections dereference video files and posters so the
//! renderer receives playable URLs instead of bare asset references.

pub const LEARNING_POSTS: &str = r#"*[_type == "learning"]{_id, title, category, date, readingTime, slug, tags, summary} | order(date desc)"#;

pub const LEARNING_POST_BY_SLUG: &str = r#"*[_type == "learning" && slug.current == $slug][0]{_id, title, category, date, readingTime, slug, tags, keyMomentsData, highlights, content[]{..., file{asset->{url}}, poster{asset->{url}}}, summary, stats, cover}"#;

pub const GENERAL_POSTS: &str = r#"*[_type == "general"]{_id, title, slug, date, desc, tags, coverImage, readingTime, comments, likes, views, category, content[]{..., file{asset->{url}}, poster{asset->{url}}}} | order(date desc)"#;

pub const GENERAL_POST_BY_SLUG: &str = r#"*[_type == "general" && slug.current == $slug][0]{_id, title, slug, date, desc, tags, coverImage, readingTime, comments, likes, views, category, content[]{..., file{asset->{url}}, poster{asset->{url}}}}"#;

pub const RELATED_GENERAL_POSTS: &str = r#"*[_type == "general" && category == $category && slug.current != $slug] | order(date desc) [0...6]{_id, title, slug, date, desc, tags, coverImage, readingTime, category}"#;

pub const ABOUT: &str = r#"*[_type == "about"]{_id, title, image, content, features, firstBtn, secondBtn}"#;

pub const EXPORT_DOCUMENTS: &str = r#"*[_type in ["general", "learning", "about"]]{..., content[]{..., file{asset->{url}}, poster{asset->{url}}}}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::RELATED_POSTS_LIMIT;

    #[test]
    fn related_query_slice_matches_limit() {
        assert!(RELATED_GENERAL_POSTS.contains(&format!("[0...{RELATED_POSTS_LIMIT}]")));
    }

    #[test]
    fn detail_queries_take_a_slug_parameter() {
        for query in [LEARNING_POST_BY_SLUG, GENERAL_POST_BY_SLUG] {
            assert!(query.contains("slug.current == $slug"));
            assert!(query.contains("file{asset->{url}}"));
        }
    }
}
