use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::application::render::{ContentRenderer, RenderedContent};
use crate::application::repos::{AboutRepo, GeneralPostsRepo, LearningPostsRepo, RepoError};
use crate::application::toast::Toast;
use crate::domain::entities::{AboutRecord, GeneralPost, LearningPost, format_human_date};
use crate::domain::portable_text::KeyMomentBlock;
use crate::domain::reactions::{DEFAULT_LEARNING_LIKES, ReactionState};
use crate::domain::search::{filter_posts, wants_empty_notice};
use crate::domain::slug::{SlugError, anchor_for, validate_route_slug};
use crate::domain::toc::extract_toc;
use crate::presentation::views::{
    AboutView, GeneralResultsView, KeyMomentView, NewsletterView, PostCard, PostDetailContext,
    ReactionsView, ShareView, TocEntryView, build_tag_badges,
};

const SOURCE: &str = "application::blog::BlogService";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid slug: {0}")]
    InvalidSlug(#[from] SlugError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A value that loaded, possibly in degraded form, with notices for the reader.
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub toasts: Vec<Toast>,
}

impl<T> Loaded<T> {
    fn ok(value: T) -> Self {
        Self {
            value,
            toasts: Vec::new(),
        }
    }

    fn degraded(value: T, toast: Toast) -> Self {
        Self {
            value,
            toasts: vec![toast],
        }
    }
}

#[derive(Clone)]
pub struct BlogService {
    general: Arc<dyn GeneralPostsRepo>,
    learning: Arc<dyn LearningPostsRepo>,
    about: Arc<dyn AboutRepo>,
    renderer: ContentRenderer,
    public_url: String,
}

impl BlogService {
    pub fn new(
        general: Arc<dyn GeneralPostsRepo>,
        learning: Arc<dyn LearningPostsRepo>,
        about: Arc<dyn AboutRepo>,
        renderer: ContentRenderer,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            general,
            learning,
            about,
            renderer,
            public_url: public_url.into(),
        }
    }

    pub async fn learning_cards(&self) -> Loaded<Vec<PostCard>> {
        match self.learning.list_learning_posts().await {
            Ok(posts) => Loaded::ok(
                posts
                    .iter()
                    .map(|post| learning_card(post, &self.renderer))
                    .collect(),
            ),
            Err(err) => {
                warn!(target = SOURCE, error = %err, "failed to list learning posts");
                Loaded::degraded(Vec::new(), Toast::fetch_failed("learning posts"))
            }
        }
    }

    pub async fn about_sections(&self) -> Loaded<Vec<AboutView>> {
        match self.about.list_about().await {
            Ok(records) => Loaded::ok(
                records
                    .iter()
                    .map(|record| self.about_view(record))
                    .collect(),
            ),
            Err(err) => {
                warn!(target = SOURCE, error = %err, "failed to list about content");
                Loaded::degraded(Vec::new(), Toast::fetch_failed("about content"))
            }
        }
    }

    /// General posts matching `query`, newest first.
    pub async fn general_results(&self, query: &str) -> Loaded<GeneralResultsView> {
        let query = query.trim();
        let posts = match self.general.list_general_posts().await {
            Ok(posts) => posts,
            Err(err) => {
                warn!(target = SOURCE, error = %err, "failed to list general posts");
                return Loaded::degraded(
                    general_results_view(query, &[], 0),
                    Toast::fetch_failed("blogs"),
                );
            }
        };

        let matches = filter_posts(&posts, query);
        let cards: Vec<PostCard> = matches
            .iter()
            .map(|post| general_card(post, &self.renderer))
            .collect();
        let view = general_results_view(query, &cards, posts.len());

        if cards.is_empty() && wants_empty_notice(query) {
            Loaded::degraded(view, Toast::no_search_results(query))
        } else {
            Loaded::ok(view)
        }
    }

    pub async fn general_detail(
        &self,
        slug: &str,
    ) -> Result<Option<PostDetailContext>, ContentError> {
        let slug = validate_route_slug(slug)?;
        let Some(post) = self.general.find_general_post(slug).await? else {
            return Ok(None);
        };

        let related = match post.category.as_deref() {
            Some(category) => self
                .general
                .list_related_posts(category, post.slug())
                .await
                .unwrap_or_else(|err| {
                    warn!(
                        target = SOURCE,
                        slug = %post.slug(),
                        error = %err,
                        "failed to list related posts"
                    );
                    Vec::new()
                }),
            None => Vec::new(),
        };

        Ok(Some(self.general_context(post, &related)))
    }

    pub async fn learning_detail(
        &self,
        slug: &str,
    ) -> Result<Option<PostDetailContext>, ContentError> {
        let slug = validate_route_slug(slug)?;
        let Some(post) = self.learning.find_learning_post(slug).await? else {
            return Ok(None);
        };
        Ok(Some(self.learning_context(post)))
    }

    fn general_context(&self, post: GeneralPost, related: &[GeneralPost]) -> PostDetailContext {
        let rendered = self.renderer.render(&post.content);
        let key_moments = key_moment_views(&rendered.key_moments, &self.renderer);
        let (published, iso_date) = display_dates(post.published_on(), post.date.as_deref());

        PostDetailContext {
            section: "general",
            slug: post.slug().to_string(),
            title: post.title.clone(),
            published,
            iso_date,
            badges: build_tag_badges(&post.tags),
            excerpt: post.desc.clone(),
            category: post.category.clone(),
            reading_time: post.reading_time.map(format_reading_minutes),
            comments: post.comments,
            views: post.views,
            cover_url: post
                .cover_image
                .as_ref()
                .and_then(|image| self.renderer.assets().image_url(image)),
            toc: toc_view(&post.content),
            key_moments,
            highlights: Vec::new(),
            related: related
                .iter()
                .map(|item| general_card(item, &self.renderer))
                .collect(),
            reactions: reactions_view(post.slug(), ReactionState::new(post.likes.unwrap_or(0))),
            share: self.share_view("general", post.slug(), &post.title),
            newsletter: NewsletterView::default(),
            body_html: rendered.html,
            has_code: rendered.has_code,
            has_video: rendered.has_video,
        }
    }

    fn learning_context(&self, post: LearningPost) -> PostDetailContext {
        let RenderedContent {
            html,
            has_code,
            has_video,
            key_moments: inline_moments,
        } = self.renderer.render(&post.content);

        let moments: Vec<KeyMomentBlock> = if post.key_moments_data.is_empty() {
            inline_moments
        } else {
            post.key_moments_data
                .iter()
                .map(|moment| KeyMomentBlock {
                    key: moment.key.clone(),
                    title: moment.title.clone(),
                    description: moment.description.clone(),
                    image: moment.image.clone(),
                })
                .collect()
        };

        let likes = post
            .stats
            .as_ref()
            .and_then(|stats| stats.likes)
            .unwrap_or(DEFAULT_LEARNING_LIKES);
        let (published, iso_date) = display_dates(post.published_on(), post.date.as_deref());

        PostDetailContext {
            section: "learning",
            slug: post.slug().to_string(),
            title: post.title.clone(),
            published,
            iso_date,
            badges: build_tag_badges(&post.tags),
            excerpt: post.summary.clone(),
            category: post.category.clone(),
            reading_time: post.reading_time.clone(),
            comments: None,
            views: post.stats.as_ref().and_then(|stats| stats.views),
            cover_url: post
                .cover
                .as_ref()
                .and_then(|image| self.renderer.assets().image_url(image)),
            body_html: html,
            has_code,
            has_video,
            toc: toc_view(&post.content),
            key_moments: key_moment_views(&moments, &self.renderer),
            highlights: post.highlights.clone(),
            related: Vec::new(),
            reactions: reactions_view(post.slug(), ReactionState::new(likes)),
            share: self.share_view("learning", post.slug(), &post.title),
            newsletter: NewsletterView::default(),
        }
    }

    fn about_view(&self, record: &AboutRecord) -> AboutView {
        AboutView {
            title: record.title.clone(),
            image_url: record
                .image
                .as_ref()
                .and_then(|image| self.renderer.assets().image_url(image)),
            body_html: self.renderer.render(&record.content).html,
            features: record.features.clone(),
            first_button: record.first_btn.clone(),
            second_button: record.second_btn.clone(),
        }
    }

    fn share_view(&self, section: &str, slug: &str, title: &str) -> ShareView {
        ShareView {
            url: format!("{}/{section}/{slug}", self.public_url.trim_end_matches('/')),
            title: title.to_string(),
        }
    }
}

pub fn reactions_view(slug: &str, state: ReactionState) -> ReactionsView {
    ReactionsView {
        slug: slug.to_string(),
        liked: state.liked,
        likes: state.likes,
        bookmarked: state.bookmarked,
        bookmark_label: state.bookmark_label(),
    }
}

fn general_results_view(query: &str, cards: &[PostCard], total: usize) -> GeneralResultsView {
    GeneralResultsView {
        query: query.to_string(),
        posts: cards.to_vec(),
        total_count: total,
        has_results: !cards.is_empty(),
    }
}

fn general_card(post: &GeneralPost, renderer: &ContentRenderer) -> PostCard {
    let (published, iso_date) = display_dates(post.published_on(), post.date.as_deref());
    PostCard {
        href: format!("/general/{}", post.slug()),
        title: post.title.clone(),
        excerpt: post.desc.clone().unwrap_or_default(),
        iso_date,
        published,
        badges: build_tag_badges(&post.tags),
        category: post.category.clone(),
        cover_url: post
            .cover_image
            .as_ref()
            .and_then(|image| renderer.assets().image_url(image)),
        reading_time: post.reading_time.map(format_reading_minutes),
    }
}

fn learning_card(post: &LearningPost, renderer: &ContentRenderer) -> PostCard {
    let (published, iso_date) = display_dates(post.published_on(), post.date.as_deref());
    PostCard {
        href: format!("/learning/{}", post.slug()),
        title: post.title.clone(),
        excerpt: post.summary.clone().unwrap_or_default(),
        iso_date,
        published,
        badges: build_tag_badges(&post.tags),
        category: post.category.clone(),
        cover_url: post
            .cover
            .as_ref()
            .and_then(|image| renderer.assets().image_url(image)),
        reading_time: post.reading_time.clone(),
    }
}

fn display_dates(date: Option<time::Date>, raw: Option<&str>) -> (String, String) {
    match date {
        Some(date) => (format_human_date(date), date.to_string()),
        None => (raw.unwrap_or_default().to_string(), String::new()),
    }
}

fn format_reading_minutes(minutes: f64) -> String {
    format!("{} min read", minutes.max(0.0).round())
}

fn toc_view(content: &[crate::domain::portable_text::PortableBlock]) -> Vec<TocEntryView> {
    extract_toc(content)
        .into_iter()
        .map(|item| TocEntryView {
            id: item.id,
            text: item.text,
            level: item.level,
        })
        .collect()
}

fn key_moment_views(moments: &[KeyMomentBlock], renderer: &ContentRenderer) -> Vec<KeyMomentView> {
    moments
        .iter()
        .enumerate()
        .map(|(index, moment)| KeyMomentView {
            id: anchor_for(&moment.title, "moment", index),
            title: moment.title.clone(),
            description: moment.description.clone(),
            image_url: moment
                .image
                .as_ref()
                .and_then(|image| renderer.assets().image_url(image)),
        })
        .collect()
}
