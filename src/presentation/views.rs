use crate::application::error::{ErrorReport, HttpError};
use crate::application::player::VideoWidget;
use crate::application::toast::Toast;
use crate::domain::player::{
    PlaybackState, SETTINGS_LABEL, SUBTITLES_LABEL, format_time,
};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

/// Render a fragment for a datastar patch.
pub fn render_fragment<T: Template>(
    template: T,
    source: &'static str,
) -> Result<String, TemplateRenderError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new(source, "Template rendering failed", err))
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
    pub social: Vec<SocialLinkView>,
}

#[derive(Clone)]
pub struct SocialLinkView {
    pub label: String,
    pub href: String,
}

/// A career timeline card; cards alternate sides down the timeline.
pub struct CareerEntryView {
    pub company: String,
    pub period: String,
    pub role: String,
    pub description: String,
    pub highlights: Vec<String>,
    pub side: &'static str,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct ThemeView {
    pub current: &'static str,
    pub toggle_label: &'static str,
    pub toggle_href: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub theme: ThemeView,
    pub toasts: Vec<ToastView>,
}

impl LayoutChrome {
    pub fn with_title(self, title: &str) -> Self {
        Self {
            meta: self.meta.with_title(title),
            ..self
        }
    }

    pub fn with_toasts(mut self, toasts: Vec<Toast>) -> Self {
        self.toasts.extend(toasts.iter().map(ToastView::from));
        self
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub theme: ThemeView,
    pub toasts: Vec<ToastView>,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            theme: chrome.theme,
            toasts: chrome.toasts,
            content,
        }
    }
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub site_title: String,
}

impl PageMetaView {
    pub fn with_title(self, title: &str) -> Self {
        Self {
            title: format!("{title} | {}", self.site_title),
            ..self
        }
    }
}

#[derive(Clone)]
pub struct ToastView {
    pub id: String,
    pub variant: &'static str,
    pub title: String,
    pub description: Option<String>,
    pub ttl_ms: u128,
}

impl From<&Toast> for ToastView {
    fn from(toast: &Toast) -> Self {
        Self {
            id: toast.id.to_string(),
            variant: toast.kind.as_variant(),
            title: toast.title.clone(),
            description: toast.description.clone(),
            ttl_ms: toast.ttl.as_millis(),
        }
    }
}

#[derive(Template)]
#[template(path = "partials/toast_stack.html")]
pub struct ToastStackTemplate {
    pub toasts: Vec<ToastView>,
}

#[derive(Clone)]
pub struct TagBadge {
    pub value: String,
    pub label: String,
}

#[derive(Clone)]
pub struct PostCard {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub iso_date: String,
    pub published: String,
    pub badges: Vec<TagBadge>,
    pub category: Option<String>,
    pub cover_url: Option<String>,
    pub reading_time: Option<String>,
}

pub struct AboutView {
    pub title: String,
    pub image_url: Option<String>,
    pub body_html: String,
    pub features: Vec<String>,
    pub first_button: Option<String>,
    pub second_button: Option<String>,
}

pub struct HomeContext {
    pub learning: Vec<PostCard>,
    pub learning_failed: bool,
    pub trips: Vec<TripCardView>,
    pub has_more_trips: bool,
    pub about: Vec<AboutView>,
    pub career: Vec<CareerEntryView>,
    pub newsletter: NewsletterView,
    pub contact: ContactView,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<HomeContext>,
}

pub struct GeneralResultsView {
    pub query: String,
    pub posts: Vec<PostCard>,
    pub total_count: usize,
    pub has_results: bool,
}

pub struct GeneralIndexContext {
    pub results: GeneralResultsView,
}

#[derive(Template)]
#[template(path = "general.html")]
pub struct GeneralTemplate {
    pub view: LayoutContext<GeneralIndexContext>,
}

#[derive(Template)]
#[template(path = "partials/general_results.html")]
pub struct GeneralResultsPartial {
    pub results: GeneralResultsView,
}

pub struct LearningIndexContext {
    pub posts: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "learning.html")]
pub struct LearningTemplate {
    pub view: LayoutContext<LearningIndexContext>,
}

#[derive(Clone)]
pub struct TocEntryView {
    pub id: String,
    pub text: String,
    pub level: u8,
}

pub struct KeyMomentView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct ReactionsView {
    pub slug: String,
    pub liked: bool,
    pub likes: u64,
    pub bookmarked: bool,
    pub bookmark_label: &'static str,
}

#[derive(Template)]
#[template(path = "partials/reactions.html")]
pub struct ReactionsTemplate {
    pub view: ReactionsView,
}

#[derive(Clone)]
pub struct ShareView {
    pub url: String,
    pub title: String,
}

pub struct PostDetailContext {
    pub section: &'static str,
    pub slug: String,
    pub title: String,
    pub published: String,
    pub iso_date: String,
    pub badges: Vec<TagBadge>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub reading_time: Option<String>,
    pub comments: Option<u64>,
    pub views: Option<u64>,
    pub cover_url: Option<String>,
    pub body_html: String,
    pub has_code: bool,
    pub has_video: bool,
    pub toc: Vec<TocEntryView>,
    pub key_moments: Vec<KeyMomentView>,
    pub highlights: Vec<String>,
    pub related: Vec<PostCard>,
    pub reactions: ReactionsView,
    pub share: ShareView,
    pub newsletter: NewsletterView,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

#[derive(Clone, Default)]
pub struct NewsletterView {
    pub email: String,
    pub error: Option<String>,
    pub subscribed: bool,
}

#[derive(Template)]
#[template(path = "partials/newsletter.html")]
pub struct NewsletterTemplate {
    pub view: NewsletterView,
}

#[derive(Clone, Default)]
pub struct ContactView {
    pub name: String,
    pub email: String,
    pub message: String,
    pub error_field: Option<&'static str>,
    pub error: Option<String>,
    pub sent: bool,
}

#[derive(Template)]
#[template(path = "partials/contact.html")]
pub struct ContactTemplate {
    pub view: ContactView,
}

#[derive(Clone)]
pub struct TripCardView {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub cover_url: Option<String>,
    pub highlights: Vec<String>,
    pub read_time: String,
    pub travelers: u32,
    pub days: u32,
    pub landmarks: usize,
}

pub struct TripsView {
    pub trips: Vec<TripCardView>,
    pub shown: usize,
    pub total: usize,
    pub next_shown: Option<usize>,
}

pub struct TravelsContext {
    pub listing: TripsView,
}

#[derive(Template)]
#[template(path = "travels.html")]
pub struct TravelsTemplate {
    pub view: LayoutContext<TravelsContext>,
}

#[derive(Template)]
#[template(path = "partials/trips.html")]
pub struct TripsPartial {
    pub listing: TripsView,
}

/// Initial markup of one video player, derived from a widget state snapshot.
pub struct VideoPlayerView {
    pub id: String,
    pub src: String,
    pub poster: Option<String>,
    pub playing: bool,
    pub muted: bool,
    pub volume: String,
    pub progress_percent: String,
    pub buffered_percent: String,
    pub current_time: String,
    pub duration: String,
    pub controls_visible: bool,
    pub show_initial_play: bool,
    pub play_label: &'static str,
    pub mute_label: &'static str,
    pub fullscreen_label: &'static str,
    pub subtitles_label: &'static str,
    pub settings_label: &'static str,
}

impl VideoPlayerView {
    pub fn from_widget(key: &str, widget: &VideoWidget) -> Self {
        Self::from_state(
            key,
            widget.src().to_string(),
            widget.poster().map(str::to_string),
            &widget.snapshot(),
        )
    }

    pub fn from_state(
        key: &str,
        src: String,
        poster: Option<String>,
        state: &PlaybackState,
    ) -> Self {
        let id = if key.is_empty() {
            "video-player".to_string()
        } else {
            format!("video-{key}")
        };
        Self {
            id,
            src,
            poster,
            playing: state.is_playing(),
            muted: state.muted,
            volume: format!("{}", state.volume),
            progress_percent: format!("{:.2}", state.progress() * 100.0),
            buffered_percent: format!("{:.2}", state.buffered_fraction() * 100.0),
            current_time: format_time(state.current_time),
            duration: format_time(state.duration),
            controls_visible: state.controls_visible,
            show_initial_play: state.initial_play_visible,
            play_label: state.play_label(),
            mute_label: state.mute_label(),
            fullscreen_label: state.fullscreen_label(),
            subtitles_label: SUBTITLES_LABEL,
            settings_label: SETTINGS_LABEL,
        }
    }
}

#[derive(Template)]
#[template(path = "partials/video_player.html")]
pub struct VideoPlayerTemplate {
    pub view: VideoPlayerView,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Post not found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

pub fn build_tag_badges<'a, T>(tags: T) -> Vec<TagBadge>
where
    T: IntoIterator<Item = &'a String>,
{
    tags.into_iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| TagBadge {
            value: crate::domain::slug::category_token(tag),
            label: format!("#{tag}"),
        })
        .collect()
}

pub fn title_case(tag: &str) -> String {
    if tag.eq_ignore_ascii_case("ai") {
        return "AI".to_string();
    }

    let mut words = Vec::new();
    for segment in tag.split(['-', '_', ' ']) {
        if segment.is_empty() {
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            let mut word = String::new();
            word.extend(first.to_uppercase());
            for ch in chars {
                word.extend(ch.to_lowercase());
            }
            words.push(word);
        }
    }

    if words.is_empty() {
        tag.to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_player_view_matches_initial_state() {
        let view = VideoPlayerView::from_state(
            "clip",
            "https://cdn.example/a.mp4".into(),
            None,
            &PlaybackState::new(),
        );
        assert_eq!(view.id, "video-clip");
        assert_eq!(view.current_time, "0:00");
        assert_eq!(view.progress_percent, "0.00");
        assert_eq!(view.play_label, "Play (k)");
        assert!(view.show_initial_play);
    }

    #[test]
    fn muted_player_keeps_stored_volume_on_the_slider() {
        let mut state = PlaybackState::new();
        state.set_volume(0.8);
        state.toggle_mute();
        let view = VideoPlayerView::from_state("clip", "a.mp4".into(), None, &state);
        assert!(view.muted);
        assert_eq!(view.volume, "0.8");
    }

    #[test]
    fn title_case_handles_separators() {
        assert_eq!(title_case("web-dev"), "Web Dev");
        assert_eq!(title_case("ai"), "AI");
    }

    #[test]
    fn badges_skip_blank_tags() {
        let tags = vec!["Rust".to_string(), " ".to_string()];
        let badges = build_tag_badges(&tags);
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].label, "#Rust");
        assert_eq!(badges[0].value, "rust");
    }
}
