//! Reader interactions that only acknowledge: reactions, sharing and forms.

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::toast::Toast;
use crate::domain::error::DomainError;
use crate::domain::forms::{ContactMessage, NewsletterSignup};
use crate::domain::reactions::ReactionState;
use crate::infra::telemetry::METRIC_FORM_SUBMISSION_TOTAL;

const SOURCE: &str = "application::interactions";

pub const LINK_COPIED: &str = "Link copied!";
pub const LINK_COPY_FAILED: &str = "Failed to copy the link.";
pub const SUBSCRIBED: &str = "Thank you for subscribing!";
pub const CONTACT_RECEIVED: &str = "Thank you for contacting us. We'll get back to you soon.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ClipboardError(pub String);

/// Somewhere text can be copied for the reader.
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

pub fn toggle_like(state: ReactionState) -> (ReactionState, Toast) {
    let next = state.toggle_like();
    let toast = Toast::success(next.like_message());
    (next, toast)
}

pub fn toggle_bookmark(state: ReactionState) -> (ReactionState, Toast) {
    let next = state.toggle_bookmark();
    let toast = Toast::success(next.bookmark_message());
    (next, toast)
}

/// Copy `url` and report the outcome to the reader.
pub fn share_link(clipboard: &dyn ClipboardWriter, url: &str) -> Toast {
    match clipboard.write_text(url) {
        Ok(()) => Toast::success(LINK_COPIED),
        Err(err) => {
            warn!(target = SOURCE, url, error = %err, "clipboard write failed");
            Toast::error(LINK_COPY_FAILED).with_description(err.to_string())
        }
    }
}

pub fn subscribe(email: &str) -> Result<(NewsletterSignup, Toast), DomainError> {
    let signup = NewsletterSignup::parse(email)?;
    info!(
        target = SOURCE,
        email_domain = email_domain(&signup.email),
        "newsletter signup accepted"
    );
    counter!(METRIC_FORM_SUBMISSION_TOTAL, "form" => "newsletter").increment(1);
    Ok((signup, Toast::success(SUBSCRIBED)))
}

pub fn send_contact(name: &str, email: &str, message: &str) -> Result<Toast, DomainError> {
    let contact = ContactMessage::parse(name, email, message)?;
    info!(
        target = SOURCE,
        email_domain = email_domain(&contact.email),
        message_chars = contact.message.chars().count(),
        "contact message received"
    );
    counter!(METRIC_FORM_SUBMISSION_TOTAL, "form" => "contact").increment(1);
    Ok(Toast::success(CONTACT_RECEIVED))
}

fn email_domain(email: &str) -> &str {
    email.rsplit_once('@').map_or("", |(_, domain)| domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::toast::ToastKind;

    struct Clipboard(Result<(), ClipboardError>);

    impl ClipboardWriter for Clipboard {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            self.0.clone()
        }
    }

    #[test]
    fn like_toggle_announces_change() {
        let (liked, toast) = toggle_like(ReactionState::new(42));
        assert_eq!(liked.likes, 43);
        assert_eq!(toast.title, "Liked post");

        let (unliked, toast) = toggle_like(liked);
        assert_eq!(unliked.likes, 42);
        assert_eq!(toast.title, "Removed like");
    }

    #[test]
    fn bookmark_toggle_announces_change() {
        let (saved, toast) = toggle_bookmark(ReactionState::default());
        assert_eq!(saved.bookmark_label(), "Saved");
        assert_eq!(toast.title, "Added to bookmarks");
    }

    #[test]
    fn share_reports_clipboard_outcome() {
        let toast = share_link(&Clipboard(Ok(())), "https://blog.example/a");
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.title, LINK_COPIED);

        let toast = share_link(
            &Clipboard(Err(ClipboardError("permission denied".into()))),
            "https://blog.example/a",
        );
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title, LINK_COPY_FAILED);
        assert_eq!(toast.description.as_deref(), Some("permission denied"));
    }

    #[test]
    fn forms_validate_before_acknowledging() {
        let (signup, toast) = subscribe(" reader@example.com ").expect("valid");
        assert_eq!(signup.email, "reader@example.com");
        assert_eq!(toast.title, SUBSCRIBED);

        let err = subscribe("not-an-email").expect_err("invalid");
        assert_eq!(err.field(), Some("email"));

        let err = send_contact("Ana", "ana@example.com", "  ").expect_err("missing");
        assert_eq!(err.field(), Some("message"));

        let toast = send_contact("Ana", "ana@example.com", "Hi!").expect("valid");
        assert_eq!(toast.title, CONTACT_RECEIVED);
    }
}
