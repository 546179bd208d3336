use time::OffsetDateTime;

use crate::application::site::{CareerEntry, NavLink, SiteState, SocialLink};
use crate::domain::theme::Theme;
use crate::presentation::views::{
    BrandView, CareerEntryView, FooterView, LayoutChrome, NavigationLinkView, NavigationView,
    PageMetaView, SocialLinkView, ThemeView,
};

/// Builds the page frame shared by every full-page response.
#[derive(Clone, Copy)]
pub struct ChromeService {
    site: &'static SiteState,
}

impl ChromeService {
    pub fn new(site: &'static SiteState) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &'static SiteState {
        self.site
    }

    /// Chrome for a page served at `path`, in the reader's `theme`.
    pub fn load(&self, path: &str, theme: Theme) -> LayoutChrome {
        let entries = self
            .site
            .navigation
            .iter()
            .map(|link| map_navigation_link(link, path))
            .collect();

        LayoutChrome {
            brand: BrandView {
                title: self.site.title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView { entries },
            footer: FooterView {
                copy: footer_copy(&self.site.title, OffsetDateTime::now_utc().year()),
                social: self.site.social.iter().map(map_social_link).collect(),
            },
            meta: PageMetaView {
                title: self.site.title.clone(),
                description: self.site.description.clone(),
                site_title: self.site.title.clone(),
            },
            theme: ThemeView {
                current: theme.as_str(),
                toggle_label: theme.toggle_label(),
                toggle_href: format!("/theme/toggle?return_to={}", encode_return_path(path)),
            },
            toasts: Vec::new(),
        }
    }

    /// Career timeline cards for the home page, in configured order.
    pub fn career(&self) -> Vec<CareerEntryView> {
        self.site
            .career
            .iter()
            .enumerate()
            .map(|(index, entry)| map_career_entry(entry, index))
            .collect()
    }
}

fn map_social_link(link: &SocialLink) -> SocialLinkView {
    SocialLinkView {
        label: link.label.clone(),
        href: link.href.clone(),
    }
}

fn map_career_entry(entry: &CareerEntry, index: usize) -> CareerEntryView {
    CareerEntryView {
        company: entry.company.clone(),
        period: entry.period.clone(),
        role: entry.role.clone(),
        description: entry.description.clone(),
        highlights: entry.highlights.clone(),
        side: if index % 2 == 0 { "start" } else { "end" },
    }
}

fn map_navigation_link(link: &NavLink, path: &str) -> NavigationLinkView {
    NavigationLinkView {
        label: link.label.clone(),
        href: link.href.clone(),
        is_active: link.href == path,
    }
}

fn footer_copy(title: &str, year: i32) -> String {
    format!("© {year} {title}. All rights reserved.")
}

fn encode_return_path(path: &str) -> String {
    url::form_urlencoded::byte_serialize(path.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static SITE: Lazy<SiteState> = Lazy::new(SiteState::default);

    #[test]
    fn current_route_marks_active_link() {
        let chrome = ChromeService::new(&SITE).load("/general", Theme::Light);
        let active: Vec<_> = chrome
            .navigation
            .entries
            .iter()
            .filter(|entry| entry.is_active)
            .map(|entry| entry.label.as_str())
            .collect();
        assert_eq!(active, ["General"]);
    }

    #[test]
    fn theme_toggle_returns_to_current_page() {
        let chrome = ChromeService::new(&SITE).load("/learning/a b", Theme::Dark);
        assert_eq!(chrome.theme.current, "dark");
        assert_eq!(chrome.theme.toggle_href, "/theme/toggle?return_to=%2Flearning%2Fa+b");
    }

    #[test]
    fn footer_carries_profile_links() {
        let chrome = ChromeService::new(&SITE).load("/", Theme::Light);
        let labels: Vec<_> = chrome
            .footer
            .social
            .iter()
            .map(|link| link.label.as_str())
            .collect();
        assert_eq!(labels, ["LinkedIn", "GitHub", "Instagram", "X", "Facebook"]);
    }

    #[test]
    fn career_cards_alternate_sides() {
        let sides: Vec<_> = ChromeService::new(&SITE)
            .career()
            .iter()
            .map(|card| card.side)
            .collect();
        assert_eq!(sides, ["start", "end", "start", "end"]);
    }

    #[test]
    fn footer_names_the_site() {
        assert_eq!(
            footer_copy("VGWritings", 2026),
            "© 2026 VGWritings. All rights reserved."
        );
    }
}
