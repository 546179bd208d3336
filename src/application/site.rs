//! Process-wide site identity and whole-site operations.
//!
//! The site state is installed once at startup and lives for the rest of the
//! process; there is no teardown.

use std::{io::Write, path::Path};

use once_cell::sync::OnceCell;
use tempfile::NamedTempFile;

use crate::{
    application::{error::AppError, repos::DatasetExportRepo},
    domain::theme::Theme,
    infra::error::InfraError,
};

pub const DEFAULT_SITE_TITLE: &str = "VGWritings";
pub const DEFAULT_SITE_DESCRIPTION: &str = "Stories, lessons and travels, written down.";
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:3000/";

static SITE: OnceCell<SiteState> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
        }
    }
}

/// An outbound profile link shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
}

impl SocialLink {
    fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
        }
    }
}

/// One stop on the home page career timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerEntry {
    pub company: String,
    pub period: String,
    pub role: String,
    pub description: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SiteState {
    pub title: String,
    pub description: String,
    pub public_url: String,
    pub navigation: Vec<NavLink>,
    pub social: Vec<SocialLink>,
    pub career: Vec<CareerEntry>,
    pub default_theme: Theme,
}

impl Default for SiteState {
    fn default() -> Self {
        Self {
            title: DEFAULT_SITE_TITLE.to_string(),
            description: DEFAULT_SITE_DESCRIPTION.to_string(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            navigation: default_navigation(),
            social: default_social_links(),
            career: default_career(),
            default_theme: Theme::Light,
        }
    }
}

pub fn default_navigation() -> Vec<NavLink> {
    vec![
        NavLink::new("Home", "/"),
        NavLink::new("General", "/general"),
        NavLink::new("Learning", "/#learning"),
        NavLink::new("About", "/#about"),
    ]
}

pub fn default_social_links() -> Vec<SocialLink> {
    vec![
        SocialLink::new("LinkedIn", "https://www.linkedin.com/in/vinayak-gore-b85b7922a/"),
        SocialLink::new("GitHub", "https://github.com/TheVinayakGore"),
        SocialLink::new("Instagram", "https://www.instagram.com/vinugoredev/"),
        SocialLink::new("X", "https://x.com/vinugoredev"),
        SocialLink::new(
            "Facebook",
            "https://www.facebook.com/profile.php?id=61561190855256",
        ),
    ]
}

fn career_entry(
    company: &str,
    period: &str,
    role: &str,
    description: &str,
    highlights: [&str; 3],
) -> CareerEntry {
    CareerEntry {
        company: company.to_string(),
        period: period.to_string(),
        role: role.to_string(),
        description: description.to_string(),
        highlights: highlights.iter().map(|item| item.to_string()).collect(),
    }
}

pub fn default_career() -> Vec<CareerEntry> {
    vec![
        career_entry(
            "Alphabet Inc.",
            "2018 - 2019",
            "Frontend Developer",
            "Worked on Google Search UI improvements and performance optimization. Contributed to open-source web components library.",
            [
                "Improved page load speed by 30%",
                "Mentored 3 junior developers",
                "Won internal hackathon for accessibility features",
            ],
        ),
        career_entry(
            "Tesla Inc.",
            "2020 - 2021",
            "Senior UI Engineer",
            "Led dashboard redesign for Tesla Energy products. Implemented real-time data visualization for powerwall systems.",
            [
                "Reduced customer support queries by 40%",
                "Patented 2 visualization techniques",
                "Featured in Tesla's annual tech review",
            ],
        ),
        career_entry(
            "Amazon Inc.",
            "2004 - 2020",
            "Product Manager",
            "Managed AWS developer tools portfolio. Launched 3 major services used by millions of developers worldwide.",
            [
                "Grew revenue by 200% in 3 years",
                "Built team from 5 to 50 engineers",
                "Speaker at AWS re:Invent 2019",
            ],
        ),
        career_entry(
            "Toyota",
            "2002 - 2022",
            "CTO",
            "Transformed digital infrastructure for connected vehicles. Established AI research lab for autonomous driving.",
            [
                "Reduced cloud costs by $12M/year",
                "Led acquisition of 3 startups",
                "Featured in Forbes Tech 50",
            ],
        ),
    ]
}

/// Install the site state. Fails if it was already installed or read.
pub fn install(state: SiteState) -> Result<(), AppError> {
    SITE.set(state)
        .map_err(|_| AppError::unexpected("site state was already initialised"))
}

/// The installed site state, or the defaults when nothing was installed.
pub fn current() -> &'static SiteState {
    SITE.get_or_init(SiteState::default)
}

/// Write every readable document to `path` as a JSON array, replacing it atomically.
pub async fn export_dataset(repo: &dyn DatasetExportRepo, path: &Path) -> Result<usize, AppError> {
    let documents = repo.export_documents().await?;
    let encoded = serde_json::to_vec_pretty(&documents)
        .map_err(|err| AppError::unexpected(format!("failed to encode dataset: {err}")))?;

    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(directory).map_err(InfraError::from)?;
    file.write_all(&encoded).map_err(InfraError::from)?;
    file.persist(path)
        .map_err(|err| AppError::from(InfraError::Io(err.error)))?;

    Ok(documents.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::RepoError;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct FixedExport(Vec<Value>);

    #[async_trait]
    impl DatasetExportRepo for FixedExport {
        async fn export_documents(&self) -> Result<Vec<Value>, RepoError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn default_navigation_matches_site_sections() {
        let hrefs: Vec<_> = default_navigation()
            .into_iter()
            .map(|link| link.href)
            .collect();
        assert_eq!(hrefs, ["/", "/general", "/#learning", "/#about"]);
    }

    #[test]
    fn default_profile_links_are_absolute() {
        let links = default_social_links();
        assert_eq!(links.len(), 5);
        assert!(links.iter().all(|link| link.href.starts_with("https://")));
    }

    #[test]
    fn default_career_lists_highlights() {
        let career = default_career();
        assert_eq!(career.len(), 4);
        assert!(career.iter().all(|entry| entry.highlights.len() == 3));
    }

    #[tokio::test]
    async fn export_writes_json_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dataset.json");
        let repo = FixedExport(vec![json!({"_type": "about", "title": "Me"})]);

        let count = export_dataset(&repo, &path).await.expect("export");
        assert_eq!(count, 1);

        let written: Vec<Value> =
            serde_json::from_slice(&std::fs::read(&path).expect("read")).expect("json");
        assert_eq!(written[0]["title"], "Me");
    }
}
