//! Content records decoded from the content store.
//!
//! Every field is optional on the wire: projections return `null` for unset
//! fields, so strings and arrays collapse to their empty value on decode.

use serde::{Deserialize, Deserializer, Serialize};
use time::{
    Date, OffsetDateTime,
    format_description::{FormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::domain::assets::ImageRef;
use crate::domain::portable_text::{PortableBlock, lenient_vec};

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
const CALENDAR_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SlugField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralPost {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: SlugField,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<ImageRef>,
    #[serde(default)]
    pub reading_time: Option<f64>,
    #[serde(default, deserialize_with = "count")]
    pub comments: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub views: Option<u64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub content: Vec<PortableBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPost {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub reading_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: SlugField,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub key_moments_data: Vec<KeyMoment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub content: Vec<PortableBlock>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub stats: Option<PostStats>,
    #[serde(default)]
    pub cover: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PostStats {
    #[serde(default, deserialize_with = "count")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub views: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct KeyMoment {
    #[serde(rename = "_key", default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutRecord {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub content: Vec<PortableBlock>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    #[serde(default)]
    pub first_btn: Option<String>,
    #[serde(default)]
    pub second_btn: Option<String>,
}

impl GeneralPost {
    pub fn slug(&self) -> &str {
        &self.slug.current
    }

    pub fn published_on(&self) -> Option<Date> {
        self.date.as_deref().and_then(parse_content_date)
    }
}

impl LearningPost {
    pub fn slug(&self) -> &str {
        &self.slug.current
    }

    pub fn published_on(&self) -> Option<Date> {
        self.date.as_deref().and_then(parse_content_date)
    }
}

/// Parse either a `date` (`2024-05-01`) or `datetime` (RFC 3339) field.
pub fn parse_content_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    OffsetDateTime::parse(raw, &Rfc3339)
        .map(|moment| moment.date())
        .or_else(|_| Date::parse(raw, CALENDAR_DATE_FORMAT))
        .ok()
}

pub fn format_human_date(date: Date) -> String {
    date.format(HUMAN_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Treat an explicit `null` the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counters are stored as JSON numbers which may carry a fractional part.
fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .filter(|value| value.is_finite())
        .map(|value| value.max(0.0).round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn general_post_tolerates_nulls() {
        let post: GeneralPost = serde_json::from_value(json!({
            "_id": "g1",
            "title": "Hello",
            "slug": {"current": "hello"},
            "tags": null,
            "likes": 12.0,
            "comments": null,
            "content": null
        }))
        .expect("post decodes");

        assert_eq!(post.slug(), "hello");
        assert!(post.tags.is_empty());
        assert_eq!(post.likes, Some(12));
        assert_eq!(post.comments, None);
        assert!(post.content.is_empty());
    }

    #[test]
    fn content_dates_accept_both_shapes() {
        assert_eq!(parse_content_date("2024-05-01"), Some(date!(2024 - 05 - 01)));
        assert_eq!(
            parse_content_date("2024-05-01T10:30:00Z"),
            Some(date!(2024 - 05 - 01))
        );
        assert_eq!(parse_content_date("yesterday"), None);
    }

    #[test]
    fn human_date_is_long_form() {
        assert_eq!(format_human_date(date!(2024 - 05 - 01)), "May 1, 2024");
    }
}
