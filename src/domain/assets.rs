//! Image and file references as stored by the content store.
//!
//! Documents either carry a projected `asset.url` (detail queries dereference
//! video files and posters) or a bare `asset._ref` such as
//! `image-<id>-<w>x<h>-<ext>`. [`AssetResolver`] turns both shapes into CDN
//! URLs for the configured project and dataset.

use serde::{Deserialize, Serialize};

const CDN_HOST: &str = "https://cdn.sanity.io";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AssetRef {
    #[serde(rename = "_ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FileRef {
    #[serde(default)]
    pub asset: Option<AssetRef>,
}

#[derive(Debug, Clone, Copy)]
enum AssetKind {
    Image,
    File,
}

#[derive(Debug, Clone, Default)]
pub struct AssetResolver {
    project_id: Option<String>,
    dataset: String,
}

impl AssetResolver {
    pub fn new(project_id: Option<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id,
            dataset: dataset.into(),
        }
    }

    pub fn image_url(&self, image: &ImageRef) -> Option<String> {
        self.resolve(image.asset.as_ref()?, AssetKind::Image)
    }

    pub fn file_url(&self, file: &FileRef) -> Option<String> {
        self.resolve(file.asset.as_ref()?, AssetKind::File)
    }

    /// Resolve a bare asset reference, as found on inline image blocks.
    pub fn asset_url(&self, asset: &AssetRef) -> Option<String> {
        self.resolve(asset, AssetKind::Image)
    }

    fn resolve(&self, asset: &AssetRef, kind: AssetKind) -> Option<String> {
        if let Some(url) = asset.url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
            return Some(url.to_string());
        }

        let reference = asset.reference.as_deref()?;
        let project = self.project_id.as_deref()?;

        match kind {
            AssetKind::Image => {
                let rest = reference.strip_prefix("image-")?;
                let (rest, extension) = rest.rsplit_once('-')?;
                let (id, dimensions) = rest.rsplit_once('-')?;
                Some(format!(
                    "{CDN_HOST}/images/{project}/{}/{id}-{dimensions}.{extension}",
                    self.dataset
                ))
            }
            AssetKind::File => {
                let rest = reference.strip_prefix("file-")?;
                let (id, extension) = rest.rsplit_once('-')?;
                Some(format!(
                    "{CDN_HOST}/files/{project}/{}/{id}.{extension}",
                    self.dataset
                ))
            }
        }
    }
}
