use serde::{Deserialize, Serialize};

/// Metadata captured by the crawler for a single page.
///
/// All fields are optional: the crawler records whatever the page
/// exposed, and the report renders only what is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Analytics tracker version detected on the page, e.g. `UA-1`.
    #[serde(default, rename = "gaVersion")]
    pub ga_version: Option<String>,
}

/// One crawled page: its URL and the metadata collected for it.
///
/// `loc` always includes an `http`/`https` scheme and may carry a
/// trailing slash; both are stripped when matching against screenshot
/// paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub loc: String,
    #[serde(default)]
    pub meta: PageMeta,
}

/// The crawler's record of all pages for the current run.
///
/// Ordered as crawled; read-only once loaded and shared by every
/// per-viewport assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteManifest {
    pub pages: Vec<PageRecord>,
}

impl SiteManifest {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }
}
