//! Markdown pages compiled into the binary.
//!
//! Each page carries YAML frontmatter with its title and dates. Pages are
//! parsed once at startup; a malformed page stops the server from booting.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use thiserror::Error;

/// Slug of the privacy policy page.
pub const PRIVACY_POLICY: &str = "privacy-policy";

/// Pages embedded at compile time, keyed by slug.
const EMBEDDED_PAGES: &[(&str, &str)] = &[(
    PRIVACY_POLICY,
    include_str!("../content/pages/privacy-policy.md"),
)];

/// Content loading errors.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to parse page {slug}: {message}")]
    Parse { slug: String, message: String },
}

/// Frontmatter for static pages.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page with metadata and HTML content.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// In-memory store of rendered pages.
#[derive(Debug, Clone)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Parse and render every embedded page.
    ///
    /// # Errors
    ///
    /// Returns an error if any page has missing or invalid frontmatter.
    pub fn embedded() -> Result<Self, ContentError> {
        Self::from_sources(EMBEDDED_PAGES)
    }

    /// Parse and render pages from `(slug, markdown)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if any page has missing or invalid frontmatter.
    pub fn from_sources(sources: &[(&str, &str)]) -> Result<Self, ContentError> {
        let mut pages = HashMap::with_capacity(sources.len());
        for (slug, source) in sources {
            let page = parse_page(slug, source)?;
            tracing::debug!(slug = %page.slug, "Loaded page");
            pages.insert(page.slug.clone(), page);
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Get a page by slug.
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }
}

fn parse_page(slug: &str, source: &str) -> Result<Page, ContentError> {
    let parse_error = |message: String| ContentError::Parse {
        slug: slug.to_string(),
        message,
    };

    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(source)
        .map_err(|e| parse_error(format!("invalid frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| parse_error("missing frontmatter".to_string()))?;

    Ok(Page {
        slug: slug.to_string(),
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown to HTML with the GitHub Flavored Markdown extensions.
///
/// Raw HTML in the source is escaped.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    markdown_to_html(content, &options)
}
