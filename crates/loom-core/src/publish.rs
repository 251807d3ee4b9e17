//! Publish hand-off
//!
//! Validates metadata, renders the preview document with that metadata
//! injected, and passes the result to a [`PublishSink`]. Where and how the
//! sink stores it is not our concern.

use crate::error::{LoomError, Result};
use crate::preview::build_preview;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loom_types::{File, Project, PublishMetadata};
use once_cell::sync::Lazy;
use regex::{Captures, NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::info;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9-]").expect("slug regex is valid"));
static DASHES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("dash regex is valid"));

static HEAD_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("head regex is valid"));
static HTML_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<html[^>]*>").expect("html regex is valid"));
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title>.*?</title>").expect("title regex is valid"));
static DESCRIPTION_META_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s[^>]*name=["']description["'][^>]*>"#).expect("description regex is valid")
});
static ICON_LINK_RE: Lazy<Regex> =
    Lazy::new(|| {
    Regex::new(r#"(?i)<link\s[^>]*rel=["'](?:shortcut\s+)?icon["'][^>]*>"#).expect("icon regex is valid")
});
static OG_IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s[^>]*property=["']og:image["'][^>]*>"#).expect("og:image regex is valid")
});

const EMPTY_DOCUMENT: &str = "<!DOCTYPE html><html><head></head><body></body></html>";

/// Payload handed to the publish collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub metadata: PublishMetadata,
    pub html: String,
    pub files: Vec<File>,
    pub published_at: DateTime<Utc>,
}

/// Where the published project can be reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub slug: String,
    pub url: String,
}

/// Opaque storage collaborator
#[async_trait]
pub trait PublishSink: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt>;
}

/// Lowercase, map anything outside `[a-z0-9-]` to `-`, collapse and trim dashes
pub fn normalize_slug(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let replaced = NON_SLUG_RE.replace_all(&lowered, "-");
    let collapsed = DASHES_RE.replace_all(&replaced, "-");
    collapsed.trim_matches('-').to_string()
}

/// Normalise and check publish metadata
pub fn validate_metadata(metadata: &PublishMetadata) -> Result<PublishMetadata> {
    let title = metadata.title.trim();
    if metadata.slug.trim().is_empty() || title.is_empty() {
        return Err(LoomError::Validation("slug and title are required".to_string()));
    }

    let slug = normalize_slug(&metadata.slug);
    if slug.chars().count() < 2 {
        return Err(LoomError::Validation(
            "slug must be at least 2 characters".to_string(),
        ));
    }

    Ok(PublishMetadata {
        slug,
        title: title.to_string(),
        ..metadata.clone()
    })
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Replace the first tag matched by `re`, or insert `tag` right after the opening head tag
fn set_head_tag(html: String, re: &Regex, tag: &str) -> String {
    if re.is_match(&html) {
        re.replace(&html, NoExpand(tag)).into_owned()
    } else {
        HEAD_OPEN_RE
            .replace(&html, |caps: &Captures| format!("{}{}", &caps[0], tag))
            .into_owned()
    }
}

/// Write title, description, favicon and preview image into `html`
pub fn inject_metadata(html: &str, metadata: &PublishMetadata) -> String {
    let mut result = if html.trim().is_empty() {
        EMPTY_DOCUMENT.to_string()
    } else {
        html.to_string()
    };

    if !HEAD_OPEN_RE.is_match(&result) {
        result = if HTML_OPEN_RE.is_match(&result) {
            HTML_OPEN_RE.replace(&result, "${0}<head></head>").into_owned()
        } else {
            format!("<head></head>{}", result)
        };
    }

    if !metadata.title.is_empty() {
        let tag = format!("<title>{}</title>", escape_attr(&metadata.title));
        result = set_head_tag(result, &TITLE_RE, &tag);
    }

    if let Some(description) = metadata.description.as_deref().filter(|d| !d.is_empty()) {
        let tag = format!(r#"<meta name="description" content="{}" />"#, escape_attr(description));
        result = set_head_tag(result, &DESCRIPTION_META_RE, &tag);
    }

    if let Some(favicon) = metadata.favicon.as_deref().filter(|f| !f.is_empty()) {
        let tag = format!(r#"<link rel="icon" href="{}" />"#, escape_attr(favicon));
        result = set_head_tag(result, &ICON_LINK_RE, &tag);
    }

    if let Some(image) = metadata.image.as_deref().filter(|i| !i.is_empty()) {
        let tag = format!(r#"<meta property="og:image" content="{}" />"#, escape_attr(image));
        result = set_head_tag(result, &OG_IMAGE_RE, &tag);
    }

    result
}

/// Build the publish payload for a project snapshot
pub fn prepare_publish(project: &Project, metadata: &PublishMetadata) -> Result<PublishRequest> {
    let metadata = validate_metadata(metadata)?;
    let html = inject_metadata(&build_preview(project), &metadata);
    Ok(PublishRequest {
        metadata,
        html,
        files: project.files.clone(),
        published_at: Utc::now(),
    })
}

/// Validate, render and hand the project to `sink`
pub async fn publish_project(
    sink: &dyn PublishSink,
    project: &Project,
    metadata: &PublishMetadata,
) -> Result<PublishReceipt> {
    let request = prepare_publish(project, metadata)?;
    let receipt = sink.publish(&request).await?;
    info!("Published {} to {}", receipt.slug, receipt.url);
    Ok(receipt)
}
