//! Preview bundler
//!
//! Produces one self-contained markup document from a project snapshot by
//! inlining stylesheets and scripts into the first markup file. Typed
//! scripts go through [`strip_types`], so the same caveat applies here: the
//! preview of typed sources is best-effort and may not execute.

use crate::transform::strip_types;
use loom_types::{extension, File, Project};
use regex::{NoExpand, Regex};
use tracing::debug;

/// Returned when the project has no markup entry point
pub const PLACEHOLDER_DOCUMENT: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Preview</title><style>
  body { display:flex; align-items:center; justify-content:center; height:100vh; margin:0; background:#0a0a0a; color:#666; font-family:system-ui, sans-serif; }
</style></head><body><p>No HTML file in project</p></body></html>"#;

/// How the bundler treats a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Markup,
    Stylesheet,
    Script,
    /// Script that needs its type syntax stripped first
    TypedScript,
    Other,
}

impl AssetKind {
    pub fn of(path: &str) -> Self {
        match extension(path).as_deref() {
            Some("html") | Some("htm") => AssetKind::Markup,
            Some("css") => AssetKind::Stylesheet,
            Some("js") | Some("mjs") | Some("jsx") => AssetKind::Script,
            Some("ts") | Some("tsx") => AssetKind::TypedScript,
            _ => AssetKind::Other,
        }
    }
}

/// Build the preview document for `project`
pub fn build_preview(project: &Project) -> String {
    let Some(entry) = project
        .files
        .iter()
        .find(|f| AssetKind::of(&f.path) == AssetKind::Markup)
    else {
        return PLACEHOLDER_DOCUMENT.to_string();
    };

    let mut html = entry.content.clone();

    for css in files_of(project, &[AssetKind::Stylesheet]) {
        html = inline_stylesheet(html, css);
    }

    for script in files_of(project, &[AssetKind::Script, AssetKind::TypedScript]) {
        html = inline_script(html, script);
    }

    html
}

fn files_of<'a>(project: &'a Project, kinds: &'a [AssetKind]) -> impl Iterator<Item = &'a File> {
    project
        .files
        .iter()
        .filter(move |f| kinds.contains(&AssetKind::of(&f.path)))
}

fn inline_stylesheet(html: String, css: &File) -> String {
    let pattern = format!(
        r#"(?i)<link[^>]*href=["']{}["'][^>]*>"#,
        regex::escape(&css.path)
    );
    let block = format!("<style>{}</style>", css.content);

    if let Some(html) = replace_reference(&html, &pattern, &block) {
        debug!("Inlined stylesheet {} in place", css.path);
        return html;
    }

    let block = format!("<style>/* {} */\n{}</style>\n", css.path, css.content);
    insert_before(&html, &["</head>", "<body"], &block).unwrap_or_else(|| format!("{}{}", block, html))
}

fn inline_script(html: String, script: &File) -> String {
    let code = if AssetKind::of(&script.path) == AssetKind::TypedScript {
        strip_types(&script.content)
    } else {
        script.content.clone()
    };

    let pattern = format!(
        r#"(?i)<script[^>]*src=["']{}["'][^>]*>\s*</script>"#,
        regex::escape(&script.path)
    );
    let block = format!("<script>{}</script>", code);

    if let Some(html) = replace_reference(&html, &pattern, &block) {
        debug!("Inlined script {} in place", script.path);
        return html;
    }

    let block = format!("<script>/* {} */\n{}</script>\n", script.path, code);
    insert_before(&html, &["</body>", "</html>"], &block).unwrap_or_else(|| format!("{}\n{}", html, block))
}

/// Replace every reference matched by `pattern`, or `None` if there is none
fn replace_reference(html: &str, pattern: &str, block: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    if !re.is_match(html) {
        return None;
    }
    Some(re.replace_all(html, NoExpand(block)).into_owned())
}

/// Insert `block` before the first anchor found, trying anchors in order
fn insert_before(html: &str, anchors: &[&str], block: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    anchors.iter().find_map(|anchor| {
        lower.find(anchor).map(|idx| {
            let mut out = String::with_capacity(html.len() + block.len());
            out.push_str(&html[..idx]);
            out.push_str(block);
            out.push_str(&html[idx..]);
            out
        })
    })
}
