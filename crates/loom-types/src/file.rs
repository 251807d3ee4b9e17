//! Project files and their language tags

use serde::{Deserialize, Serialize};

/// Language tag derived from a file's extension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Html,
    Css,
    Json,
    Markdown,
    Python,
    Xml,
    Text,
}

impl Language {
    /// Derive the language from a forward-slash path
    pub fn from_path(path: &str) -> Self {
        match extension(path).as_deref() {
            Some("ts") | Some("tsx") => Language::TypeScript,
            Some("js") | Some("jsx") | Some("mjs") => Language::JavaScript,
            Some("html") | Some("htm") => Language::Html,
            Some("css") => Language::Css,
            Some("json") => Language::Json,
            Some("md") => Language::Markdown,
            Some("py") => Language::Python,
            Some("svg") => Language::Xml,
            _ => Language::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Html => "html",
            Language::Css => "css",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Python => "python",
            Language::Xml => "xml",
            Language::Text => "text",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lowercased extension of the last path segment, if any
pub fn extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() && !name[1..].contains('.') {
        // dotfiles such as ".env" have no extension
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// A single file snapshot in the virtual project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: String,
    pub content: String,
    pub language: Language,
}

impl File {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let language = Language::from_path(&path);
        Self {
            path,
            content: content.into(),
            language,
        }
    }

    /// Same path and language, new content
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            path: self.path.clone(),
            content: content.into(),
            language: self.language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path("src/App.tsx"), Language::TypeScript);
        assert_eq!(Language::from_path("app.js"), Language::JavaScript);
        assert_eq!(Language::from_path("INDEX.HTML"), Language::Html);
        assert_eq!(Language::from_path("styles/site.css"), Language::Css);
        assert_eq!(Language::from_path("logo.svg"), Language::Xml);
        assert_eq!(Language::from_path("Makefile"), Language::Text);
        assert_eq!(Language::from_path(".env"), Language::Text);
        assert_eq!(Language::from_path("dir.d/readme"), Language::Text);
    }

    #[test]
    fn test_language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::TypeScript).unwrap();
        assert_eq!(json, "\"typescript\"");
    }

    #[test]
    fn test_with_content_keeps_identity() {
        let file = File::new("a.css", "body {}");
        let next = file.with_content("p {}");
        assert_eq!(next.path, "a.css");
        assert_eq!(next.language, Language::Css);
        assert_eq!(next.content, "p {}");
    }
}
