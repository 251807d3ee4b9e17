//! File operations produced by a generation round

use serde::{Deserialize, Serialize};

/// Kind of change an operation makes to the project
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Modify,
    Delete,
}

impl OperationKind {
    /// Parse a directive keyword, case-insensitively
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "create" => Some(OperationKind::Create),
            "modify" => Some(OperationKind::Modify),
            "delete" => Some(OperationKind::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Modify => "modify",
            OperationKind::Delete => "delete",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed instruction targeting one file path
///
/// `content` stays `None` until the content call for the operation has
/// completed, and is never set on a [`OperationKind::Delete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Operation {
    pub fn new(kind: OperationKind, path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            description: description.into(),
            content: None,
        }
    }

    pub fn create(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(OperationKind::Create, path, "").with_content(content)
    }

    pub fn modify(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(OperationKind::Modify, path, "").with_content(content)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(OperationKind::Delete, path, "")
    }

    /// Attach generated content; ignored for deletes
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        if self.kind != OperationKind::Delete {
            self.content = Some(content.into());
        }
        self
    }

    pub fn is_delete(&self) -> bool {
        self.kind == OperationKind::Delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword() {
        assert_eq!(OperationKind::parse("CREATE"), Some(OperationKind::Create));
        assert_eq!(OperationKind::parse(" Modify "), Some(OperationKind::Modify));
        assert_eq!(OperationKind::parse("delete"), Some(OperationKind::Delete));
        assert_eq!(OperationKind::parse("rename"), None);
    }

    #[test]
    fn test_delete_never_carries_content() {
        let op = Operation::delete("a.js").with_content("ignored");
        assert!(op.content.is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let op = Operation::create("index.html", "<html></html>");
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["kind"], "create");
        assert_eq!(value["path"], "index.html");
        assert_eq!(value["content"], "<html></html>");

        let value = serde_json::to_value(Operation::delete("x.css")).unwrap();
        assert!(value.get("content").is_none());
    }
}
