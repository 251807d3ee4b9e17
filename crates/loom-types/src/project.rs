//! Project snapshot: file set plus editor tab state

use crate::file::File;
use serde::{Deserialize, Serialize};

/// Ordered, path-unique file set with open tabs and the active selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub files: Vec<File>,
    #[serde(default)]
    pub open_tabs: Vec<String>,
    #[serde(default)]
    pub active_file: Option<String>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a file by exact path
    pub fn file(&self, path: &str) -> Option<&File> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.file(path).is_some()
    }

    /// Paths in project order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    /// The file behind the active tab, if any
    pub fn active(&self) -> Option<&File> {
        self.active_file.as_deref().and_then(|p| self.file(p))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check the structural invariants:
    /// paths are unique, tabs are unique and name existing files, and the
    /// active file is one of the tabs.
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        if !self.files.iter().all(|f| seen.insert(f.path.as_str())) {
            return false;
        }

        let mut tabs = std::collections::HashSet::new();
        for tab in &self.open_tabs {
            if !tabs.insert(tab.as_str()) || !seen.contains(tab.as_str()) {
                return false;
            }
        }

        match &self.active_file {
            Some(active) => tabs.contains(active.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_checks() {
        let mut project = Project::new();
        assert!(project.is_consistent());

        project.files.push(File::new("a.js", "x"));
        project.open_tabs.push("a.js".to_string());
        project.active_file = Some("a.js".to_string());
        assert!(project.is_consistent());
        assert_eq!(project.active().map(|f| f.content.as_str()), Some("x"));

        project.active_file = Some("b.js".to_string());
        assert!(!project.is_consistent());

        project.active_file = None;
        project.open_tabs.push("a.js".to_string());
        assert!(!project.is_consistent());
    }
}
