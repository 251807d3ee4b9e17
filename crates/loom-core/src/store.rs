//! Virtual project store
//!
//! Owns the authoritative file set plus tab/selection state. Every method is
//! total: unknown paths are no-ops, nothing panics, and the project
//! invariants hold after each call returns.

use loom_types::{File, Operation, OperationKind, Project};
use tracing::debug;

/// In-memory project with editor state
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    project: Project,
}

impl ProjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from existing files; nothing is opened
    pub fn from_files(files: impl IntoIterator<Item = File>) -> Self {
        let mut store = Self::new();
        for file in files {
            store.remove_file(&file.path);
            store.project.files.push(file);
        }
        store
    }

    /// Apply operations strictly in order
    ///
    /// A `Modify` on a path with no file behaves like a `Create`. Empty or
    /// absent content on a `Modify` keeps the previous content.
    pub fn apply_operations(&mut self, ops: &[Operation]) {
        for op in ops {
            match op.kind {
                OperationKind::Create => {
                    self.remove_file(&op.path);
                    let content = op.content.clone().unwrap_or_default();
                    self.project.files.push(File::new(op.path.clone(), content));
                    self.focus(&op.path);
                }
                OperationKind::Modify => {
                    let new_content = op.content.as_deref().filter(|c| !c.is_empty());
                    match self.project.files.iter_mut().find(|f| f.path == op.path) {
                        Some(file) => {
                            if let Some(content) = new_content {
                                *file = file.with_content(content);
                            }
                        }
                        None => {
                            debug!("Modify on missing path {}, creating it", op.path);
                            self.project
                                .files
                                .push(File::new(op.path.clone(), new_content.unwrap_or_default()));
                        }
                    }
                    self.focus(&op.path);
                }
                OperationKind::Delete => {
                    if !self.remove_file(&op.path) {
                        debug!("Delete on missing path {}", op.path);
                    }
                    self.drop_tab(&op.path);
                }
            }
            debug!("Applied {} {}", op.kind, op.path);
        }
        debug_assert!(self.project.is_consistent());
    }

    /// Open a known file in a tab and make it active
    pub fn open_file(&mut self, path: &str) {
        if self.project.contains(path) {
            self.focus(path);
        }
    }

    /// Close a tab, falling back to the last remaining tab
    pub fn close_tab(&mut self, path: &str) {
        self.drop_tab(path);
    }

    /// Manual edit: replaces content only, tabs and selection are untouched
    pub fn update_file_content(&mut self, path: &str, content: &str) {
        if let Some(file) = self.project.files.iter_mut().find(|f| f.path == path) {
            *file = file.with_content(content);
        }
    }

    /// Read-only copy of the current project
    pub fn snapshot(&self) -> Project {
        self.project.clone()
    }

    /// Borrow the current project
    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn file(&self, path: &str) -> Option<&File> {
        self.project.file(path)
    }

    pub fn active_file(&self) -> Option<&File> {
        self.project.active()
    }

    /// Drop all files and editor state
    pub fn reset(&mut self) {
        self.project = Project::default();
    }

    fn remove_file(&mut self, path: &str) -> bool {
        let before = self.project.files.len();
        self.project.files.retain(|f| f.path != path);
        self.project.files.len() != before
    }

    fn focus(&mut self, path: &str) {
        if !self.project.open_tabs.iter().any(|t| t == path) {
            self.project.open_tabs.push(path.to_string());
        }
        self.project.active_file = Some(path.to_string());
    }

    fn drop_tab(&mut self, path: &str) {
        self.project.open_tabs.retain(|t| t != path);
        if self.project.active_file.as_deref() == Some(path) {
            self.project.active_file = self.project.open_tabs.last().cloned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tabs(store: &ProjectStore) -> Vec<&str> {
        store.project().open_tabs.iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn test_create_then_modify_same_path() {
        let mut store = ProjectStore::new();
        store.apply_operations(&[Operation::create("a.js", "x"), Operation::modify("a.js", "y")]);

        let project = store.snapshot();
        assert_eq!(project.files.len(), 1);
        assert_eq!(project.files[0].path, "a.js");
        assert_eq!(project.files[0].content, "y");
        assert_eq!(project.open_tabs, vec!["a.js".to_string()]);
        assert_eq!(project.active_file.as_deref(), Some("a.js"));
    }

    #[test]
    fn test_delete_falls_back_to_last_tab() {
        let mut store = ProjectStore::new();
        store.apply_operations(&[Operation::create("a.js", "1"), Operation::create("b.js", "2")]);
        assert_eq!(tabs(&store), vec!["a.js", "b.js"]);
        assert_eq!(store.project().active_file.as_deref(), Some("b.js"));

        store.apply_operations(&[Operation::delete("b.js")]);
        assert_eq!(tabs(&store), vec!["a.js"]);
        assert_eq!(store.project().active_file.as_deref(), Some("a.js"));

        store.apply_operations(&[Operation::delete("a.js")]);
        assert!(store.project().open_tabs.is_empty());
        assert_eq!(store.project().active_file, None);
        assert!(store.project().files.is_empty());
    }

    #[test]
    fn test_delete_missing_path_is_noop() {
        let mut store = ProjectStore::new();
        store.apply_operations(&[Operation::delete("missing.js")]);
        assert_eq!(store.snapshot(), Project::default());
    }

    #[test]
    fn test_modify_missing_path_creates_file() {
        let mut store = ProjectStore::new();
        store.apply_operations(&[Operation::modify("missing.js", "z")]);

        let project = store.snapshot();
        assert_eq!(project.files.len(), 1);
        assert_eq!(project.files[0].content, "z");
        assert_eq!(project.active_file.as_deref(), Some("missing.js"));
        assert!(project.is_consistent());
    }

    #[test]
    fn test_modify_without_content_keeps_previous() {
        let mut store = ProjectStore::new();
        store.apply_operations(&[Operation::create("a.css", "body {}")]);
        store.apply_operations(&[
            Operation::new(OperationKind::Modify, "a.css", "no content yet"),
            Operation::modify("a.css", ""),
        ]);
        assert_eq!(store.file("a.css").map(|f| f.content.as_str()), Some("body {}"));
    }

    #[test]
    fn test_recreate_moves_file_to_end() {
        let mut store = ProjectStore::new();
        store.apply_operations(&[
            Operation::create("a.css", "1"),
            Operation::create("b.css", "2"),
            Operation::create("a.css", "3"),
        ]);
        let paths: Vec<_> = store.project().paths().collect();
        assert_eq!(paths, vec!["b.css", "a.css"]);
        assert_eq!(tabs(&store), vec!["a.css", "b.css"]);
        assert_eq!(store.active_file().map(|f| f.content.as_str()), Some("3"));
    }

    #[test]
    fn test_open_file_ignores_unknown_paths() {
        let mut store = ProjectStore::from_files(vec![File::new("a.js", ""), File::new("b.js", "")]);
        store.open_file("nope.js");
        assert!(store.project().open_tabs.is_empty());

        store.open_file("b.js");
        store.open_file("a.js");
        store.open_file("b.js");
        assert_eq!(tabs(&store), vec!["b.js", "a.js"]);
        assert_eq!(store.project().active_file.as_deref(), Some("b.js"));
    }

    #[test]
    fn test_close_tab() {
        let mut store = ProjectStore::from_files(vec![
            File::new("a.js", ""),
            File::new("b.js", ""),
            File::new("c.js", ""),
        ]);
        store.open_file("a.js");
        store.open_file("b.js");
        store.open_file("c.js");

        store.close_tab("a.js");
        assert_eq!(store.project().active_file.as_deref(), Some("c.js"));

        store.close_tab("c.js");
        assert_eq!(store.project().active_file.as_deref(), Some("b.js"));

        store.close_tab("unknown.js");
        assert_eq!(tabs(&store), vec!["b.js"]);

        store.close_tab("b.js");
        assert_eq!(store.project().active_file, None);
        assert_eq!(store.project().files.len(), 3);
    }

    #[test]
    fn test_update_file_content_leaves_tabs_alone() {
        let mut store = ProjectStore::from_files(vec![File::new("a.js", "old"), File::new("b.js", "")]);
        store.open_file("b.js");

        store.update_file_content("a.js", "new");
        store.update_file_content("ghost.js", "boo");

        assert_eq!(store.file("a.js").map(|f| f.content.as_str()), Some("new"));
        assert!(store.file("ghost.js").is_none());
        assert_eq!(tabs(&store), vec!["b.js"]);
        assert_eq!(store.project().active_file.as_deref(), Some("b.js"));
    }

    #[test]
    fn test_reset() {
        let mut store = ProjectStore::new();
        store.apply_operations(&[Operation::create("index.html", "<html></html>")]);
        store.reset();
        assert!(store.project().is_empty());
        assert_eq!(store.project().active_file, None);
    }
}
