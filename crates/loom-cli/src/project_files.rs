//! Moving projects between memory and disk

use anyhow::{Context, Result};
use loom_types::{File, Project};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Directories never read into a project
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "dist", ".git"];

/// Map a project path onto a relative filesystem path
///
/// Project paths come from model output, so anything absolute or climbing
/// out of the export directory is refused.
pub fn safe_relative_path(path: &str) -> Option<PathBuf> {
    let candidate = Path::new(path.trim());
    if candidate.as_os_str().is_empty() {
        return None;
    }

    let mut out = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!out.as_os_str().is_empty()).then_some(out)
}

/// Read every UTF-8 file under `dir` as a project file, sorted by path
pub fn read_project_dir(dir: &Path) -> Result<Vec<File>> {
    let mut files = Vec::new();
    collect(dir, dir, &mut files)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Read {} files from {:?}", files.len(), dir);
    Ok(files)
}

fn collect(root: &Path, dir: &Path, files: &mut Vec<File>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if entry.file_type()?.is_dir() {
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
                continue;
            }
            collect(root, &path, files)?;
            continue;
        }

        let Ok(content) = std::fs::read_to_string(&path) else {
            debug!("Skipping non-text file {:?}", path);
            continue;
        };
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let project_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(File::new(project_path, content));
    }
    Ok(())
}

/// Write the project's files under `dir`, returning how many were written
pub fn write_project(dir: &Path, project: &Project) -> Result<usize> {
    let mut written = 0;
    for file in &project.files {
        let Some(relative) = safe_relative_path(&file.path) else {
            warn!("Refusing to export unsafe path {:?}", file.path);
            continue;
        };
        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        std::fs::write(&target, &file.content)
            .with_context(|| format!("Failed to write {:?}", target))?;
        written += 1;
    }
    Ok(written)
}

/// Write a document, creating parent directories
pub fn write_document(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    std::fs::write(path, html).with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(safe_relative_path("src/app.ts"), Some(PathBuf::from("src/app.ts")));
        assert_eq!(safe_relative_path("./index.html"), Some(PathBuf::from("index.html")));
        assert_eq!(safe_relative_path("../etc/passwd"), None);
        assert_eq!(safe_relative_path("a/../../b"), None);
        assert_eq!(safe_relative_path("/abs/path"), None);
        assert_eq!(safe_relative_path("   "), None);
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project {
            files: vec![
                File::new("index.html", "<html></html>"),
                File::new("src/app.ts", "let a: A = 1;"),
                File::new("../escape.js", "nope"),
            ],
            ..Project::default()
        };

        let written = write_project(dir.path(), &project).unwrap();
        assert_eq!(written, 2);
        assert!(!dir.path().parent().unwrap().join("escape.js").exists());

        let files = read_project_dir(dir.path()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["index.html", "src/app.ts"]);
        assert_eq!(files[1].content, "let a: A = 1;");
    }

    #[test]
    fn test_read_skips_hidden_and_vendor_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref").unwrap();
        std::fs::write(dir.path().join("style.css"), "p{}").unwrap();
        std::fs::write(dir.path().join("logo.png"), [0xffu8, 0xfe, 0x00, 0x80]).unwrap();

        let files = read_project_dir(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "style.css");
    }

    #[test]
    fn test_write_document_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out/preview.html");
        write_document(&out, "<p>x</p>").unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "<p>x</p>");
    }
}
