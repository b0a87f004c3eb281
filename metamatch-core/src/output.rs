//! Deterministic placement of generated CSS files.
//!
//! Every record lands at `<base>/<root id>/<id>_<name>.css`, with `:` in the
//! root id replaced by `_` and id and name passed through
//! [`sanitize_identifier`]. Existing files are overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::css::{generate_css_file_content, sanitize_identifier};
use crate::error::WriteError;
use crate::flatten::StyleRecord;

/// Directory name for a root: `:` becomes `_`, everything else is kept.
pub fn sanitize_root_id(root_id: &str) -> String {
    root_id.replace(':', "_")
}

pub fn generate_file_name(id: &str, name: &str) -> String {
    format!("{}_{}.css", sanitize_identifier(id), sanitize_identifier(name))
}

pub fn generate_file_path(root_id: &str, id: &str, name: &str, base_dir: &Path) -> PathBuf {
    base_dir
        .join(sanitize_root_id(root_id))
        .join(generate_file_name(id, name))
}

/// Creates `dir` and any missing parents; succeeds if it already exists.
pub fn ensure_directory_exists(dir: &Path) -> Result<(), WriteError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| {
        error!(error = ?source, path = %dir.display(), "Failed to create directory");
        WriteError {
            path: dir.to_path_buf(),
            source,
        }
    })?;
    debug!(path = %dir.display(), "Created directory");
    Ok(())
}

/// Writes `content` to `path`, creating the parent directory first.
pub fn write_css_file(path: &Path, content: &str) -> Result<(), WriteError> {
    if let Some(parent) = path.parent() {
        ensure_directory_exists(parent)?;
    }
    fs::write(path, content).map_err(|source| {
        error!(error = ?source, path = %path.display(), "Failed to write CSS file");
        WriteError {
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote CSS file");
    Ok(())
}

pub fn create_css_file(record: &StyleRecord<'_>, base_dir: &Path) -> Result<PathBuf, WriteError> {
    let path = generate_file_path(record.root_id, record.id, record.name, base_dir);
    let content = generate_css_file_content(record.id, record.name, record.styles);
    write_css_file(&path, &content)?;
    Ok(path)
}

/// Writes one file per record, in order. Stops at the first failure; files
/// written before it stay on disk.
pub fn create_css_files(
    records: &[StyleRecord<'_>],
    base_dir: &Path,
) -> Result<Vec<PathBuf>, WriteError> {
    let mut written = Vec::with_capacity(records.len());
    for record in records {
        written.push(create_css_file(record, base_dir)?);
    }
    info!(
        count = written.len(),
        base_dir = %base_dir.display(),
        "Generated CSS files"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use serde_json::json;
    use tempfile::tempdir;

    fn record<'a>(
        id: &'a str,
        name: &'a str,
        root_id: &'a str,
        styles: &'a Node,
    ) -> StyleRecord<'a> {
        StyleRecord {
            id,
            name,
            root_id,
            styles,
        }
    }

    #[test]
    fn file_path_is_deterministic() {
        let path = generate_file_path("1:2", "1:3", "Child", Path::new("css"));
        assert_eq!(path, Path::new("css").join("1_2").join("1_3_Child.css"));
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(generate_file_name("I1:2;3:4", "Icon/Close 24"), "I1_2_3_4_Icon_Close_24.css");
        assert_eq!(sanitize_root_id("12:34"), "12_34");
    }

    #[test]
    fn ensure_directory_exists_is_idempotent() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_directory_exists(&nested).unwrap();
        ensure_directory_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn write_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("1_2");
        fs::write(&blocker, "not a directory").unwrap();
        let err = write_css_file(&blocker.join("x.css"), "body {}").unwrap_err();
        assert_eq!(err.path, blocker);
    }

    #[test]
    fn create_css_files_writes_one_file_per_record_and_overwrites() {
        let dir = tempdir().unwrap();
        let root: Node =
            serde_json::from_value(json!({"id": "1:2", "name": "Root", "opacity": 0.5})).unwrap();
        let child: Node = serde_json::from_value(json!({"id": "1:3", "name": "Child"})).unwrap();
        let records = [
            record("1:2", "Root", "1:2", &root),
            record("1:3", "Child", "1:2", &child),
        ];

        let stale = dir.path().join("1_2").join("1_3_Child.css");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "stale").unwrap();

        let written = create_css_files(&records, dir.path()).unwrap();
        assert_eq!(written, [dir.path().join("1_2").join("1_2_Root.css"), stale.clone()]);

        let root_css = fs::read_to_string(&written[0]).unwrap();
        assert!(root_css.contains(".figma-1_2_Root_class {\n  opacity: 0.5;\n}\n"));
        let child_css = fs::read_to_string(&stale).unwrap();
        assert!(child_css.ends_with(".figma-1_3_Child_class {\n}\n"));
    }

    #[test]
    fn same_name_with_different_ids_gets_distinct_paths() {
        let first = generate_file_path("1:2", "1:3", "Card", Path::new("css"));
        let second = generate_file_path("1:2", "1:4", "Card", Path::new("css"));
        assert_ne!(first, second);
        assert_eq!(first.parent(), second.parent());

        let dir = tempdir().unwrap();
        let node = Node::default();
        let records = [
            record("1:3", "Card", "1:2", &node),
            record("1:4", "Card", "1:2", &node),
        ];
        let written = create_css_files(&records, dir.path()).unwrap();
        assert!(written.iter().all(|p| p.is_file()));
        assert_eq!(fs::read_dir(dir.path().join("1_2")).unwrap().count(), 2);
    }

    #[test]
    fn batch_stops_at_first_failure_and_keeps_earlier_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("2_1"), "not a directory").unwrap();
        let node = Node::default();
        let records = [
            record("1:1", "First", "1:1", &node),
            record("2:2", "Second", "2:1", &node),
            record("3:3", "Third", "3:1", &node),
        ];

        let err = create_css_files(&records, dir.path()).unwrap_err();
        assert_eq!(err.path, dir.path().join("2_1"));
        assert!(dir.path().join("1_1").join("1_1_First.css").is_file());
        assert!(!dir.path().join("3_1").exists());
    }
}
