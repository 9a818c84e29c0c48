//! Markdown document persistence
//!
//! Documents are written under a single output directory. Filenames derived
//! from library names are sanitized, `.md` is appended when missing, and an
//! existing file can be copied to a timestamped backup before it is replaced.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Default output directory for generated documents
pub const DEFAULT_OUTPUT_DIR: &str = "./docs";

/// Extension every saved document carries
pub const DOCUMENT_EXTENSION: &str = ".md";

/// Name used when sanitization leaves nothing behind
pub const DEFAULT_DOCUMENT_NAME: &str = "document";

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static ILLEGAL_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid filename regex"));
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid hyphen regex"));

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create backup of {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Document path {} is outside the output directory", .path.display())]
    OutsideOutputDir { path: PathBuf },

    #[error("Failed to save document {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes generated documents to the configured output directory
#[derive(Debug, Clone)]
pub struct DocumentStore {
    output_dir: PathBuf,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl DocumentStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Turns an arbitrary library name into a safe file stem
    ///
    /// Spaces and slashes become hyphens, characters illegal in filenames are
    /// dropped, hyphen runs collapse to one and outer hyphens are trimmed. The
    /// result is never empty.
    ///
    /// ```
    /// use gitguide_mcp::services::DocumentStore;
    ///
    /// assert_eq!(DocumentStore::sanitize_filename("owner/repo"), "owner-repo");
    /// assert_eq!(DocumentStore::sanitize_filename("name<>:"), "name");
    /// assert_eq!(DocumentStore::sanitize_filename(""), "document");
    /// ```
    pub fn sanitize_filename(name: &str) -> String {
        let replaced = name.replace([' ', '/'], "-");
        let stripped = ILLEGAL_FILENAME_CHARS.replace_all(&replaced, "");
        let collapsed = HYPHEN_RUNS.replace_all(&stripped, "-");
        let trimmed = collapsed.trim_matches('-');

        if trimmed.is_empty() {
            DEFAULT_DOCUMENT_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Whether `filename` resolves to a location under the output directory
    ///
    /// Absolute paths, drive prefixes and `..` segments are rejected.
    pub fn is_contained(filename: &Path) -> bool {
        filename
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
    }

    /// Document filename for a library identifier such as `owner/repo`
    pub fn filename_for(library_name: &str) -> String {
        format!(
            "{}{}",
            Self::sanitize_filename(library_name),
            DOCUMENT_EXTENSION
        )
    }

    /// Saves `content` as `filename` under the output directory
    ///
    /// When `backup_existing` is set and the target already exists, it is first
    /// copied to `<target>.backup_<YYYYMMDD_HHMMSS>`. The content is written to
    /// a temporary sibling and renamed into place, so the target is never left
    /// half written.
    ///
    /// # Returns
    ///
    /// The path that was written, `output_dir` joined with the final filename.
    pub fn save(
        &self,
        filename: &str,
        content: &str,
        backup_existing: bool,
    ) -> Result<PathBuf, DocumentError> {
        if !Self::is_contained(Path::new(filename)) {
            return Err(DocumentError::OutsideOutputDir {
                path: PathBuf::from(filename),
            });
        }

        ensure_directory(&self.output_dir)?;

        let filename = if filename.is_empty() {
            DEFAULT_DOCUMENT_NAME
        } else {
            filename
        };
        let filename = if filename.ends_with(DOCUMENT_EXTENSION) {
            filename.to_string()
        } else {
            format!("{}{}", filename, DOCUMENT_EXTENSION)
        };

        let filepath = self.output_dir.join(filename);
        if let Some(parent) = filepath.parent() {
            ensure_directory(parent)?;
        }

        if backup_existing && filepath.exists() {
            let backup = backup_existing_file(&filepath)?;
            tracing::info!("Backed up {} to {}", filepath.display(), backup.display());
        }

        write_atomically(&filepath, content)?;
        tracing::info!("Saved document {}", filepath.display());

        Ok(filepath)
    }
}

/// Backup path for `path` at the given timestamp suffix
pub fn backup_path_for(path: &Path, timestamp: &str) -> PathBuf {
    let mut backup = path.as_os_str().to_os_string();
    backup.push(format!(".backup_{}", timestamp));
    PathBuf::from(backup)
}

fn ensure_directory(dir: &Path) -> Result<(), DocumentError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| DocumentError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

fn backup_existing_file(path: &Path) -> Result<PathBuf, DocumentError> {
    let timestamp = chrono::Local::now()
        .format(BACKUP_TIMESTAMP_FORMAT)
        .to_string();
    let backup = backup_path_for(path, &timestamp);

    fs::copy(path, &backup).map_err(|source| DocumentError::Backup {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(backup)
}

fn write_atomically(path: &Path, content: &str) -> Result<(), DocumentError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let result = fs::write(&temp_path, content).and_then(|_| fs::rename(&temp_path, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(DocumentError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(DocumentStore::sanitize_filename("simple-name"), "simple-name");
        assert_eq!(
            DocumentStore::sanitize_filename("name with spaces"),
            "name-with-spaces"
        );
        assert_eq!(DocumentStore::sanitize_filename("owner/repo"), "owner-repo");
        assert_eq!(DocumentStore::sanitize_filename("name<>:"), "name");
        assert_eq!(DocumentStore::sanitize_filename(""), "document");
        assert_eq!(DocumentStore::sanitize_filename("--a -- b--"), "a-b");
        assert_eq!(DocumentStore::sanitize_filename("???"), "document");
        assert_eq!(DocumentStore::sanitize_filename(r"a\b|c"), "abc");
    }

    #[test]
    fn test_sanitized_output_is_always_clean() {
        let inputs = [
            "",
            " ",
            "/",
            "a//b",
            "<a>",
            "- x -",
            "tokio-rs/tokio",
            "what?*is|this",
            "  leading and trailing  ",
            "c:\\windows\\path",
        ];

        for input in inputs {
            let sanitized = DocumentStore::sanitize_filename(input);
            assert!(!sanitized.is_empty(), "empty output for {:?}", input);
            assert!(!sanitized.starts_with('-'), "leading hyphen for {:?}", input);
            assert!(!sanitized.ends_with('-'), "trailing hyphen for {:?}", input);
            assert!(!sanitized.contains("--"), "double hyphen for {:?}", input);
            assert!(
                !sanitized.contains(['<', '>', ':', '"', '/', '\\', '|', '?', '*']),
                "illegal character for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_filename_for() {
        assert_eq!(DocumentStore::filename_for("fastapi"), "fastapi.md");
        assert_eq!(
            DocumentStore::filename_for("tiangolo/fastapi"),
            "tiangolo-fastapi.md"
        );
        assert_eq!(DocumentStore::filename_for("my library"), "my-library.md");
    }

    #[test]
    fn test_is_contained() {
        assert!(DocumentStore::is_contained(Path::new("guide.md")));
        assert!(DocumentStore::is_contained(Path::new("guides/rust/tokio")));
        assert!(DocumentStore::is_contained(Path::new("./guide")));
        assert!(!DocumentStore::is_contained(Path::new("/etc/guide")));
        assert!(!DocumentStore::is_contained(Path::new("../guide")));
        assert!(!DocumentStore::is_contained(Path::new("guides/../../guide")));
    }

    #[test]
    fn test_backup_path_for() {
        let backup = backup_path_for(Path::new("docs/test.md"), "20240101_120000");
        assert_eq!(backup, PathBuf::from("docs/test.md.backup_20240101_120000"));
    }
}
