//! In-place editing of the evaluator's parameter file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::ParamEntry;
use crate::error::{Result, SweepError};

/// A `key=value` parameter file on disk.
#[derive(Debug, Clone)]
pub struct ParameterFile {
    path: PathBuf,
}

impl ParameterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| SweepError::file(&self.path, e))
    }

    /// Replace every occurrence of `from` with `to`, returning the number of
    /// replacements. The file is left untouched when nothing matches.
    pub fn substitute(&self, from: &str, to: &str) -> Result<usize> {
        let contents = self.read()?;
        let count = contents.matches(from).count();
        if count > 0 && from != to {
            self.write_atomic(&contents.replace(from, to))?;
        }
        debug!(path = %self.path.display(), from, to, count, "Substituted parameter token");
        Ok(count)
    }

    /// Write `entries` as one `key=value` line each, replacing the file.
    pub fn render(&self, entries: &[ParamEntry]) -> Result<()> {
        let mut contents = String::new();
        for entry in entries {
            contents.push_str(&entry.key);
            contents.push('=');
            contents.push_str(&entry.value);
            contents.push('\n');
        }
        self.write_atomic(&contents)
    }

    /// SHA-256 hex digest of the current contents.
    pub fn digest(&self) -> Result<String> {
        let bytes = fs::read(&self.path).map_err(|e| SweepError::file(&self.path, e))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    // Temp file in the same directory, then rename over the target. An
    // existing target keeps its permissions.
    fn write_atomic(&self, contents: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| SweepError::file(&dir, e))?;
        match fs::metadata(&self.path) {
            Ok(meta) => tmp
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| SweepError::file(tmp.path(), e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(SweepError::file(&self.path, e)),
        }
        tmp.write_all(contents.as_bytes())
            .map_err(|e| SweepError::file(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| SweepError::file(&self.path, e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_file(contents: &str) -> (tempfile::TempDir, ParameterFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parameterFile");
        fs::write(&path, contents).unwrap();
        (dir, ParameterFile::new(path))
    }

    #[test]
    fn test_substitute_replaces_token() {
        let (_dir, file) = make_file("fb=true\nfbTerms=5\nfbMu=0\n");
        let n = file.substitute("fbTerms=5", "fbTerms=10").unwrap();
        assert_eq!(n, 1);
        assert_eq!(file.read().unwrap(), "fb=true\nfbTerms=10\nfbMu=0\n");
    }

    #[test]
    fn test_substitute_is_plain_text_not_line_aware() {
        let (_dir, file) = make_file("fbDocs=10\nfbDocs=100\n");
        let n = file.substitute("fbDocs=10", "fbDocs=20").unwrap();
        assert_eq!(n, 2);
        assert_eq!(file.read().unwrap(), "fbDocs=20\nfbDocs=200\n");
    }

    #[test]
    fn test_substitute_without_match_leaves_file() {
        let (_dir, file) = make_file("fbMu=0\n");
        assert_eq!(file.substitute("fbTerms=5", "fbTerms=10").unwrap(), 0);
        assert_eq!(file.read().unwrap(), "fbMu=0\n");
    }

    #[test]
    fn test_substitute_missing_file_errors() {
        let file = ParameterFile::new("/nonexistent/irsweep/parameterFile");
        let err = file.substitute("a", "b").unwrap_err();
        assert!(matches!(err, SweepError::File { .. }));
    }

    #[test]
    fn test_render_writes_lines_in_order() {
        let (_dir, file) = make_file("stale\n");
        file.render(&[
            ParamEntry {
                key: "retrievalAlgorithm".to_string(),
                value: "Indri".to_string(),
            },
            ParamEntry {
                key: "fbMu".to_string(),
                value: "2500".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(file.read().unwrap(), "retrievalAlgorithm=Indri\nfbMu=2500\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_substitute_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, file) = make_file("fbMu=0\n");
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o640)).unwrap();

        file.substitute("fbMu=0", "fbMu=2500").unwrap();

        let mode = fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
        assert_eq!(file.read().unwrap(), "fbMu=2500\n");
    }

    #[test]
    fn test_render_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = ParameterFile::new(dir.path().join("fresh"));
        file.render(&[ParamEntry {
            key: "fbTerms".to_string(),
            value: "5".to_string(),
        }])
        .unwrap();
        assert_eq!(file.read().unwrap(), "fbTerms=5\n");
    }

    #[test]
    fn test_digest_tracks_contents() {
        let (_dir, file) = make_file("fbMu=0\n");
        let before = file.digest().unwrap();
        assert_eq!(before.len(), 64);
        file.substitute("fbMu=0", "fbMu=2500").unwrap();
        assert_ne!(before, file.digest().unwrap());
    }
}
