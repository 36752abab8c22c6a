//! Writing rendered files into a bindings checkout.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::emit::GeneratedFile;

/// Writes every file under `base_dir`, creating subdirectories as needed
/// and overwriting copies from earlier runs. `base_dir` itself must
/// already exist; a missing checkout is reported, not created.
pub fn write_files(base_dir: &Path, files: &[GeneratedFile]) -> Result<()> {
    if !base_dir.is_dir() {
        bail!("output directory doesn't exist: {}", base_dir.display());
    }
    for file in files {
        let path = base_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&path, &file.contents)
            .with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), bytes = file.contents.len(), "wrote file");
    }
    info!(dir = %base_dir.display(), files = files.len(), "wrote generated sources");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> Vec<GeneratedFile> {
        vec![GeneratedFile {
            path: PathBuf::from("roc/interface.go"),
            contents: "package roc\n".to_string(),
        }]
    }

    #[test]
    fn writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &sample()).unwrap();

        let path = dir.path().join("roc/interface.go");
        assert_eq!(fs::read_to_string(&path).unwrap(), "package roc\n");

        fs::write(&path, "stale contents").unwrap();
        write_files(dir.path(), &sample()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "package roc\n");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("roc-go");
        let err = write_files(&missing, &sample()).unwrap_err();
        assert!(err.to_string().contains("doesn't exist"), "{err}");
    }
}
