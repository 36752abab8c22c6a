//! Run configuration and the default directory layout.
//!
//! By default the tool expects the toolkit and bindings checkouts to sit
//! next to each other, so all paths are relative to the current directory.

use std::path::{Path, PathBuf};

use clap::ValueEnum;

/// Default location of the toolkit checkout.
pub const DEFAULT_TOOLKIT_DIR: &str = "../roc-toolkit";
/// Doxygen XML location inside a toolkit checkout with built docs.
pub const DOXYGEN_SUBDIR: &str = "build/docs/public_api/xml";
/// Default location of the Java bindings checkout.
pub const DEFAULT_JAVA_DIR: &str = "../roc-java";
/// Default location of the Go bindings checkout.
pub const DEFAULT_GO_DIR: &str = "../roc-go";

/// Which bindings to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Every supported language.
    All,
    Java,
    Go,
}

impl Target {
    pub fn includes(self, lang: Target) -> bool {
        self == Target::All || self == lang
    }
}

/// Doxygen XML directory inside a toolkit checkout.
pub fn default_doxygen_dir(toolkit_dir: &Path) -> PathBuf {
    toolkit_dir.join(DOXYGEN_SUBDIR)
}

/// Everything [`crate::run`] needs to know.
#[derive(Debug, Clone)]
pub struct Config {
    pub target: Target,
    /// Toolkit checkout, queried for git metadata.
    pub toolkit_dir: PathBuf,
    /// Directory with the Doxygen XML files.
    pub doxygen_dir: PathBuf,
    /// Java bindings checkout to write into.
    pub java_output_dir: PathBuf,
    /// Go bindings checkout to write into.
    pub go_output_dir: PathBuf,
}

impl Config {
    /// Configuration with every path at its default.
    pub fn new(target: Target) -> Self {
        let toolkit_dir = PathBuf::from(DEFAULT_TOOLKIT_DIR);
        let doxygen_dir = default_doxygen_dir(&toolkit_dir);
        Self {
            target,
            toolkit_dir,
            doxygen_dir,
            java_output_dir: PathBuf::from(DEFAULT_JAVA_DIR),
            go_output_dir: PathBuf::from(DEFAULT_GO_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_selection() {
        assert!(Target::All.includes(Target::Java));
        assert!(Target::All.includes(Target::Go));
        assert!(Target::Java.includes(Target::Java));
        assert!(!Target::Java.includes(Target::Go));
        assert!(!Target::Go.includes(Target::Java));
    }

    #[test]
    fn default_paths_point_at_sibling_checkouts() {
        let cfg = Config::new(Target::All);
        assert_eq!(cfg.toolkit_dir, PathBuf::from("../roc-toolkit"));
        assert_eq!(
            cfg.doxygen_dir,
            PathBuf::from("../roc-toolkit/build/docs/public_api/xml")
        );
        assert_eq!(cfg.java_output_dir, PathBuf::from("../roc-java"));
        assert_eq!(cfg.go_output_dir, PathBuf::from("../roc-go"));
    }
}
