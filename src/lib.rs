//! Generate Java and Go binding sources from roc-toolkit Doxygen XML.
//!
//! The toolkit documents its public C API with Doxygen. This crate parses
//! the XML Doxygen writes, models the enums and config structs found
//! there, and renders source files for the `roc-java` and `roc-go`
//! bindings repositories. Opaque handle types (context, sender, receiver,
//! endpoint) are extracted too, so documentation references to them
//! resolve to the right spelling, but no code is generated for them.
//!
//! # Quick start
//!
//! Generate everything, with the toolkit and bindings checkouts sitting
//! next to each other:
//!
//! ```no_run
//! use roc_bindgen::config::{Config, Target};
//!
//! fn main() -> anyhow::Result<()> {
//!     roc_bindgen::run(&Config::new(Target::All))
//! }
//! ```
//!
//! Or drive the stages directly:
//!
//! ```no_run
//! use std::path::Path;
//!
//! use roc_bindgen::emit::{Banner, Emitter, JavaEmitter};
//! use roc_bindgen::extract;
//!
//! fn main() -> anyhow::Result<()> {
//!     let api = extract::parse_doxygen(Path::new("xml"))?;
//!     let git = extract::read_git_info(Path::new("../roc-toolkit"))?;
//!     for file in JavaEmitter.render(&api, &Banner::new(&git)) {
//!         println!("{}", file.path.display());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod emit;
pub mod extract;
pub mod model;
pub mod names;
pub mod output;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, Target};
use crate::emit::{Banner, Emitter, GoEmitter, JavaEmitter};
use crate::model::ApiRoot;

/// Runs the whole pipeline: extract the API from the Doxygen XML, then
/// render and write the sources for every selected target.
pub fn run(cfg: &Config) -> Result<()> {
    let api = extract::parse_doxygen(&cfg.doxygen_dir)
        .with_context(|| format!("parsing doxygen XML from {}", cfg.doxygen_dir.display()))?;
    let git = extract::read_git_info(&cfg.toolkit_dir)
        .with_context(|| format!("reading git metadata from {}", cfg.toolkit_dir.display()))?;
    let banner = Banner::new(&git);

    if cfg.target.includes(Target::Java) {
        run_emitter(&JavaEmitter, &cfg.java_output_dir, &api, &banner)?;
    }
    if cfg.target.includes(Target::Go) {
        run_emitter(&GoEmitter, &cfg.go_output_dir, &api, &banner)?;
    }
    Ok(())
}

fn run_emitter(
    emitter: &dyn Emitter,
    output_dir: &Path,
    api: &ApiRoot,
    banner: &Banner,
) -> Result<()> {
    info!(language = emitter.language(), dir = %output_dir.display(), "running emitter");
    let files = emitter.render(api, banner);
    output::write_files(output_dir, &files)
        .with_context(|| format!("writing {} sources", emitter.language()))
}
