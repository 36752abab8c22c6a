use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use roc_bindgen::config::{self, Config, Target};

/// Generate Java and Go binding sources from roc-toolkit Doxygen XML.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Bindings to generate
    #[arg(short, long, value_enum)]
    target: Target,

    /// Roc Toolkit checkout, queried for git metadata
    #[arg(long, default_value = config::DEFAULT_TOOLKIT_DIR)]
    toolkit_dir: PathBuf,

    /// Doxygen XML directory (default: <toolkit-dir>/build/docs/public_api/xml)
    #[arg(long)]
    doxygen_dir: Option<PathBuf>,

    /// Java bindings checkout to write into
    #[arg(long, default_value = config::DEFAULT_JAVA_DIR)]
    java_output_dir: PathBuf,

    /// Go bindings checkout to write into
    #[arg(long, default_value = config::DEFAULT_GO_DIR)]
    go_output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("roc_bindgen=info")),
        )
        .init();

    let cli = Cli::parse();
    let doxygen_dir = cli
        .doxygen_dir
        .unwrap_or_else(|| config::default_doxygen_dir(&cli.toolkit_dir));
    let cfg = Config {
        target: cli.target,
        toolkit_dir: cli.toolkit_dir,
        doxygen_dir,
        java_output_dir: cli.java_output_dir,
        go_output_dir: cli.go_output_dir,
    };

    roc_bindgen::run(&cfg)?;
    Ok(())
}
