//! Trellis Studio
//!
//! Builds a markup file against the reference widget syntax and prints the
//! resulting entity tree.
//!
//! ```bash
//! trellis-studio ui/panel.tml
//! trellis-studio --lenient -vv ui/panel.tml
//! trellis-studio --describe button
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use log::info;
use trellis_build::logging::{init_logging, LoggingConfig};
use trellis_build::{scene, Assembler, BuildConfig};

const SAMPLE: &str = include_str!("../ui/sample.tml");

#[derive(Parser, Debug)]
#[command(name = "trellis-studio")]
#[command(about = "Build Trellis markup and print the entity outline", long_about = None)]
#[command(version)]
struct Cli {
    /// Markup file to build (defaults to the bundled sample)
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Skip unknown attributes with a warning instead of failing
    #[arg(long)]
    lenient: bool,

    /// List the attributes an entity type accepts, then exit
    #[arg(long, value_name = "TYPE")]
    describe: Option<String>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    verbosity: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::default().with_verbosity(cli.verbosity));

    let syntax = scene::standard_syntax().context("registering the widget syntax")?;

    if let Some(ty) = &cli.describe {
        println!("{ty} ({})", syntax.ancestry(ty).join(" < "));
        for attribute in syntax.describe(ty) {
            println!("  {:<12} {:<9} from {}", attribute.name, attribute.phase, attribute.declared_by);
        }
        return Ok(());
    }

    let mut config = BuildConfig::from_env();
    if cli.lenient {
        config.strict = false;
    }

    let (name, source) = match &cli.path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            (path.display().to_string(), source)
        }
        None => ("sample.tml".to_string(), SAMPLE.to_string()),
    };

    let roots = Assembler::new(&syntax)
        .with_config(config)
        .parse_str(&source)
        .with_context(|| format!("building {name}"))?;
    info!("built {} root(s) from {} (strict: {})", roots.len(), name, config.strict);

    for root in &roots {
        print!("{}", scene::outline(&**root));
    }
    Ok(())
}
