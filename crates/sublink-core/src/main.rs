use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sublink_core::prelude::*;
use sublink_core::relink_workspace;

#[derive(Parser)]
#[command(name = "sublink", version)]
#[command(about = "Relocate generated project descriptors into the sub-projects that own them")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one generation cycle over a workspace's root-level solution and descriptors
    Relink {
        /// Workspace root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Solution manifest (defaults to the first .sln in the root)
        #[arg(long)]
        solution: Option<PathBuf>,

        /// Path rewrite strategy (overrides sublink.toml)
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the resolved project ownership
    Owners {
        /// Workspace root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Relative,
    Absolute,
}

impl From<StrategyArg> for RewriteStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Relative => Self::Relative,
            StrategyArg::Absolute => Self::Absolute,
        }
    }
}

/// Initialize tracing on stderr so stdout carries only the report
fn init_tracing(verbose: bool) {
    let default = if verbose { "sublink_core=debug,sublink_rewrite=debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Relink {
            root,
            solution,
            strategy,
            dry_run,
        } => {
            let mut config = SublinkConfig::load(&root)
                .with_context(|| format!("loading configuration from {}", root.display()))?;
            if let Some(strategy) = strategy {
                config = config.with_strategy(strategy.into());
            }
            let mut relinker = Relinker::new(&root, config)?.with_dry_run(dry_run);
            let report = relink_workspace(&mut relinker, solution.as_deref())
                .with_context(|| format!("relinking {}", root.display()))?;
            print!("{}", report.generate_text());
        }
        Commands::Owners { root } => {
            let config = SublinkConfig::load(&root)
                .with_context(|| format!("loading configuration from {}", root.display()))?;
            let mut relinker = Relinker::new(&root, config)?;
            let pass = relinker.begin_pass();
            if pass.owners().is_empty() {
                println!("No owned projects ({} sub-projects)", pass.subprojects().len());
            }
            for (name, dir) in pass.owners().iter() {
                println!("{name} -> {dir}");
            }
            for conflict in pass.owners().conflicts() {
                println!(
                    "conflict: {} claimed by {} (ignored, owned by {})",
                    conflict.name, conflict.ignored, conflict.owner
                );
            }
        }
    }
    Ok(())
}
