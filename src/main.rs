use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use infsync::manifest::{WriteOptions, WriteOutcome};
use infsync::sync::{self, SyncOptions};
use infsync::{cfg, ui};

/// Update setup.inf with copy instructions for the managed plugins
#[derive(Parser)]
#[command(name = "infsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Build root containing the staged Salamander tree
    #[arg(long, env = "OPENSAL_BUILD_DIR")]
    build_root: Option<PathBuf>,

    /// setup.inf file to update
    #[arg(long)]
    setup_inf: PathBuf,

    /// Do not create a .bak file next to setup.inf before writing changes
    #[arg(long)]
    no_backup: bool,

    /// Report whether setup.inf would change without writing it
    #[arg(long)]
    dry_run: bool,

    /// TOML file overriding the built-in architectures, plugins and path tokens
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    ui::init(cli.verbose);

    if let Err(e) = cmd_sync(cli) {
        ui::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}

fn cmd_sync(cli: Cli) -> Result<()> {
    let layout = cfg::load_or_default(cli.layout.as_deref()).context("Failed to load layout")?;
    ui::info(&format!(
        "Syncing {} plugins across {} architectures",
        layout.modules.len(),
        layout.architectures.len()
    ));

    let opts = SyncOptions {
        build_root: cli.build_root,
        setup_inf: cli.setup_inf,
        write: WriteOptions {
            backup: !cli.no_backup,
            dry_run: cli.dry_run,
        },
    };
    let report = sync::run(&layout, &opts)?;

    match &report.outcome {
        WriteOutcome::Unchanged => {
            ui::info(&format!("{} is up to date", report.setup_inf.display()));
        }
        WriteOutcome::WouldUpdate => {
            ui::warn(&format!(
                "{} is out of date ({} files, {} directories)",
                report.setup_inf.display(),
                report.stats.files,
                report.stats.directories
            ));
            ui::hint("Run again without --dry-run to apply the changes");
        }
        WriteOutcome::Updated { backup } => {
            ui::success(&format!(
                "Updated {} ({} files, {} directories)",
                report.setup_inf.display(),
                report.stats.files,
                report.stats.directories
            ));
            if let Some(backup) = backup {
                ui::info(&format!("Original saved to {}", backup.display()));
            }
        }
    }

    Ok(())
}
