//! dagsched CLI — a thin demonstration harness around the `dagsched`
//! multi-stream scheduler.

mod manifest;
mod model;
mod program_file;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use manifest::ScheduleManifest;
use model::{Call, ConfiguredModel};
use program_file::ProgramFile;

#[derive(Parser)]
#[command(name = "dagsched", version, about = "Multi-stream DAG scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a program file across the manifest's concurrency.
    Schedule {
        /// Program file (JSON) describing the instruction graph.
        program: PathBuf,
        /// Manifest file; defaults to `dagsched.toml` found by upward search.
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Print the diagnostic trace instead of the call summary.
        #[arg(long)]
        trace: bool,
    },
    /// Print a starter manifest to stdout.
    Init,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Schedule {
            program,
            manifest,
            trace,
        } => schedule(&program, manifest.as_deref(), trace),
        Commands::Init => {
            print!("{}", ScheduleManifest::template());
            Ok(())
        }
    }
}

fn schedule(program_path: &Path, manifest_path: Option<&Path>, trace: bool) -> Result<()> {
    let manifest = load_manifest(program_path, manifest_path)?;

    let contents = std::fs::read_to_string(program_path)
        .with_context(|| format!("reading {}", program_path.display()))?;
    let mut program = ProgramFile::from_json(&contents)?
        .build()
        .with_context(|| format!("building program from {}", program_path.display()))?;

    let mut model = ConfiguredModel::new(&manifest);
    let lines = dagsched::apply(&mut program, &mut model, trace)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("scheduling program")?;

    if trace {
        for line in lines {
            println!("{line}");
        }
    } else {
        let (sched, record, wait) = model.calls.iter().fold((0, 0, 0), |(s, r, w), call| match call {
            Call::Sched { .. } => (s + 1, r, w),
            Call::Record { .. } => (s, r + 1, w),
            Call::Wait { .. } => (s, r, w + 1),
        });
        println!("sched={sched} record={record} wait={wait}");
    }

    Ok(())
}

fn load_manifest(program_path: &Path, manifest_path: Option<&Path>) -> Result<ScheduleManifest> {
    if let Some(path) = manifest_path {
        let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return toml::from_str(&content).with_context(|| format!("parsing {}", path.display()));
    }

    let start = program_path.parent().unwrap_or_else(|| Path::new("."));
    let start = if start.as_os_str().is_empty() { Path::new(".") } else { start };
    ScheduleManifest::find_and_load(start)?
        .map(|(m, _)| m)
        .context("no dagsched.toml found; pass --manifest or run `dagsched init` to create one")
}
