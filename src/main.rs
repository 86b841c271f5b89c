//! Impact CLI - a host for the dependency indexing engine

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use impact::analyzer::{Analyzer, AnalyzerOptions, DEFAULT_MAX_FILES};
use impact::api::{run_analysis, symbol_graph};
use impact::config::{ImpactConfig, default_config_path, load_config, write_config};
use impact::graph::FileGraph;
use impact::record::LanguageFilter;
use impact::ui::{ProgressManager, stats_table, theme};

#[derive(Parser)]
#[command(name = "impact")]
#[command(version)]
#[command(about = "Multi-language import graphs and symbol drill-down")]
#[command(long_about = r#"
Impact indexes the source dependencies of a workspace:
  • Per-file import/export extraction (TS/TSX/JS/JSX via tree-sitter, Python via the interpreter)
  • Specifier resolution to workspace files
  • Content-hash cached re-runs
  • File-level import graph and per-file symbol graphs

Example usage:
  impact analyze --root ./src
  impact analyze --root . --json
  impact symbols --file ./src/engine.ts
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a workspace and report modules, stats, and the import graph
    Analyze {
        /// Workspace root to index
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Upper bound on analyzed files (clamped to a sane range)
        #[arg(short, long)]
        max_files: Option<usize>,

        /// Language filter: auto, ts, js, py
        #[arg(short, long)]
        lang: Option<String>,

        /// Path to impact.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit the full analysis result as JSON
        #[arg(long)]
        json: bool,

        /// Emit the assembled file graph as JSON instead
        #[arg(long)]
        graph: bool,
    },

    /// Build the symbol graph for one file
    Symbols {
        /// Source file to drill into
        #[arg(short, long)]
        file: PathBuf,

        /// Workspace root (defaults to the file's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Emit the symbol graph as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter impact.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr so JSON output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Analyze { root, max_files, lang, config, json, graph } => {
            let file_config = load_config(config.as_deref())?.unwrap_or_default();

            let mut options = AnalyzerOptions::default();
            file_config.apply(&mut options);

            let filter: LanguageFilter = lang
                .or(file_config.lang)
                .as_deref()
                .unwrap_or("auto")
                .parse()?;
            let max_files = max_files.or(file_config.max_files).unwrap_or(DEFAULT_MAX_FILES);

            if json || graph {
                let engine = Analyzer::new(&options);
                let result = run_analysis(&engine, &root, filter, max_files);
                if graph {
                    let file_graph = FileGraph::build(&result.modules, &result.workspace_root);
                    println!("{}", serde_json::to_string_pretty(&file_graph)?);
                } else {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
                return Ok(());
            }

            println!("{} {}", "Impact".style(theme().header), root.display());

            let (progress, tx) = ProgressManager::spawn();
            let engine = Analyzer::new(&options).with_progress(tx);
            let result = run_analysis(&engine, &root, filter, max_files);
            drop(engine);
            progress.finish();

            if let Some(note) = &result.stats.note {
                println!("{} {}", "!".style(theme().warn), note);
                return Ok(());
            }

            let file_graph = FileGraph::build(&result.modules, &result.workspace_root);
            println!(
                "{}",
                stats_table(&[
                    ("Files discovered", result.stats.total.to_string()),
                    ("Parsed", result.stats.parsed.to_string()),
                    ("Cached", result.stats.cached.to_string()),
                    ("Failed", result.stats.failed.to_string()),
                    ("Graph nodes", file_graph.nodes.len().to_string()),
                    ("Graph edges", file_graph.edges.len().to_string()),
                    ("Time", format!("{}ms", result.stats.time_ms)),
                ])
            );

            for edge in file_graph.edges.iter().take(50) {
                println!("  {} {} {}", edge.source, "->".style(theme().dim), edge.target);
            }
            if file_graph.edges.len() > 50 {
                println!(
                    "  {}",
                    format!("... and {} more edges", file_graph.edges.len() - 50).style(theme().dim)
                );
            }
        }

        Commands::Symbols { file, root, json } => {
            let engine = Analyzer::new(&AnalyzerOptions::default());
            let result = symbol_graph(&engine, &file, root.as_deref());

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            println!("{} {}", "Symbols".style(theme().header), file.display());
            if result.nodes.is_empty() {
                println!("{}", "no symbols found".style(theme().dim));
                return Ok(());
            }
            for node in &result.nodes {
                match node.loc {
                    Some(loc) => println!(
                        "  {} {} {}",
                        node.name,
                        format!("[{:?}]", node.kind).to_lowercase().style(theme().dim),
                        format!("{}:{}", loc.line, loc.column).style(theme().dim)
                    ),
                    None => println!(
                        "  {} {}",
                        node.name,
                        format!("[{:?}]", node.kind).to_lowercase().style(theme().dim)
                    ),
                }
            }
            for edge in &result.edges {
                println!(
                    "  {} {} {}",
                    edge.source,
                    "->".style(theme().dim),
                    edge.target
                );
            }
        }

        Commands::Init { force } => {
            let path = default_config_path();
            let config = ImpactConfig {
                max_files: Some(DEFAULT_MAX_FILES),
                lang: Some("auto".to_string()),
                python_bin: Some("python3".to_string()),
                python_timeout_ms: Some(10_000),
                exclude: Some(Vec::new()),
            };
            write_config(&path, &config, force)?;
            println!("{} wrote {}", "✓".style(theme().success), path.display());
        }
    }

    Ok(())
}
