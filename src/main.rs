//! papyc - Papyrus front-end driver
//!
//! Parses Papyrus scripts, builds their scopes and indexes them into one
//! program-wide symbol table, reporting every diagnostic found on the way.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};

use papyrus_front::feedback::{CheckReport, CheckStats, ErrorReport};
use papyrus_front::frontend::ast::Script;
use papyrus_front::frontend::module::SourceLoader;
use papyrus_front::frontend::symbol_table::SymbolTable;

/// Papyrus front-end
#[derive(Parser, Debug)]
#[command(name = "papyc")]
#[command(version = "0.1.0")]
#[command(about = "Papyrus front-end - parsing, scopes and symbol resolution")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and index scripts, reporting all diagnostics
    Check {
        /// Script files or directories to search for .psc files
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Directory to look up imported scripts in (repeatable)
        #[arg(short, long = "import", value_name = "DIR")]
        imports: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Index scripts and print the global symbols and script scopes
    Symbols {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[arg(short, long = "import", value_name = "DIR")]
        imports: Vec<PathBuf>,
    },
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

/// Returns whether everything checked cleanly
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Check { paths, imports, format } => check(&paths, imports, format),
        Commands::Symbols { paths, imports } => symbols(&paths, imports),
        Commands::Version => {
            println!("papyc 0.1.0");
            println!("Papyrus Front-End");
            println!("License: Apache-2.0");
            Ok(true)
        }
    }
}

/// Parse and index every script under `paths`, then every script reachable
/// from them through imports
fn index(paths: &[PathBuf], imports: Vec<PathBuf>, table: &SymbolTable) -> Result<(Vec<ErrorReport>, CheckStats)> {
    let started = Instant::now();
    let files = SourceLoader::collect(paths).context("collecting script files")?;
    let mut loader = SourceLoader::with_search_paths(imports);
    let mut diagnostics = Vec::new();
    let mut stats = CheckStats {
        files: files.len(),
        ..CheckStats::default()
    };

    let mut indexed: HashSet<String> = HashSet::new();
    let mut parsed: Vec<Script> = Vec::new();
    for path in &files {
        let file_name = path.display().to_string();
        let result = loader.load(path).and_then(|file| {
            let script = file.parse()?;
            if !script.name().is_equivalent(&file.identifier) {
                warn!("{} declares script {}", file_name, script.name());
            }
            Ok(script)
        });
        match result.and_then(|script| table.upsert(&script).map(|()| script)) {
            Ok(script) => {
                debug!("Indexed {}", file_name);
                indexed.insert(script.name().key());
                stats.indexed += 1;
                parsed.push(script);
            }
            Err(e) => diagnostics.push(ErrorReport::from_error(&e, &file_name)),
        }
    }

    let failed = loader.load_imports(&parsed, &mut indexed, |script| {
        table.upsert(script)?;
        debug!("Indexed import {}", script.name());
        Ok(())
    });
    stats.unindexed_imports = failed.len();

    stats.global_symbols = table.read().global().len();
    stats.total_time_ms = started.elapsed().as_millis() as u64;
    Ok((diagnostics, stats))
}

fn check(paths: &[PathBuf], imports: Vec<PathBuf>, format: Format) -> Result<bool> {
    let table = SymbolTable::new();
    let (diagnostics, stats) = index(paths, imports, &table)?;
    info!("Checked {} files in {}ms", stats.files, stats.total_time_ms);
    let report = CheckReport::new(diagnostics, stats);

    match format {
        Format::Json => println!("{}", report.to_json()),
        Format::Text => {
            for diagnostic in &report.diagnostics {
                eprintln!("{}", diagnostic.render());
            }
            if report.success {
                println!("✅ {} scripts checked, no errors found", report.stats.indexed);
            } else {
                println!("❌ {} errors in {} files", report.diagnostics.len(), report.stats.files);
            }
        }
    }
    Ok(report.success)
}

fn symbols(paths: &[PathBuf], imports: Vec<PathBuf>) -> Result<bool> {
    let table = SymbolTable::new();
    let (diagnostics, _) = index(paths, imports, &table)?;
    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic.render());
    }

    let program = table.read();
    println!("Global scope:");
    for symbol in program.global().symbols() {
        println!("  {:<20} {:?}", symbol.identifier().name(), symbol.kind());
    }
    for scopes in program.scripts() {
        println!();
        println!("Script {}:", scopes.script_symbol().identifier());
        for (id, scope) in scopes.scopes() {
            let name = scope
                .symbol()
                .map_or_else(|| "<anonymous>".to_string(), |s| s.identifier().name().to_string());
            println!("  {:?} {:?} {} (parent {:?})", id, scope.kind(), name, scope.parent());
            for symbol in scope.symbols() {
                let ty = symbol
                    .data_type()
                    .map_or_else(|_| "-".to_string(), |t| t.to_string());
                println!("    {:<20} {:<18} {}", symbol.identifier().name(), format!("{:?}", symbol.kind()), ty);
            }
        }
    }
    Ok(diagnostics.is_empty())
}
