//! CrossFile Driver
//!
//! Command-line shell over the CrossFile frontend: check `.xfile`
//! descriptions, dump the resolved IR as JSON, or dump raw tokens.

use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use xfile_frontend::Frontend;

#[derive(Parser)]
#[command(name = "xfc")]
#[command(about = "CrossFile format-description compiler frontend")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and resolve a description, printing diagnostics
    Check {
        /// Input .xfile source
        input: PathBuf,
    },

    /// Resolve a description and dump the IR as JSON
    DumpIr {
        /// Input .xfile source
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Dump the token stream (for grammar debugging)
    Tokens {
        /// Input .xfile source
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { input } => check_file(&input),
        Commands::DumpIr { input, output, pretty } => dump_ir(&input, output.as_deref(), pretty),
        Commands::Tokens { input } => dump_tokens(&input),
    };

    match result {
        Ok(clean) if clean => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn check_file(input: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(input)?;
    info!("checking {}", input.display());

    let resolved = Frontend::resolve_source(&source)?;

    for warning in &resolved.warnings {
        eprintln!("{}", warning);
    }
    for error in &resolved.errors {
        eprintln!("{}", error);
    }

    if resolved.is_clean() {
        println!(
            "{}: {} declaration{} resolved",
            input.display(),
            resolved.table.len(),
            if resolved.table.len() == 1 { "" } else { "s" }
        );
        Ok(true)
    } else {
        eprintln!(
            "{}: {} error{}",
            input.display(),
            resolved.errors.len(),
            if resolved.errors.len() == 1 { "" } else { "s" }
        );
        Ok(false)
    }
}

fn dump_ir(
    input: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(input)?;

    let resolved = Frontend::resolve_source(&source)?;

    for error in &resolved.errors {
        eprintln!("{}", error);
    }

    let json = if pretty {
        serde_json::to_string_pretty(&resolved.table)?
    } else {
        serde_json::to_string(&resolved.table)?
    };

    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }

    Ok(resolved.is_clean())
}

fn dump_tokens(input: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(input)?;

    let tokens = Frontend::tokenize_source(&source)?;
    for token in &tokens {
        println!("{}", token);
    }

    Ok(true)
}
