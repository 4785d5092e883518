//! # objmap-cli
//!
//! Command-line front end for the object mapper.
//!
//! Type definitions are loaded from YAML or JSON files, source documents are
//! read as JSON, and mapped values are written back out as JSON.

mod commands;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "objmap")]
#[command(about = "Fuzzy-matching object mapper")]
#[command(version)]
struct Cli {
    /// Type definition files (YAML or JSON)
    #[arg(short, long = "types", value_name = "FILE", global = true)]
    types: Vec<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a JSON document into a destination type
    Map {
        /// Input JSON file, or - for stdin
        input: String,

        /// Type of the input document (e.g. Customer, list<Customer>)
        #[arg(long)]
        from: String,

        /// Destination type (e.g. CustomerVm, array<CustomerVm>)
        #[arg(long)]
        to: String,

        /// Mapping profile (YAML)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Null handling, overriding the profile
        #[arg(long, value_name = "POLICY")]
        null_handling: Option<String>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the mapped graph in its readable form instead of JSON
        #[arg(long)]
        pretty: bool,

        /// Report skipped fields on stderr
        #[arg(long)]
        diagnostics: bool,

        /// Exit with status 2 if any field was skipped
        #[arg(long)]
        strict: bool,
    },

    /// List the loaded types and their fields
    Types,

    /// Show how the fields of one type pair up with another
    Match {
        /// Source type
        from: String,

        /// Destination type
        to: String,

        /// Similarity floor for fuzzy matches
        #[arg(long)]
        floor: Option<f64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Map {
            input,
            from,
            to,
            profile,
            null_handling,
            output,
            pretty,
            diagnostics,
            strict,
        } => commands::map(&commands::MapArgs {
            types: &cli.types,
            input: &input,
            from: &from,
            to: &to,
            profile: profile.as_deref(),
            null_handling: null_handling.as_deref(),
            output: output.as_deref(),
            pretty,
            diagnostics,
            strict,
        }),
        Commands::Types => commands::types(&cli.types),
        Commands::Match { from, to, floor } => commands::match_types(&cli.types, &from, &to, floor),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
