//! PDF Combine CLI tool
//!
//! A command-line tool for combining PDFs in a chosen order.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use pdf_combine::commands::expand_inputs;
use pdf_combine::pdf::{combine_pdfs, extract_metadata, CombineOptions, OutputName, OutputTarget, DEFAULT_OUTPUT_NAME};
use pdf_combine::selection::SelectionList;
use pdf_combine::shell::Shell;

/// PDF Combine - merge PDFs in order without overwriting anything
#[derive(Parser)]
#[command(name = "pdf-combine")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Combine two files into combined.pdf (or combined (1).pdf if taken)
    pdf-combine combine A.pdf B.pdf

    # Combine numbered handouts in order and open the result
    pdf-combine combine --open \"[0-9]*.pdf\"

    # Pick and reorder files interactively
    pdf-combine interactive *.pdf")]
struct Cli {
    /// Log debug detail (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// Directory to write the combined PDF into
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Base output file name; a number is added if it is taken
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME, value_parser = parse_output_name)]
    name: OutputName,
}

impl OutputArgs {
    fn target(&self) -> OutputTarget {
        OutputTarget::new(&self.dir, self.name.clone())
    }
}

fn parse_output_name(name: &str) -> std::result::Result<OutputName, String> {
    OutputName::new(name).map_err(|e| e.to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Combine PDF files into one, in the order given
    Combine {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Pick, reorder and combine files from an interactive prompt
    Interactive {
        /// Files to start with. Supports glob patterns like "*.pdf"
        inputs: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Combine { inputs, output, open } => cmd_combine(inputs, output, open),
        Commands::Interactive { inputs, output } => cmd_interactive(inputs, output),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Log to standard output; RUST_LOG wins over --verbose
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stdout)
        .with_target(false)
        .init();
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()
            .with_context(|| format!("Failed to open {}", path.display()))?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()
            .with_context(|| format!("Failed to open {}", path.display()))?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()
            .with_context(|| format!("Failed to open {}", path.display()))?;
    }
    Ok(())
}

/// Combine inputs in order into the first free output name
fn cmd_combine(inputs: Vec<String>, output: OutputArgs, open: bool) -> Result<()> {
    let mut selection = SelectionList::new();
    selection.add_all(expand_inputs(&inputs)?);

    let options = CombineOptions {
        input_paths: selection.paths(),
        target: output.target(),
    };

    let written = combine_pdfs(&options)
        .with_context(|| format!("Failed to combine {} file(s)", options.input_paths.len()))?;

    if open {
        open_file(&written)?;
    }

    Ok(())
}

/// Run an interactive session on stdin/stdout
fn cmd_interactive(inputs: Vec<String>, output: OutputArgs) -> Result<()> {
    let mut selection = SelectionList::new();
    selection.add_all(expand_inputs(&inputs)?);

    let mut shell = Shell::new(selection, output.target());
    shell
        .run(io::stdin().lock(), io::stdout())
        .context("Interactive session failed")?;

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}
