//! Knowledge-Graph Registry CLI
//!
//! Command-line helpers for consolidating and tidying registry pages.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kg_registry::{
    check_files, concat, extract_context, load_header, load_resources, prettify_file,
    read_consolidated, to_json_string, to_yaml_string, write_output, ConcatOptions, ConcatResult,
    PageOutcome, RegistryError, RegistryLayout,
};

#[derive(Parser)]
#[command(name = "kg-registry")]
#[command(about = "Helper utils for the KG-Registry")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Concatenate resource pages into a single metadata file
    Concat(ConcatArgs),
    /// Check that pages carry a readable header and well-formed resources
    Check(FilesArgs),
    /// Rewrite page headers in canonical form
    Prettify(FilesArgs),
    /// Print a JSON-LD context built from a consolidated metadata file
    ExtractContext(ExtractContextArgs),
}

#[derive(Args)]
struct ConcatArgs {
    /// Resource pages, already sorted
    files: Vec<PathBuf>,

    /// YAML file to include as the document header
    #[arg(short, long)]
    include: Option<PathBuf>,

    /// Output YAML file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Registry root containing the resource/ directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Don't create or update per-product pages
    #[arg(long)]
    no_product_pages: bool,

    /// Don't propagate derived products to their source resources
    #[arg(long)]
    no_propagate: bool,
}

#[derive(Args)]
struct FilesArgs {
    /// Registry pages to process
    files: Vec<PathBuf>,
}

#[derive(Args)]
struct ExtractContextArgs {
    /// Consolidated metadata file
    #[arg(short, long)]
    input: PathBuf,
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Print page and propagation audit lines
fn write_audit(out: &mut dyn Write, result: &ConcatResult) -> io::Result<()> {
    for report in &result.pages {
        match &report.outcome {
            PageOutcome::Created => {
                writeln!(out, "Creating new page for product {}", report.product_id)?;
            }
            PageOutcome::Updated(diff) => {
                writeln!(
                    out,
                    "Updating page for product {} - content changed",
                    report.product_id
                )?;
                if !diff.added.is_empty() {
                    writeln!(out, "  Added fields: {}", diff.added.join(", "))?;
                }
                if !diff.removed.is_empty() {
                    writeln!(out, "  Removed fields: {}", diff.removed.join(", "))?;
                }
                for key in &diff.changed {
                    writeln!(out, "  Changed '{}'", key)?;
                }
            }
            PageOutcome::Recreated { reason } => {
                writeln!(
                    out,
                    "Error reading existing product file {}, will recreate: {}",
                    report.path.display(),
                    reason
                )?;
            }
            PageOutcome::Unchanged => {}
        }
    }

    if let Some(propagation) = &result.propagation {
        writeln!(
            out,
            "Found {} resources with products to propagate: {}",
            propagation.referenced.len(),
            propagation.referenced.join(", ")
        )?;
        writeln!(out, "Cross-resource references:")?;
        writeln!(out, "Resource Name\tCount of products referencing")?;
        for entry in &propagation.entries {
            writeln!(out, "{}\t{}", entry.resource_id, entry.referencing)?;
            if entry.added > 0 {
                writeln!(
                    out,
                    " Wrote {} product(s) to {} entry",
                    entry.added, entry.resource_id
                )?;
            }
            if let Some(reason) = &entry.page_error {
                writeln!(out, " Could not update page for {}: {}", entry.resource_id, reason)?;
            }
        }
        writeln!(
            out,
            "Propagated products to {} resource(s)",
            propagation.resources_updated()
        )?;
    }

    Ok(())
}

fn run_concat(args: ConcatArgs) -> Result<(), RegistryError> {
    let loaded = load_resources(args.files.as_slice())?;
    let header = load_header(args.include.as_deref())?;

    let options = ConcatOptions {
        layout: RegistryLayout::new(args.root),
        product_pages: !args.no_product_pages,
        propagate: !args.no_propagate,
    };

    let result = concat(loaded.resources, header, &options)?;

    // Keep the audit trail off stdout when stdout carries the document
    let mut audit: Box<dyn Write> = if args.output.is_some() {
        Box::new(io::stdout())
    } else {
        Box::new(io::stderr())
    };
    write_audit(audit.as_mut(), &result)?;

    match &args.output {
        Some(path) => {
            write_output(path, &result.document)?;
            eprintln!(
                "Wrote {} resources to {} ({} skipped)",
                result.stats.resources,
                path.display(),
                loaded.skipped.len()
            );
        }
        None => {
            print!("{}", to_yaml_string(&result.document)?);
        }
    }

    Ok(())
}

fn run_check(args: FilesArgs) -> Result<(), RegistryError> {
    let failures = check_files(args.files.as_slice());
    if failures.is_empty() {
        return Ok(());
    }

    eprintln!("FAILURES:");
    for failure in &failures {
        eprintln!("ERROR: {}: {}", failure.path.display(), failure.error);
    }
    std::process::exit(1);
}

fn run_prettify(args: FilesArgs) -> Result<(), RegistryError> {
    for file in &args.files {
        if prettify_file(file)? {
            println!("Prettified {}", file.display());
        }
    }
    Ok(())
}

fn run_extract_context(args: ExtractContextArgs) -> Result<(), RegistryError> {
    let document = read_consolidated(&args.input)?;
    println!("{}", to_json_string(&extract_context(&document))?);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Concat(args) => run_concat(args),
        Commands::Check(args) => run_check(args),
        Commands::Prettify(args) => run_prettify(args),
        Commands::ExtractContext(args) => run_extract_context(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
