//! SchemaDSL CLI - compact schematic DSL output from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use schemadsl::{DesignProvider, JsonDesignProvider, Librarian, ProviderError, QueryError};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "schemadsl")]
#[command(about = "Compact schematic connectivity DSL for design agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Project directory with .kicad_sch/.kicad_pcb files
    #[arg(short, long, value_name = "DIR", default_value = ".", conflicts_with = "json")]
    dir: PathBuf,

    /// Read a pre-merged JSON design instead of a project directory
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the design index: pages and inter-page signals
    Index {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print one schematic page
    Page {
        /// Page name (file stem of the sheet, or the JSON sheet file name)
        #[arg(value_name = "PAGE")]
        page: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// List all page names
    Pages {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the 1-hop context bubble around components
    Context {
        /// Reference designators (e.g. U1 R5)
        #[arg(value_name = "REFDES", required = true)]
        refdes: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print design statistics
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for tooling
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Index { source } => handle_text(&source, |lib| lib.get_index()),
        Commands::Page { page, source } => handle_text(&source, |lib| lib.get_page(&page)),
        Commands::Pages { source } => handle_pages(&source),
        Commands::Context { refdes, source } => handle_text(&source, |lib| {
            let refs: Vec<&str> = refdes.iter().map(String::as_str).collect();
            lib.get_context(&refs)
        }),
        Commands::Stats { source, format } => handle_stats(&source, format),
    };

    process::exit(exit_code);
}

type BoxedLibrarian = Librarian<Box<dyn DesignProvider + Send>>;

fn open_librarian(source: &SourceArgs) -> Result<BoxedLibrarian, ProviderError> {
    let provider: Box<dyn DesignProvider + Send> = match &source.json {
        Some(path) => Box::new(JsonDesignProvider::from_file(path.clone())),
        None => schemadsl::open_project(&source.dir)?,
    };
    Ok(Librarian::new(provider))
}

fn handle_text<F>(source: &SourceArgs, query: F) -> i32
where
    F: FnOnce(&mut BoxedLibrarian) -> Result<String, QueryError>,
{
    let mut librarian = match open_librarian(source) {
        Ok(librarian) => librarian,
        Err(err) => {
            eprintln!("Error: {err}");
            return 1;
        }
    };
    match query(&mut librarian) {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

fn handle_pages(source: &SourceArgs) -> i32 {
    let mut librarian = match open_librarian(source) {
        Ok(librarian) => librarian,
        Err(err) => {
            eprintln!("Error: {err}");
            return 1;
        }
    };
    match librarian.get_all_pages() {
        Ok(pages) => {
            for page in pages {
                println!("{page}");
            }
            0
        }
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

fn handle_stats(source: &SourceArgs, format: OutputFormat) -> i32 {
    let mut librarian = match open_librarian(source) {
        Ok(librarian) => librarian,
        Err(err) => {
            eprintln!("Error: {err}");
            return 1;
        }
    };
    let stats = match librarian.get_stats() {
        Ok(stats) => stats,
        Err(err) => {
            eprintln!("Error: {err}");
            return 1;
        }
    };
    match format {
        OutputFormat::Human => {
            println!("components:      {}", stats.components);
            println!("nets:            {}", stats.nets);
            println!("pages:           {}", stats.pages);
            println!("inter-page nets: {}", stats.inter_page_nets);
            println!("global nets:     {}", stats.global_nets);
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&stats) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error: {err}");
                return 1;
            }
        },
    }
    0
}
