//! CLI for ruby-format-fixtures - Generate reference-format fixtures with AnyStyle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use ruby_format_fixtures::{
    core_refs::limit_from_env, write_core_refs, AnystyleLibrary, CoreRefsError, FixtureGenerator,
    GenerateError, Layout, LoadError,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Generate CSL and BibTeX reference fixtures by running reference lists through AnyStyle
#[derive(Parser)]
#[command(name = "ruby-format-fixtures")]
#[command(version)]
#[command(after_help = "\
Examples:
  ruby-format-fixtures
  ruby-format-fixtures --root ~/src/cite-otter --ruby /usr/local/bin/ruby
  ruby-format-fixtures extract-core-refs --limit 50")]
struct Cli {
    #[command(flatten)]
    globals: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Project root holding tmp/anystyle, tests/fixtures and target/
    #[arg(long, global = true, env = "CITE_OTTER_ROOT", default_value = env!("CARGO_MANIFEST_DIR"))]
    root: PathBuf,

    /// Ruby interpreter used to run AnyStyle
    #[arg(long, global = true, env = "CITE_OTTER_RUBY", default_value = "ruby")]
    ruby: PathBuf,

    /// Print debug logs (-vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the AnyStyle CSL and BibTeX reports (default)
    Generate,

    /// Rebuild tests/fixtures/format/core-refs.txt from AnyStyle's training data
    ExtractCoreRefs {
        /// Maximum number of references to extract [default: $CITE_OTTER_CORE_LIMIT, else 200]
        #[arg(long)]
        limit: Option<usize>,
    },
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 1 — AnyStyle could not be loaded
    Load(LoadError),
    /// Exit 10 — reference list not found / unreadable
    InputFile(String),
    /// Exit 11 — AnyStyle failed or returned unusable output
    Parser(String),
    /// Exit 12 — cannot create the report directory or write a report
    OutputFile(String),
    /// Exit 13 — core reference extraction failed
    Extract(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Load(_) => 1,
            AppError::InputFile(_) => 10,
            AppError::Parser(_) => 11,
            AppError::OutputFile(_) => 12,
            AppError::Extract(_) => 13,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Load(e) => write!(f, "{}", e),
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: reference lists live in tests/fixtures/format", msg)
            }
            AppError::Parser(msg) => write!(f, "{}", msg),
            AppError::OutputFile(msg) => {
                write!(f, "{}\n  hint: check that target/ is writable", msg)
            }
            AppError::Extract(msg) => {
                write!(
                    f,
                    "{}\n  hint: the AnyStyle checkout must contain res/parser/core.xml",
                    msg
                )
            }
        }
    }
}

impl From<GenerateError> for AppError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::Refs(_) => AppError::InputFile(e.to_string()),
            GenerateError::Parser(_) | GenerateError::Encode { .. } => {
                AppError::Parser(e.to_string())
            }
            GenerateError::CreateDir { .. } | GenerateError::Write { .. } => {
                AppError::OutputFile(e.to_string())
            }
        }
    }
}

impl From<CoreRefsError> for AppError {
    fn from(e: CoreRefsError) -> Self {
        AppError::Extract(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.globals);

    if let Err(e) = run(cli) {
        // The load diagnostic goes out bare; it already names the path and cause.
        match &e {
            AppError::Load(_) => eprintln!("{}", e),
            _ => eprintln!("Error: {}", e),
        }
        process::exit(e.exit_code());
    }
}

fn init_logging(globals: &GlobalArgs) {
    if globals.quiet {
        return;
    }

    let filter = match globals.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        2.. => LevelFilter::TRACE,
    };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(filter.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let layout = Layout::new(&cli.globals.root);

    match cli.command.unwrap_or(Commands::Generate) {
        Commands::Generate => generate_command(layout, &cli.globals.ruby)?,
        Commands::ExtractCoreRefs { limit } => {
            let limit = limit.unwrap_or_else(|| {
                limit_from_env(std::env::var("CITE_OTTER_CORE_LIMIT").ok().as_deref())
            });
            extract_command(&layout, limit)?
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Load AnyStyle, then write all four reports.
fn generate_command(layout: Layout, ruby: &Path) -> Result<(), AppError> {
    let library = AnystyleLibrary::load(layout.anystyle_lib(), ruby).map_err(AppError::Load)?;
    let generator = FixtureGenerator::new(layout, library);
    let report_dir = generator.run()?;

    println!("ruby format fixtures written to {}", report_dir.display());
    Ok(())
}

/// Rebuild the core reference list from the training data.
fn extract_command(layout: &Layout, limit: usize) -> Result<(), AppError> {
    let out = layout.core_refs();
    let count = write_core_refs(&layout.core_xml(), &out, limit)?;

    println!("{} core references written to {}", count, out.display());
    Ok(())
}
