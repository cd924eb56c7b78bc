use clap::{Parser, Subcommand};
use simple_docs::config::{self, SiteConfig};
use simple_docs::template::{Layout, TemplateError};
use simple_docs::{generate, output, scan};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simple-docs")]
#[command(about = "Static site generator for Markdown guideline documents")]
#[command(long_about = "\
Static site generator for Markdown guideline documents

Your filesystem is the data source. Top-level directories become categories,
their subdirectories become subcategories, and numeric prefixes set the order.

Content structure:

  content/
  ├── config.toml                      # Site config (optional)
  ├── 01_最初にみる動画/                 # Category (prefix sets nothing; priority is configured)
  │   ├── 01_はじめに/                   # Subcategory (sorted by numeric prefix)
  │   │   ├── 01_vision.md             # Page, order 1
  │   │   └── 02_ディレクターの心得.md     # Page, order 2
  │   └── index.md                     # Skipped by default
  ├── 02_商談マニュアル/
  │   └── 01_ヒアリング.md               # Page without subcategory
  └── 03_その他/
      └── アーカイブ/                    # Excluded directory

Metadata resolution (first available wins):
  Title:       front matter → first '# heading' → file name
  Category:    front matter → first directory (prefix removed)
  Order:       front matter → numeric file prefix → 999
  Slug:        front matter → [slugs] table → numeric prefixes → hash

Run 'simple-docs gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "site", global = true)]
    output: PathBuf,

    /// HTML template with {{TITLE}}, {{CONTENT}} and {{SIDEBAR}} slots (overrides config)
    #[arg(long, global = true)]
    template: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the content directory and print the resolved pages
    Scan {
        /// Print the resolved pages as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate content and template without writing anything
    Check,
    /// Build the site: pages, index and search index
    Build,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Scan { json } => {
            let site = scan::scan(&cli.source)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&site.pages)?);
            } else {
                output::print_scan_output(&site);
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = scan::scan(&cli.source)?;
            load_layout(&cli.source, cli.template.as_deref(), &site.config)?;
            output::print_scan_output(&site);
            println!(
                "==> Content is valid: {} pages, {} skipped",
                site.pages.len(),
                site.skipped.len()
            );
        }
        Command::Build => {
            println!("==> Scanning {}", cli.source.display());
            let site = scan::scan(&cli.source)?;
            let layout = load_layout(&cli.source, cli.template.as_deref(), &site.config)?;

            println!("==> Generating HTML → {}", cli.output.display());
            let report = generate::generate(&site, &layout, &cli.output)?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// The CLI template is taken as given; a configured one is relative to the
/// content root.
fn load_layout(
    source: &Path,
    cli_template: Option<&Path>,
    config: &SiteConfig,
) -> Result<Layout, TemplateError> {
    match cli_template {
        Some(path) => Layout::load(Path::new("."), Some(path)),
        None => Layout::load(source, config.template.as_deref().map(Path::new)),
    }
}
