use clap::{Parser, Subcommand};
use folio::{config, generate, output, route, scan, views};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("FOLIO_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("FOLIO_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Single-page portfolio and blog generator")]
#[command(long_about = "\
Single-page portfolio and blog generator

Blog posts and projects are JSON records. Each record carries its metadata
and a document body made of typed blocks (headings, paragraphs, quotes,
media, code). The build writes one index.html that routes on the location
fragment (#/blog/<slug>, #/project/<slug>, ...).

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── resume.md                    # Resume page (optional)
  ├── assets/                      # Static files → copied to output root
  ├── blog/
  │   ├── 010-react-performance.json   # Slug from file name unless the record sets one
  │   └── 020-pytorch-course.json
  └── projects/
      └── 010-folio.json

Record blocks:
  {\"type\": \"heading\", \"level\": 2, \"id\": \"intro\", \"text\": \"Intro\"}
  {\"type\": \"paragraph\", \"text\": \"Inline <strong>markup</strong> allowed\"}
  {\"type\": \"quote\", \"text\": \"...\", \"author\": \"...\"}
  {\"type\": \"image\", \"url\": \"/blogs/a.png\", \"caption\": \"...\", \"width\": \"60%\"}
  {\"type\": \"code\", \"language\": \"rust\", \"source\": \"fn main() {}\"}

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load all content and write the single-page site
    Build,
    /// Validate content directory without building
    Check,
    /// Show which view a location resolves to
    Resolve {
        /// Location fragment, e.g. "#/blog/my-post"
        location: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            println!("==> Loading {}", cli.source.display());
            let site = scan::scan(&cli.source)?;
            output::print_check_output(&site);

            println!("==> Generating HTML → {}", cli.output.display());
            let report = generate::generate(&site, &cli.output)?;
            output::print_build_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = scan::scan(&cli.source)?;
            output::print_check_output(&site);
            println!("==> Content is valid");
        }
        Command::Resolve { location } => {
            let site = scan::scan(&cli.source)?;
            let route = route::resolve(&location, &site.blogs, &site.projects);
            output::print_resolve_output(&location, &route, &views::template_id(&route));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
