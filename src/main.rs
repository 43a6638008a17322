use clap::{Parser, Subcommand};
use curly::{config, report, seed, site};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "curly")]
#[command(about = "Static site generator for flat attribute-file content")]
#[command(long_about = "\
Static site generator for flat attribute-file content

Your filesystem is the data source. Each directory under content/ is one
page; its files are the page's attributes. Templates are plain text with
{placeholder} tokens and nothing else.

Working root structure:

  templates/page.tpl           # Page template: {title}, {body}, ...
  blocks/header.tpl            # Shared fragment, merged into every page
  collections/category.tpl     # Category listing ({{CATEGORY}} marker)
  content/
  └── first-post/
      ├── template.setting     # Template name (absent = page skipped)
      ├── category.val         # Category name (absent = not indexed)
      ├── title.val            # Attribute \"title\"
      └── body.val             # Attribute \"body\"
  build/                       # Output: <id>.html, <category>.{json,html}
  config.toml                  # Optional: directory names, pool sizes

Value precedence: template defaults < page attributes < blocks.

Run 'curly seed' to generate a buildable demo corpus.")]
#[command(version)]
struct Cli {
    /// Working root containing templates/, content/, blocks/, collections/
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render all pages and category indexes into the build directory
    Build {
        /// Also report each generated file, not just warnings and errors
        #[arg(long)]
        verbose: bool,
    },
    /// Validate the working root without writing anything
    Check,
    /// Generate a buildable demo corpus
    Seed {
        /// Number of content pages to generate
        #[arg(long, default_value_t = 8)]
        pages: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { verbose } => {
            let config = config::load_config(&cli.root)?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if verbose || !report::is_verbose_only(&event) {
                        println!("{}", report::format_event(&event));
                    }
                }
            });

            let reporter = Some(tx);
            let summary = site::build(&cli.root, &config, &reporter)?;
            drop(reporter);
            printer.join().unwrap();

            println!("{}", report::format_summary(&summary));
        }
        Command::Check => {
            let config = config::load_config(&cli.root)?;
            println!("==> Checking {}", cli.root.display());
            let report = site::check(&cli.root, &config)?;
            println!("{} pages, {} blocks", report.pages, report.blocks);
            println!("==> Content is valid");
        }
        Command::Seed { pages } => {
            let report = seed::seed(&cli.root, pages)?;
            println!(
                "Seeded {} pages in {}",
                report.pages,
                cli.root.join("content").display()
            );
        }
    }

    Ok(())
}
