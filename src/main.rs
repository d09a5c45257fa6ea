use clap::{Parser, Subcommand};
use hyperpage::config::{self, SiteConfig};
use hyperpage::dispatch::Dispatcher;
use hyperpage::markdown::Cmark;
use hyperpage::page::PageContent;
use hyperpage::script::ScriptPayload;
use hyperpage::store::FsStore;
use hyperpage::{document, listing, naming, output};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Redirect hops `render --follow` takes before giving up.
const MAX_REDIRECT_HOPS: usize = 8;

fn version_string() -> &'static str {
    let hash = env!("HYPERPAGE_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "hyperpage")]
#[command(about = "Resolve and render one page of a hypermedia site")]
#[command(long_about = "\
Resolve and render one page of a hypermedia site

The content directory is the site. A navigated path resolves to a file, a
directory, or nothing:

  /docs/        → docs/index.html, then docs/index.md, then a listing of docs/
  /docs/a.md    → docs/a.md

Files render by extension:

  png jpg jpeg gif svg webp   image embed
  mp4 webm mov                video player
  mp3 ogg                     audio player
  pdf doc docx zip rar        download link
  goto                        redirect to the `href` in its metadata
  md html                     page content (markdown converted, scripts re-activated)
  anything else               plain text

Entry metadata lives in a hidden `.meta.toml` in each directory:

  [\"notes.md\"]
  title = \"Field notes\"
  description = \"Things I wrote down\"

  [\"elsewhere.goto\"]
  href = \"/notes.md\"

Run 'hyperpage gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Log pipeline decisions to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a navigated path as an HTML document
    Render {
        /// Navigated path, e.g. `/` or `/notes/today.md`
        path: String,
        /// Print only the rendered view, without the document shell
        #[arg(long)]
        fragment: bool,
        /// Wait for a scheduled redirect and render its target instead
        #[arg(long)]
        follow: bool,
        /// List the re-activated scripts instead of printing the page
        #[arg(long, conflicts_with = "fragment")]
        scripts: bool,
    },
    /// Show which resource backs a path and how it would render
    Resolve {
        path: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List a directory the way a listing page shows it
    Ls {
        #[arg(default_value = "/")]
        path: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    // -v forces debug, otherwise RUST_LOG or warn
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render {
            path,
            fragment,
            follow,
            scripts,
        } => {
            let config = config::load_config(&cli.source)?;
            let dispatcher = dispatcher(&cli.source, &config);
            let mut page = PageContent::new(dispatcher, Vec::<ScriptPayload>::new());

            page.render(&path)?;
            if follow {
                follow_redirects(&mut page, path)?;
            }

            let rendered = page.current().ok_or("nothing was rendered")?;
            if scripts {
                output::print_scripts(&rendered.scripts);
            } else if fragment {
                println!("{}", rendered.body.0);
            } else {
                let doc = document::render_document(rendered, page.is_loading(), &config);
                println!("{}", doc.into_string());
            }
        }
        Command::Resolve { path, json } => {
            let config = config::load_config(&cli.source)?;
            let (resolution, strategy) = dispatcher(&cli.source, &config).classify(&path);
            if json {
                let value = serde_json::json!({
                    "path": path,
                    "resolution": resolution,
                    "strategy": strategy,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                output::print_resolution(&path, &resolution, strategy);
            }
        }
        Command::Ls { path, json } => {
            let config = config::load_config(&cli.source)?;
            let store = FsStore::new(&cli.source);
            let converter = Cmark::new(&config.markdown);
            let listing =
                listing::build_listing(&store, &converter, &path, &config.listing.readme_names)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                output::print_listing(&listing);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn dispatcher(source: &std::path::Path, config: &SiteConfig) -> Dispatcher<FsStore, Cmark> {
    Dispatcher::new(
        FsStore::new(source),
        Cmark::new(&config.markdown),
        config.clone(),
    )
}

/// Keep rendering redirect targets until a page schedules no redirect.
///
/// Only same-site targets are followed.
fn follow_redirects(
    page: &mut PageContent<FsStore, Cmark, Vec<ScriptPayload>>,
    mut path: String,
) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 0..MAX_REDIRECT_HOPS {
        let Some(due) = page.next_redirect_due() else {
            return Ok(());
        };
        std::thread::sleep(due.saturating_duration_since(Instant::now()));
        let Some(target) = page.poll_redirect(Instant::now()) else {
            return Ok(());
        };
        let Some(next) = naming::resolve_href(&path, &target) else {
            tracing::warn!(href = %target, "not following a redirect that leaves the site");
            return Ok(());
        };
        tracing::info!(from = %path, to = %next, "following redirect");
        page.render(&next)?;
        path = next;
    }
    if page.scheduled_redirect().is_some() {
        tracing::warn!(hops = MAX_REDIRECT_HOPS, "stopped following redirects");
    }
    Ok(())
}
