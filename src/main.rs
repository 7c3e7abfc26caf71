//! `leximind` command line: drive the search page from a terminal.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;
use url::Url;

use leximind::config::{load_settings, Settings};
use leximind::shell::Theme;
use leximind::storage::FileStore;
use leximind::upload::FileRef;
use leximind::{
    App, AppOptions, Effect, HttpTransport, Navigation, Page, SubmitOutcome, Transport, UiEvent,
};

#[derive(Parser)]
#[command(name = "leximind", version, about = "LexiMind document search from the terminal")]
struct Cli {
    /// Override the data directory
    #[arg(long, global = true, env = "LEXIMIND_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit text or a PDF and list the matching documents
    Search {
        /// Text to search with (cannot be combined with --file)
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,
        /// PDF to upload
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Page URL (defaults to the configured page_url)
        #[arg(long)]
        url: Option<String>,
        /// similarity-desc, similarity-asc, name-asc or name-desc
        #[arg(long)]
        sort: Option<String>,
        /// Minimum similarity score, 0 to 1
        #[arg(long)]
        min_score: Option<String>,
    },
    /// List the results on a saved page or a live URL
    View {
        /// HTML file or URL
        source: String,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        min_score: Option<String>,
    },
    /// Show or toggle the persisted theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },
    /// Clear page state and print the reset location
    Reset {
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings().await;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    settings
        .ensure_directories()
        .with_context(|| format!("creating {}", settings.data_dir.display()))?;

    match cli.command {
        Commands::Search {
            text,
            file,
            url,
            sort,
            min_score,
        } => cmd_search(&settings, text, file, url, sort, min_score).await,
        Commands::View {
            source,
            sort,
            min_score,
        } => cmd_view(&settings, &source, sort, min_score).await,
        Commands::Theme { toggle } => cmd_theme(&settings, toggle),
        Commands::Reset { url } => cmd_reset(&settings, url).await,
    }
}

fn options(settings: &Settings) -> AppOptions {
    AppOptions::new()
        .with_store(FileStore::new(settings.local_storage_path()))
        .with_exclusivity(settings.input_exclusivity)
}

async fn load_page(transport: &HttpTransport, url: &Url) -> Result<Page> {
    let response = transport
        .fetch(url)
        .await
        .with_context(|| format!("loading {}", url))?;
    if !response.is_success() {
        bail!("{} answered HTTP {}", url, response.status);
    }
    Ok(Page::parse(&response.body, Some(response.url))?)
}

async fn cmd_search(
    settings: &Settings,
    text: Option<String>,
    file: Option<PathBuf>,
    url: Option<String>,
    sort: Option<String>,
    min_score: Option<String>,
) -> Result<()> {
    let transport = HttpTransport::from_settings(settings)?;
    let url = Url::parse(url.as_deref().unwrap_or(&settings.page_url))?;
    let mut app = App::boot(load_page(&transport, &url).await?, options(settings))?;

    if let Some(path) = file {
        let file = FileRef::from_path(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        app.dispatch(UiEvent::FileChosen(file));
    }
    if let Some(text) = text {
        app.dispatch(UiEvent::TextInput(text));
    }

    let outcome = app.submit(&transport).await;
    report_effects(&mut app);
    match outcome {
        SubmitOutcome::Swapped => {}
        SubmitOutcome::Reloaded => {
            println!("{}", style("Server returned a full page, reloading").dim());
            app = App::boot(load_page(&transport, &url).await?, options(settings))?;
        }
        SubmitOutcome::Blocked | SubmitOutcome::Failed => return Ok(()),
    }

    apply_view(&mut app, sort, min_score);
    print_results(&app);
    Ok(())
}

async fn cmd_view(
    settings: &Settings,
    source: &str,
    sort: Option<String>,
    min_score: Option<String>,
) -> Result<()> {
    let page = match Url::parse(source) {
        Ok(url) if url.scheme().starts_with("http") => {
            let transport = HttpTransport::from_settings(settings)?;
            load_page(&transport, &url).await?
        }
        _ => {
            let html = std::fs::read_to_string(source)
                .with_context(|| format!("reading {}", source))?;
            Page::parse(&html, None)?
        }
    };
    let mut app = App::boot(page, options(settings))?;
    apply_view(&mut app, sort, min_score);
    print_results(&app);
    Ok(())
}

fn cmd_theme(settings: &Settings, toggle: bool) -> Result<()> {
    let mut store = FileStore::new(settings.local_storage_path());
    let mut theme = Theme::load(&store)?;
    if toggle {
        theme = theme.toggled();
        theme.save(&mut store)?;
    }
    println!("{} {}", theme.icon(), style(theme.as_str()).bold());
    Ok(())
}

async fn cmd_reset(settings: &Settings, url: Option<String>) -> Result<()> {
    let transport = HttpTransport::from_settings(settings)?;
    let url = Url::parse(url.as_deref().unwrap_or(&settings.page_url))?;
    let mut app = App::boot(load_page(&transport, &url).await?, options(settings))?;
    app.reset();
    report_effects(&mut app);
    Ok(())
}

fn apply_view(app: &mut App, sort: Option<String>, min_score: Option<String>) {
    if let Some(min_score) = min_score {
        app.dispatch(UiEvent::FilterChanged(min_score));
    }
    if let Some(sort) = sort {
        app.dispatch(UiEvent::SortChanged(sort));
    }
}

fn report_effects(app: &mut App) {
    for effect in app.take_effects() {
        match effect {
            Effect::Alert(message) => println!("{} {}", style("!").yellow().bold(), message),
            Effect::Navigate(Navigation::Reload) => {
                println!("{}", style("Page reload requested").dim())
            }
            Effect::Navigate(Navigation::To(url)) => {
                println!("{} {}", style("Navigate to").dim(), style(url).cyan())
            }
            Effect::ManualCopy(text) => println!("{}", text),
            Effect::OpenFilePicker => {}
        }
    }
}

fn print_results(app: &App) {
    let results = app.results();
    if results.current_len() == 0 {
        println!("{}", style("No results").yellow());
        return;
    }
    for (position, item) in results.current().enumerate() {
        println!(
            "{:>4}  {:>5.1}%  {}",
            style(format!("#{}", position + 1)).cyan(),
            item.score * 100.0,
            style(&item.title).bold()
        );
    }
    println!(
        "{}",
        style(format!(
            "Showing {} of {} results",
            results.current_len(),
            results.original().len()
        ))
        .dim()
    );
}
