use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use citescope_core::{
    AppConfig, CitationResult, ExitCode, JsonFileStore, Preferences, SharedStore, StylePreference,
};
use citescope_science::commands::popup::FETCHING_MESSAGE;
use citescope_science::http::HttpClient;
use citescope_science::styles::StyleSource;
use citescope_science::{DetectedList, Options, PageContent, Popup, copy_citation};

mod clipboard;

use clipboard::SystemClipboard;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "citescope",
    about = "Find DOIs and PMIDs and turn them into formatted citations",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting CITESCOPE_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a citation for a DOI, a doi.org link or a PMID.
    Cite {
        input: String,
        /// Style for this lookup only (the saved preference is left alone).
        #[arg(long)]
        style: Option<String>,
        /// Copy the citation to the clipboard.
        #[arg(long)]
        copy: bool,
    },

    /// Detect DOIs and PMIDs in a page (file, stdin or URL).
    Scan {
        /// Text or HTML file; stdin when omitted.
        file: Option<String>,
        /// Fetch the page from this URL instead.
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,
        /// Treat the input as HTML.
        #[arg(long)]
        html: bool,
        /// Drop DOIs contained in longer matches unless they resolve.
        #[arg(long)]
        validate: bool,
        /// Fetch a citation for every detected identifier.
        #[arg(long)]
        resolve: bool,
        #[arg(long)]
        style: Option<String>,
    },

    /// List available citation styles.
    Styles {
        /// Ignore the cache and fetch the list again.
        #[arg(long)]
        refresh: bool,
    },

    /// Preferred citation style.
    Style {
        #[command(subcommand)]
        action: StyleAction,
    },

    /// Options page actions.
    Options {
        #[command(subcommand)]
        action: OptionsAction,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum StyleAction {
    /// Show the saved style.
    Get,
    /// Save a style as the preference.
    Set { name: String },
}

#[derive(Subcommand)]
enum OptionsAction {
    /// Reset the preferred style to the default.
    Reset,
    /// Fetch the style list again.
    Refresh,
    /// Show when the style list was last fetched.
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Show the config file path.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("CITESCOPE_LOG").unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let start = Instant::now();
    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("CITESCOPE_JSON").as_deref() == Ok("1");

    let config = AppConfig::load()?;
    let store = open_store(&config);
    debug!("config loaded in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    match cli.command {
        // ── Cite ───────────────────────────────────────────────────────────

        Commands::Cite { input, style, copy } => {
            let popup = Popup::new(&config, store)?;
            popup.open().await;
            if let Some(style) = style {
                popup.use_style(&style);
            }

            if !json_output {
                eprintln!("{FETCHING_MESSAGE}");
            }
            let result = popup.manual_fetch(&input).await;
            let copied = if copy { copy_to_clipboard(&result)? } else { None };

            if json_output {
                let outcome = if result.is_citation() { "ok" } else { "error" };
                print_json(&serde_json::json!({
                    "status": outcome,
                    "data": { "input": input, "style": popup.current_style(), "result": result, "copied": copied.is_some() },
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                println!("{}", result.text);
                if let Some(label) = copied {
                    eprintln!("{label}");
                }
            }

            if !result.is_citation() {
                std::process::exit(ExitCode::NotFound as i32);
            }
        }

        // ── Scan ───────────────────────────────────────────────────────────

        Commands::Scan { file, url, html, validate, resolve, style } => {
            let page = read_page(&config, file.as_deref(), url.as_deref(), html).await?;
            let popup = Popup::new(&config, store)?;
            if validate || resolve {
                popup.open().await;
            }
            if let Some(style) = style {
                popup.use_style(&style);
            }

            let detected = popup.auto_detect(&page, validate).await;
            let citations = if resolve {
                futures::future::join_all(detected.rows().map(|id| popup.activate(id))).await
            } else {
                Vec::new()
            };

            if json_output {
                let rows: Vec<_> = detected
                    .rows()
                    .enumerate()
                    .map(|(i, id)| serde_json::json!({ "identifier": id, "citation": citations.get(i) }))
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": rows, "total": rows.len() },
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                print_detected(&detected, &citations);
            }
        }

        // ── Styles ─────────────────────────────────────────────────────────

        Commands::Styles { refresh } => {
            if refresh {
                let status = Options::new(&config, store.clone())?.refresh_styles().await;
                if !status.ok {
                    eprintln!("{}", status.text);
                }
            }
            let popup = Popup::new(&config, store)?;
            let list = popup.open().await;

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": list,
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                if list.source == StyleSource::Fallback {
                    eprintln!("Style list unavailable, offering the default style only.");
                }
                for style in &list.styles {
                    let marker = if *style == list.selected { "*" } else { " " };
                    println!("{marker} {style}");
                }
            }
        }

        // ── Style preference ───────────────────────────────────────────────

        Commands::Style { action } => {
            let prefs = Preferences::new(store);
            match action {
                StyleAction::Get => {
                    let style = prefs.preferred_style()?.unwrap_or_else(|| {
                        StylePreference::new(&config.citation.default_style)
                    });
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"style":style}}))?;
                    } else {
                        println!("{}", style.as_str());
                    }
                }
                StyleAction::Set { name } => {
                    let known = prefs.style_cache()?.map(|c| c.styles.contains(&name));
                    if known == Some(false) {
                        eprintln!("Warning: {name} is not in the cached style list.");
                    }
                    prefs.set_preferred_style(&StylePreference::new(&name))?;
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"style":name}}))?;
                    } else {
                        println!("Preferred style: {name}");
                    }
                }
            }
        }

        // ── Options ────────────────────────────────────────────────────────

        Commands::Options { action } => {
            let options = Options::new(&config, store)?;
            let status = match action {
                OptionsAction::Reset => Some(options.reset_defaults()),
                OptionsAction::Refresh => Some(options.refresh_styles().await),
                OptionsAction::Status => None,
            };
            let last_updated = options.last_updated_text();

            if json_output {
                let outcome = if status.as_ref().is_none_or(|s| s.ok) { "ok" } else { "error" };
                print_json(&serde_json::json!({
                    "status": outcome,
                    "data": { "message": status, "last_updated": last_updated },
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                if let Some(status) = &status {
                    println!("{}", status.text);
                }
                println!("{last_updated}");
            }

            if status.is_some_and(|s| !s.ok) {
                std::process::exit(ExitCode::NetworkError as i32);
            }
        }

        // ── Config ─────────────────────────────────────────────────────────

        Commands::Config { action } => match action {
            ConfigAction::List => {
                if json_output {
                    print_json(&serde_json::to_value(&config)?)?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                println!("{}", AppConfig::config_path().display());
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn open_store(config: &AppConfig) -> SharedStore {
    Arc::new(JsonFileStore::open_or_empty(&config.storage_path()))
}

async fn read_page(
    config: &AppConfig,
    file: Option<&str>,
    url: Option<&str>,
    html: bool,
) -> Result<PageContent> {
    if let Some(url) = url {
        let client = HttpClient::new(
            &config.services.user_agent,
            Duration::from_secs(config.services.timeout_secs),
        )?;
        return Ok(PageContent::fetch(&client, url).await?);
    }

    let (contents, is_html) = match file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {path}"))?;
            let ext_html = Path::new(path)
                .extension()
                .is_some_and(|ext| ext == "html" || ext == "htm");
            (contents, html || ext_html)
        }
        None => {
            let mut contents = String::new();
            std::io::stdin().read_to_string(&mut contents)?;
            (contents, html)
        }
    };

    if is_html {
        Ok(PageContent::from_html(&contents)?)
    } else {
        Ok(PageContent::from_text(contents))
    }
}

fn print_detected(detected: &DetectedList, citations: &[CitationResult]) {
    if detected.is_empty() {
        println!("No DOIs or PMIDs found.");
        return;
    }

    let mut citations = citations.iter();
    for (heading, rows) in [
        (DetectedList::DOI_HEADING, &detected.dois),
        (DetectedList::PMID_HEADING, &detected.pmids),
    ] {
        if rows.is_empty() {
            continue;
        }
        println!("{heading}");
        for id in rows {
            println!("  {}", id.label());
            if let Some(result) = citations.next() {
                for line in result.text.lines() {
                    println!("      {line}");
                }
            }
        }
    }
}

fn copy_to_clipboard(result: &CitationResult) -> Result<Option<&'static str>> {
    if !result.copy_visible {
        return Ok(None);
    }
    let mut clipboard = SystemClipboard::open()?;
    Ok(copy_citation(result, &mut clipboard)?)
}
