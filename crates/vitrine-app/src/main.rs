//! Vitrine headless driver.
//!
//! Loads an HTML page, installs the standard widget set, replays an optional
//! event script and prints the resulting document to stdout.
//!
//! ```text
//! vitrine-app <page.html> [script] [--config site.toml] [--store prefs.json]
//!             [--location URL] [--reduced-motion]
//! ```

mod script;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use vitrine_dom::parse_html;
use vitrine_types::config::SiteConfig;
use vitrine_widgets::Page;
use vitrine_widgets::host::JsonFileStore;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "vitrine-app")]
#[command(about = "Load a page, install the standard widgets, replay an event script")]
#[command(version)]
struct Args {
    /// HTML page to load
    page: PathBuf,

    /// Event script to replay (one command per line)
    script: Option<PathBuf>,

    /// Site configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file backing stored preferences
    #[arg(long)]
    store: Option<PathBuf>,

    /// Page URL, for active-link and analytics domain detection
    #[arg(long)]
    location: Option<String>,

    /// Report a reduced-motion preference to the widgets
    #[arg(long)]
    reduced_motion: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };

    let html = std::fs::read_to_string(&args.page)?;
    let doc = parse_html(&html);
    log::info!(
        "Loaded {} ({} nodes)",
        args.page.display(),
        doc.nodes.len()
    );

    let mut page = Page::new(doc).with_reduced_motion(args.reduced_motion);
    if let Some(location) = &args.location {
        page.set_location(location);
    }
    if let Some(path) = &args.store {
        page = page.with_store(JsonFileStore::open(path)?);
    }
    page.install_standard(&config)?;
    log::info!("Widgets: {}", page.widget_names().join(", "));

    if let Some(path) = &args.script {
        let text = std::fs::read_to_string(path)?;
        let commands = script::parse_script(&text)?;
        log::info!("Replaying {} commands", commands.len());
        script::run(&mut page, &commands)?;
    }

    println!("{}", page.to_html());
    Ok(())
}
