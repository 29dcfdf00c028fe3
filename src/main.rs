//! report-export - pick document-store fields, preview rows, export files
//!
//! This is the main entry point. Without a subcommand it runs the
//! terminal interface; `export` runs the same pipeline headless.

mod action;
mod app;
mod cli;
mod component;
mod components;
mod config;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::cli::{Cli, Command, ExportArgs};
use crate::component::Component;
use crate::config::{load_reports_file, Config};
use crate::logging::{default_log_file, init_logging, LogConfig};
use crate::model::field::FieldNode;
use crate::model::report::ReportDefinition;
use crate::model::selection::SelectionList;
use crate::services::client::DocumentStore;
use crate::services::{export, schema};
use crate::tui::Tui;
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use crossterm::event::Event;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone();
    let mut config = match &config_path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    if let (Some(config), Some(url)) = (config.as_mut(), cli.base_url.as_ref()) {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    let extra_reports = match &cli.reports {
        Some(path) => load_reports_file(path)?,
        None => Vec::new(),
    };

    match cli.command {
        Some(Command::Export(args)) => {
            let log = LogConfig::from_verbosity(cli.verbose)
                .with_log_file(cli.log_file.clone())
                .with_ansi(true);
            init_logging(&log)?;
            let config = config.ok_or_else(|| {
                anyhow!("no configuration found; run the interface once or pass --config")
            })?;
            let path = run_headless(&config, &extra_reports, args)?;
            println!("{}", path.display());
            Ok(())
        }
        None => {
            let log = LogConfig::from_verbosity(cli.verbose)
                .with_log_file(cli.log_file.clone().or_else(default_log_file));
            init_logging(&log)?;
            run_interactive(config, config_path, extra_reports)
        }
    }
}

/// Fetch and encode one report without the terminal interface
fn run_headless(
    config: &Config,
    extra_reports: &[ReportDefinition],
    args: ExportArgs,
) -> Result<PathBuf> {
    let store = app::connect(config)?;
    export_with_store(store.as_ref(), config, extra_reports, args)
}

/// Headless export against an already connected store
///
/// Columns go through the same `SelectionList` the dialog uses, so a key
/// named twice is exported once.
fn export_with_store(
    store: &dyn DocumentStore,
    config: &Config,
    extra_reports: &[ReportDefinition],
    args: ExportArgs,
) -> Result<PathBuf> {
    let catalogue = config.catalogue(extra_reports);
    let report = catalogue
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(args.report.trim()))
        .ok_or_else(|| anyhow!("unknown report '{}'", args.report))?;

    let fields = schema::fetch_fields(store, report)
        .with_context(|| format!("loading fields of {}", report.entity))?;
    let titles: HashMap<String, String> = fields
        .iter()
        .flat_map(|node| node.leaves())
        .map(|leaf| (leaf.key.clone(), leaf.title.clone()))
        .collect();

    let mut selection = SelectionList::new();
    for key in args.fields.iter().map(|key| key.trim()).filter(|key| !key.is_empty()) {
        let title = titles.get(key).map(String::as_str).unwrap_or(key);
        if selection.add_field(&FieldNode::leaf(key, title)) == 0 {
            warn!(field = key, "Field listed twice, keeping the first");
        }
    }
    if selection.is_empty() {
        bail!("no fields given; pass --fields with at least one field key");
    }

    let dir = args.out.unwrap_or_else(|| config.export_dir.clone());
    info!(report = %report.name, columns = selection.len(), "Headless export");
    let path = export::run_export(
        store,
        report,
        selection.entries(),
        args.format.into(),
        &dir,
    )
    .map_err(|err| anyhow!(err.user_message()))?;
    Ok(path)
}

fn run_interactive(
    config: Option<Config>,
    config_path: Option<PathBuf>,
    extra_reports: Vec<ReportDefinition>,
) -> Result<()> {
    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    let mut app = App::new(config, config_path, extra_reports);
    app.init()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    if let Err(err) = result {
        error!(error = ?err, "Application error");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                error!(error = %e, "Draw error");
            }
        })?;

        if let Some(event) = tui.next_event()? {
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Mouse(mouse) => app.handle_mouse_event(mouse)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Action might produce a follow-up action
            let mut current_action = action;
            while let Some(a) = current_action {
                current_action = app.update(a)?;
            }
        } else {
            // No event - send a tick to poll jobs and expire notifications
            app.update(Action::Tick)?;
        }
    }

    Ok(())
}
