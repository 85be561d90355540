mod app;
mod collector;
mod config;
mod dbus;
mod error;
mod export;
mod models;
mod parse;
mod runner;
mod scan;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use app::WifiKeysApp;
use collector::{Collect, Collector};
use config::Config;
use models::ResultSet;

const APP_TITLE: &str = "Wi-Fi Password Retriever";

/// Lists saved Wi-Fi networks and the keys the operating system will disclose.
#[derive(Debug, Parser)]
#[command(name = "wifi-keys", version, about)]
struct Cli {
    /// TOML settings file.
    #[arg(long, env = "WIFI_KEYS_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Collect as if running on this platform instead of the build target.
    #[arg(long, value_parser = ["windows", "macos", "linux"])]
    platform: Option<String>,

    /// Print the table to stdout instead of opening a window.
    #[arg(long)]
    no_gui: bool,

    /// Write a CSV export (implies --no-gui).
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Write a text report (implies --no-gui).
    #[arg(long, value_name = "PATH")]
    txt: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config.as_deref().map(Config::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(platform) = cli.platform.clone() {
        config.platform = Some(platform);
    }

    let collector = Collector::new(config.platform(), config);
    tracing::debug!(platform = %collector.platform(), "collector ready");

    if cli.no_gui || cli.csv.is_some() || cli.txt.is_some() {
        run_headless(&cli, &collector)
    } else {
        run_gui(collector)
    }
}

fn run_gui(collector: Collector) -> ExitCode {
    let platform = collector.platform().clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    let run = eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(WifiKeysApp::new(platform, Arc::new(collector))))),
    );

    if let Err(err) = run {
        eprintln!("failed to start GUI: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run_headless(cli: &Cli, collector: &dyn Collect) -> ExitCode {
    if headless_scan(cli, collector, &mut std::io::stdout().lock()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Prints the table and writes the requested exports. Returns `false` when
/// the scan produced an error record or an export failed.
fn headless_scan(cli: &Cli, collector: &dyn Collect, out: &mut impl Write) -> bool {
    let results = collector
        .collect()
        .unwrap_or_else(|err| ResultSet::from_error(&err));
    if let Err(err) = out.write_all(format_table(&results).as_bytes()) {
        tracing::warn!(error = %err, "failed to print results");
    }

    if results.is_error() {
        return false;
    }

    let mut ok = true;
    if let Some(path) = &cli.csv {
        if let Err(err) = export::export_csv(&results, path) {
            eprintln!("failed to write {}: {err}", path.display());
            ok = false;
        }
    }
    if let Some(path) = &cli.txt {
        if let Err(err) = export::export_report(&results, path) {
            eprintln!("failed to write {}: {err}", path.display());
            ok = false;
        }
    }
    ok
}

fn format_table(results: &ResultSet) -> String {
    let name_width = results
        .records()
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once("SSID".len()))
        .max()
        .unwrap_or_default();

    let mut table = format!("{:>5}  {:<name_width$}  Password\n", "S.No.", "SSID");
    for record in results.records() {
        table.push_str(&format!(
            "{:>5}  {:<name_width$}  {}\n",
            record.seq, record.name, record.secret
        ));
    }
    table
}
