use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use eframe::egui;

use crate::collector::Collect;
use crate::export;
use crate::models::{Platform, ResultSet};
use crate::scan::ScanWorker;

pub(crate) struct WifiKeysApp {
    platform: Platform,
    system_label: String,
    scanner: ScanWorker,
    results: ResultSet,
    selected: BTreeSet<usize>,
    status_line: String,
}

impl WifiKeysApp {
    pub(crate) fn new(platform: Platform, collector: Arc<dyn Collect>) -> Self {
        let system = export::SystemInfo::current();
        Self {
            platform,
            system_label: format!("OS: {} {}", system.os, system.version),
            scanner: ScanWorker::new(collector),
            results: ResultSet::default(),
            selected: BTreeSet::new(),
            status_line: "Ready".to_string(),
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status_line = status.into();
    }

    fn has_rows(&self) -> bool {
        !self.results.is_empty() && !self.results.is_error()
    }

    fn start_scan(&mut self, ctx: &egui::Context) {
        let ctx = ctx.clone();
        let started = self.scanner.start(move || ctx.request_repaint());
        self.on_scan_started(started);
    }

    fn on_scan_started(&mut self, started: io::Result<bool>) {
        match started {
            Ok(true) => {
                self.set_status(format!("Scanning Wi-Fi networks on {}...", self.platform))
            }
            Ok(false) => {}
            Err(err) => self.set_status(format!("Error: could not start scan: {err}")),
        }
    }

    fn poll_scan(&mut self) {
        let Some(results) = self.scanner.poll() else {
            return;
        };

        self.selected.clear();
        if results.is_error() {
            let message = results
                .get(0)
                .map(|r| r.secret.to_string())
                .unwrap_or_default();
            self.set_status(format!("Error: {message}"));
        } else {
            let keys = results.records().iter().filter(|r| r.secret.is_key()).count();
            self.set_status(format!(
                "Found {} Wi-Fi networks ({keys} with recovered keys)",
                results.len()
            ));
        }
        self.results = results;
    }

    fn export_csv(&mut self) {
        let Some(path) = save_dialog("Save Wi-Fi passwords as CSV", "CSV Files", "csv") else {
            return;
        };
        match export::export_csv(&self.results, &path) {
            Ok(()) => self.set_status(format!("Saved to {}", path.display())),
            Err(err) => self.set_status(format!("Error: {err}")),
        }
    }

    fn export_txt(&mut self) {
        let Some(path) = save_dialog("Save Wi-Fi passwords as text file", "Text Files", "txt")
        else {
            return;
        };
        match export::export_report(&self.results, &path) {
            Ok(()) => self.set_status(format!("Saved to {}", path.display())),
            Err(err) => self.set_status(format!("Error: {err}")),
        }
    }

    fn copy_selected(&mut self, ctx: &egui::Context) {
        if self.selected.is_empty() {
            self.set_status("No rows selected for copying");
            return;
        }

        let text = export::clipboard_text(self.selected.iter().filter_map(|&i| self.results.get(i)));
        ctx.copy_text(text);
        self.set_status(format!("Copied {} entries to clipboard", self.selected.len()));
    }

    fn toggle_row(&mut self, idx: usize, extend: bool) {
        if !extend {
            self.selected.clear();
            self.selected.insert(idx);
        } else if !self.selected.remove(&idx) {
            self.selected.insert(idx);
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        let scanning = self.scanner.is_running();
        let has_rows = self.has_rows();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!scanning, egui::Button::new("Scan Networks"))
                .clicked()
            {
                self.start_scan(ui.ctx());
            }
            if ui
                .add_enabled(has_rows, egui::Button::new("Export CSV"))
                .clicked()
            {
                self.export_csv();
            }
            if ui
                .add_enabled(has_rows, egui::Button::new("Export TXT"))
                .clicked()
            {
                self.export_txt();
            }
            if ui
                .add_enabled(has_rows, egui::Button::new("Copy Selected"))
                .clicked()
            {
                self.copy_selected(ui.ctx());
            }
            if scanning {
                ui.spinner();
            }
        });
    }

    fn draw_table(&mut self, ui: &mut egui::Ui) {
        let extend = ui.input(|i| i.modifiers.command || i.modifiers.shift);
        let mut clicked = None;

        egui::ScrollArea::both().show(ui, |ui| {
            egui::Grid::new("networks_grid")
                .num_columns(3)
                .striped(true)
                .show(ui, |ui| {
                    ui.strong("S.No.");
                    ui.strong("SSID");
                    ui.strong("Password");
                    ui.end_row();

                    for (idx, record) in self.results.records().iter().enumerate() {
                        let is_selected = self.selected.contains(&idx);
                        ui.label(record.seq.to_string());
                        if ui.selectable_label(is_selected, &record.name).clicked() {
                            clicked = Some(idx);
                        }
                        ui.label(record.secret.to_string());
                        ui.end_row();
                    }
                });
        });

        if let Some(idx) = clicked {
            self.toggle_row(idx, extend);
        }
    }
}

impl eframe::App for WifiKeysApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_scan();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.vertical_centered(|ui| ui.heading("Wi-Fi Password Retriever"));
            self.draw_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Status: {}", self.status_line));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(self.system_label.as_str());
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| self.draw_table(ui));
    }
}

fn save_dialog(title: &str, filter_name: &str, extension: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter(filter_name, &[extension])
        .set_file_name(export::default_file_name(extension, Local::now().date_naive()))
        .save_file()
}
