use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::error::ExportError;
use crate::models::{NetworkRecord, ResultSet};

const CSV_HEADER: [&str; 3] = ["S.No.", "SSID", "Password"];
const REPORT_TITLE: &str = "Wi-Fi Password Report";
const REPORT_RULE_WIDTH: usize = 60;

/// Host description printed in the text report header.
#[derive(Clone, Debug)]
pub(crate) struct SystemInfo {
    pub(crate) os: String,
    pub(crate) version: String,
}

impl SystemInfo {
    pub(crate) fn current() -> Self {
        let info = os_info::get();
        Self {
            os: info.os_type().to_string(),
            version: info.version().to_string(),
        }
    }
}

pub(crate) fn write_csv<W: Write>(results: &ResultSet, writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for record in results.records() {
        csv.write_record([
            record.seq.to_string(),
            record.name.clone(),
            record.secret.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub(crate) fn write_report<W: Write>(
    results: &ResultSet,
    system: &SystemInfo,
    generated: NaiveDateTime,
    mut out: W,
) -> Result<(), ExportError> {
    writeln!(out, "{REPORT_TITLE}")?;
    writeln!(out, "Generated: {}", generated.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "System: {} {}", system.os, system.version)?;
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(REPORT_RULE_WIDTH))?;
    for record in results.records() {
        writeln!(out, "{}. {}: {}", record.seq, record.name, record.secret)?;
    }
    out.flush()?;
    Ok(())
}

pub(crate) fn export_csv(results: &ResultSet, path: &Path) -> Result<(), ExportError> {
    if results.is_empty() {
        return Err(ExportError::Empty);
    }
    let file = File::create(path)?;
    write_csv(results, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows = results.len(), "wrote csv export");
    Ok(())
}

pub(crate) fn export_report(results: &ResultSet, path: &Path) -> Result<(), ExportError> {
    if results.is_empty() {
        return Err(ExportError::Empty);
    }
    let file = File::create(path)?;
    write_report(
        results,
        &SystemInfo::current(),
        Local::now().naive_local(),
        BufWriter::new(file),
    )?;
    tracing::info!(path = %path.display(), rows = results.len(), "wrote text report");
    Ok(())
}

pub(crate) fn clipboard_text<'a>(records: impl IntoIterator<Item = &'a NetworkRecord>) -> String {
    records
        .into_iter()
        .map(|r| format!("SSID: {}, Password: {}", r.name, r.secret))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `WiFi_Passwords_YYYYMMDD.<extension>`
pub(crate) fn default_file_name(extension: &str, date: NaiveDate) -> String {
    format!("WiFi_Passwords_{}.{extension}", date.format("%Y%m%d"))
}
