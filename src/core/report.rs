use crate::core::handler::SUCCESS_MESSAGE;
use crate::domain::model::{DispatchReport, DispatchSummary, SendRecord};
use crate::domain::ports::Storage;
use crate::utils::error::{DispatchError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Component, Path};

pub const REPORT_JSON: &str = "dispatch_report.json";
pub const REPORT_CSV: &str = "dispatch_report.csv";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportFile<'a> {
    success: bool,
    message: &'a str,
    generated_at: DateTime<Utc>,
    summary: &'a DispatchSummary,
    results: &'a [SendRecord],
}

const CSV_HEADER: [&str; 5] = ["email", "email_number", "success", "message_id", "error"];

#[derive(Serialize)]
struct ReportRow<'a> {
    email: &'a str,
    email_number: u8,
    success: bool,
    message_id: &'a str,
    error: &'a str,
}

fn render_csv(results: &[SendRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for record in results {
        writer.serialize(ReportRow {
            email: &record.email,
            email_number: record.email_number,
            success: record.success,
            message_id: record.message_id.as_deref().unwrap_or(""),
            error: record.error.as_deref().unwrap_or(""),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| DispatchError::IoError(e.into_error()))
}

/// Joins a report file name onto `dir`, keeping the result inside the storage
/// root. An empty or `/` dir means the root itself.
fn report_path(dir: &str, file_name: &str) -> Result<String> {
    let dir = Path::new(dir.trim_start_matches('/'));
    if dir
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(DispatchError::validation(format!(
            "Report directory must stay inside the workspace: {}",
            dir.display()
        )));
    }
    Ok(dir.join(file_name).to_string_lossy().into_owned())
}

/// Writes the JSON and CSV forms of a dispatch report and returns the paths
/// written, relative to the storage root.
pub async fn write_report<S: Storage>(
    storage: &S,
    dir: &str,
    report: &DispatchReport,
) -> Result<Vec<String>> {
    let json_path = report_path(dir, REPORT_JSON)?;
    let csv_path = report_path(dir, REPORT_CSV)?;

    let file = ReportFile {
        success: true,
        message: SUCCESS_MESSAGE,
        generated_at: Utc::now(),
        summary: &report.summary,
        results: &report.results,
    };
    storage
        .write_file(&json_path, &serde_json::to_vec_pretty(&file)?)
        .await?;
    storage
        .write_file(&csv_path, &render_csv(&report.results)?)
        .await?;

    tracing::info!("📁 Dispatch report written to {} and {}", json_path, csv_path);
    Ok(vec![json_path, csv_path])
}
