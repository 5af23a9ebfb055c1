//! Axum route handlers for the Report API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::ModelId;
use crate::report::export::{export_report, ExportError, ExportFormat};
use crate::report::generator::{generate_report, ReportRequest, ReportResult};
use crate::report::outline::{parse_outline, Outline};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ParseOutlineRequest {
    pub outline: String,
}

#[derive(Debug, Serialize)]
pub struct ParseOutlineResponse {
    pub sections: Outline,
    pub total_words: u64,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub model: ModelId,
    pub report: String,
}

/// The generated report travels back from the client; the server keeps no copy.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub report: String,
    pub format: ExportFormat,
}

/// Raw form fields collected from the multipart body.
#[derive(Debug, Default)]
struct GenerateForm {
    file: Option<Bytes>,
    outline: String,
    instructions: String,
    model: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/outline/parse
///
/// Validates an outline without calling the provider.
pub async fn handle_parse_outline(
    Json(request): Json<ParseOutlineRequest>,
) -> Result<Json<ParseOutlineResponse>, AppError> {
    let sections = parse_outline(&request.outline)?;
    Ok(Json(ParseOutlineResponse {
        total_words: sections.total_words(),
        sections,
    }))
}

/// POST /api/v1/reports/generate
///
/// Multipart fields: `file` (UTF-8 text), `outline`, `instructions`, `model`.
/// Returns the report text, or an error; never both.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    let form = read_generate_form(multipart).await?;
    let request = build_report_request(form)?;

    let report_id = Uuid::new_v4();
    info!("Generating report {report_id}");

    match generate_report(state.completer.as_ref(), &request).await {
        ReportResult::Text(report) => {
            info!("Report {report_id} generated ({} chars)", report.len());
            Ok(Json(GenerateResponse {
                report_id,
                generated_at: Utc::now(),
                model: request.model,
                report,
            }))
        }
        ReportResult::Failure(reason) => Err(AppError::Remote(reason)),
    }
}

/// POST /api/v1/reports/export
///
/// Renders the supplied report as `report.docx` or `report.txt` and returns it
/// as a download.
pub async fn handle_export(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    if request.report.trim().is_empty() {
        return Err(AppError::MissingInput(
            "Generate a report before exporting it".to_string(),
        ));
    }

    let format = request.format;
    let report = request.report;

    let data = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
        let dir = tempfile::tempdir().map_err(ExportError::from)?;
        let path = export_report(&report, format, dir.path())?;
        Ok(std::fs::read(path).map_err(ExportError::from)?)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Export task failed: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        Bytes::from(data),
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Form helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_generate_form(mut multipart: Multipart) -> Result<GenerateForm, AppError> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;

        match name.as_str() {
            "file" => form.file = Some(data),
            "outline" => form.outline = field_text(&name, data)?,
            "instructions" => form.instructions = field_text(&name, data)?,
            "model" => form.model = Some(field_text(&name, data)?),
            _ => {}
        }
    }

    Ok(form)
}

fn field_text(name: &str, data: Bytes) -> Result<String, AppError> {
    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::Validation(format!("Field '{name}' must be UTF-8 text")))
}

/// Checks required inputs, parses the outline and resolves the model.
fn build_report_request(form: GenerateForm) -> Result<ReportRequest, AppError> {
    let file = form
        .file
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::MissingInput("Please upload a text file".to_string()))?;

    let outline = parse_outline(&form.outline)?;
    if outline.is_empty() {
        return Err(AppError::MissingInput(
            "Please provide a table of contents".to_string(),
        ));
    }

    let source_text = field_text("file", file)?;

    let model = match form.model.as_deref().map(str::trim) {
        None | Some("") => ModelId::default(),
        Some(value) => value.parse::<ModelId>().map_err(AppError::Validation)?,
    };

    Ok(ReportRequest {
        source_text,
        outline,
        custom_instructions: form.instructions,
        model,
    })
}
