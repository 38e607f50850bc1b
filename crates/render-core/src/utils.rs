use crate::error::RenderError;
use chrono::{DateTime, Utc};

/// Download name for a rendered artifact: `<slug(report number)>-<yyyymmdd>.<ext>`.
pub fn output_file_name(report_number: &str, generated_at: DateTime<Utc>, extension: &str) -> String {
    let mut stem = slug::slugify(report_number);
    if stem.is_empty() {
        stem = "report".to_string();
    }
    format!("{}-{}.{}", stem, generated_at.format("%Y%m%d"), extension)
}

/// Parses PDF bytes and returns the page count. Zero pages is an error.
pub fn inspect_pdf(bytes: &[u8]) -> Result<usize, RenderError> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(RenderError::RenderEngine(
            "engine output is not a PDF document".to_string(),
        ));
    }
    let document = lopdf::Document::load_mem(bytes)?;
    let pages = document.get_pages().len();
    if pages == 0 {
        return Err(RenderError::RenderEngine("engine produced a PDF with no pages".to_string()));
    }
    Ok(pages)
}
