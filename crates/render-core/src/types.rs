use chrono::{DateTime, Utc};
use rapport_types::{Margins, PageSize};

/// Page geometry for paginated output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub page_size: PageSize,
    pub margins: Margins,
    /// Print CSS backgrounds and colours.
    pub print_background: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margins: Margins::default(),
            print_background: true,
        }
    }
}

/// A merged office-document package.
#[derive(Debug, Clone)]
pub struct PackageOutput {
    pub bytes: Vec<u8>,
    pub generated_at: DateTime<Utc>,
    pub file_name: String,
}

/// A rendered PDF.
#[derive(Debug, Clone)]
pub struct PdfOutput {
    pub bytes: Vec<u8>,
    pub generated_at: DateTime<Utc>,
    pub page_count: usize,
    pub file_name: String,
}
