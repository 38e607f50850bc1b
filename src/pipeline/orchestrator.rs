// src/pipeline/orchestrator.rs
use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rapport_normalize::{NormalizationReport, normalize};
use rapport_render_browser::{BrowserRenderer, CancelSignal, RenderedPdf};
use rapport_render_core::{PackageOutput, PdfOutput, RenderError, RenderOptions, output_file_name};
use rapport_render_docx::PackageRenderer;
use rapport_tokens::{TokenMap, build_token_map};
use rapport_traits::{TemplateKind, TemplateStore, template_file_name};
use rapport_types::{Record, TokenMapping};
use rapport_view::build_view_model;
use serde_json::Value;
use std::sync::Arc;

/// One report to render.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub record: Record,
    /// Template name without extension; `service` resolves to `service.docx` and
    /// `service.html`.
    pub template: String,
    /// Replaces the pipeline's default mappings when set.
    pub mappings: Option<Vec<TokenMapping>>,
    pub options: RenderOptions,
    /// Also render the HTML template to PDF.
    pub pdf: bool,
}

impl RenderRequest {
    pub fn new(record: Record, template: impl Into<String>) -> Self {
        Self {
            record,
            template: template.into(),
            mappings: None,
            options: RenderOptions::default(),
            pdf: true,
        }
    }

    pub fn with_mappings(mut self, mappings: Vec<TokenMapping>) -> Self {
        self.mappings = Some(mappings);
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_pdf(mut self, pdf: bool) -> Self {
        self.pdf = pdf;
        self
    }
}

/// The outputs of one request. A missing PDF with `pdf_error` set is still a
/// successful render of the package.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub package: PackageOutput,
    pub pdf: Option<PdfOutput>,
    pub pdf_error: Option<String>,
    pub normalization: NormalizationReport,
}

/// Everything derived from a record before any template is touched.
#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub normalization: NormalizationReport,
    pub view: Value,
    pub tokens: TokenMap,
    pub generated_at: DateTime<Utc>,
}

/// Normalizes `record`, builds its view model and its token map. Never fails.
pub fn prepare(record: &Record, mappings: &[TokenMapping], generated_at: DateTime<Utc>) -> PreparedReport {
    let normalized = normalize(record);
    for degraded in &normalized.report.degraded {
        warn!("[PIPELINE] Report '{}': {:?}", record.report_number, degraded);
    }
    let view = build_view_model(&normalized.record, generated_at);
    let tokens = build_token_map(&view, mappings);
    debug!(
        "[PIPELINE] Prepared report '{}' ({} tokens)",
        record.report_number,
        tokens.len()
    );
    PreparedReport {
        normalization: normalized.report,
        view,
        tokens,
        generated_at,
    }
}

/// Strips a trailing `.docx` or `.html` so both template kinds can be addressed
/// from either file name.
pub fn template_stem(name: &str) -> &str {
    for kind in [TemplateKind::Package, TemplateKind::Html] {
        let suffix = format!(".{}", kind.extension());
        let Some(split) = name.len().checked_sub(suffix.len()) else {
            continue;
        };
        if split > 0
            && name.is_char_boundary(split)
            && name[split..].eq_ignore_ascii_case(&suffix)
        {
            return &name[..split];
        }
    }
    name
}

/// Renders reports against one template store.
#[derive(Debug, Clone)]
pub struct ReportPipeline {
    store: Arc<dyn TemplateStore>,
    package: Arc<PackageRenderer>,
    browser: BrowserRenderer,
    default_mappings: Vec<TokenMapping>,
    default_options: RenderOptions,
    default_pdf: bool,
}

impl ReportPipeline {
    pub(crate) fn new(
        store: Arc<dyn TemplateStore>,
        browser: BrowserRenderer,
        default_mappings: Vec<TokenMapping>,
        default_options: RenderOptions,
        default_pdf: bool,
    ) -> Self {
        Self {
            store,
            package: Arc::new(PackageRenderer::new()),
            browser,
            default_mappings,
            default_options,
            default_pdf,
        }
    }

    pub fn store(&self) -> &Arc<dyn TemplateStore> {
        &self.store
    }

    pub fn default_mappings(&self) -> &[TokenMapping] {
        &self.default_mappings
    }

    /// A request carrying this pipeline's configured page geometry and PDF setting.
    pub fn request(&self, record: Record, template: impl Into<String>) -> RenderRequest {
        RenderRequest::new(record, template)
            .with_options(self.default_options)
            .with_pdf(self.default_pdf)
    }

    /// The token map `record` would be rendered with.
    pub fn tokens(&self, record: &Record, mappings: Option<&[TokenMapping]>) -> TokenMap {
        let mappings = mappings.unwrap_or(&self.default_mappings);
        prepare(record, mappings, Utc::now()).tokens
    }

    pub async fn render(&self, request: RenderRequest) -> Result<RenderedReport, PipelineError> {
        self.render_with_cancel(request, &CancelSignal::new()).await
    }

    /// Renders the package and, if requested, the PDF concurrently.
    ///
    /// A missing package template fails the request, and a package failure cancels
    /// the PDF still in flight. Any PDF failure, including cancellation, is
    /// reported in [`RenderedReport::pdf_error`].
    pub async fn render_with_cancel(
        &self,
        request: RenderRequest,
        cancel: &CancelSignal,
    ) -> Result<RenderedReport, PipelineError> {
        let RenderRequest {
            record,
            template,
            mappings,
            options,
            pdf,
        } = request;
        let mappings = mappings.as_deref().unwrap_or(&self.default_mappings);
        let prepared = prepare(&record, mappings, Utc::now());
        let generated_at = prepared.generated_at;
        let stem = template_stem(&template);

        let package_template = self
            .store
            .load(&template_file_name(stem, TemplateKind::Package))
            .map_err(RenderError::from)?;
        info!(
            "[PIPELINE] Rendering report '{}' with template '{}' (pdf: {})",
            record.report_number, stem, pdf
        );

        let view = Arc::new(prepared.view);
        // Cancelled when the package fails, releasing the PDF's pool slot.
        let pdf_cancel = cancel.child();
        let package_task = {
            let renderer = Arc::clone(&self.package);
            let view = Arc::clone(&view);
            let tokens = prepared.tokens;
            let pdf_cancel = &pdf_cancel;
            async move {
                let result = tokio::task::spawn_blocking(move || {
                    renderer.render(&package_template, &view, &tokens)
                })
                .await;
                if !matches!(result, Ok(Ok(_))) {
                    pdf_cancel.cancel();
                }
                result
            }
        };
        let pdf_task = async {
            if pdf {
                Some(self.render_pdf(stem, &view, &options, &pdf_cancel).await)
            } else {
                None
            }
        };
        let (package_result, pdf_result) = tokio::join!(package_task, pdf_task);

        let package_bytes = package_result
            .map_err(|e| RenderError::Package(format!("package render task failed: {e}")))??;
        let package = PackageOutput {
            file_name: output_file_name(&record.report_number, generated_at, "docx"),
            bytes: package_bytes,
            generated_at,
        };

        let (pdf, pdf_error) = match pdf_result {
            None => (None, None),
            Some(Ok(rendered)) => (
                Some(PdfOutput {
                    file_name: output_file_name(&record.report_number, generated_at, "pdf"),
                    bytes: rendered.bytes,
                    generated_at,
                    page_count: rendered.page_count,
                }),
                None,
            ),
            Some(Err(e)) => {
                warn!(
                    "[PIPELINE] PDF for report '{}' failed; returning the package only: {}",
                    record.report_number, e
                );
                (None, Some(e.to_string()))
            }
        };

        Ok(RenderedReport {
            package,
            pdf,
            pdf_error,
            normalization: prepared.normalization,
        })
    }

    /// Runs [`render`](Self::render) on a fresh current-thread runtime.
    ///
    /// Must not be called from within an async context.
    pub fn render_blocking(&self, request: RenderRequest) -> Result<RenderedReport, PipelineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.render(request))
    }

    async fn render_pdf(
        &self,
        stem: &str,
        view: &Value,
        options: &RenderOptions,
        cancel: &CancelSignal,
    ) -> Result<RenderedPdf, RenderError> {
        let template = self.store.load(&template_file_name(stem, TemplateKind::Html))?;
        self.browser.render(&template, view, options, cancel).await
    }
}
