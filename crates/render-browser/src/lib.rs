//! HTML report rendering to PDF.
//!
//! An HTML template is compiled with handlebars against the view model, given a
//! print stylesheet for the requested page geometry, and handed to an
//! out-of-process [`RenderEngine`] through a bounded [`EnginePool`]. The bytes
//! that come back are checked to be a loadable PDF before they are returned.

pub mod cancel;
pub mod engine;
pub mod pool;
pub mod template;

pub use cancel::CancelSignal;
pub use engine::{EngineConfig, ProcessEngine, RenderEngine};
pub use pool::EnginePool;
pub use template::{HtmlTemplater, inject_print_css, print_css};

use log::{debug, info};
use rapport_render_core::{RenderError, RenderOptions, inspect_pdf};
use serde_json::Value;
use std::sync::Arc;

/// A validated PDF and its page count.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

#[derive(Debug, Clone)]
pub struct BrowserRenderer {
    templater: Arc<HtmlTemplater>,
    pool: EnginePool,
}

impl BrowserRenderer {
    pub fn new(pool: EnginePool) -> Self {
        Self {
            templater: Arc::new(HtmlTemplater::new()),
            pool,
        }
    }

    /// A renderer backed by [`ProcessEngine`] with the given launch settings.
    pub fn with_process_engine(config: EngineConfig, max_instances: usize) -> Self {
        let engine: Arc<dyn RenderEngine> = Arc::new(ProcessEngine::new(config));
        Self::new(EnginePool::new(engine, max_instances))
    }

    pub fn pool(&self) -> &EnginePool {
        &self.pool
    }

    /// Renders `template` (UTF-8 HTML bytes) to a PDF.
    pub async fn render(
        &self,
        template: &[u8],
        view: &Value,
        options: &RenderOptions,
        cancel: &CancelSignal,
    ) -> Result<RenderedPdf, RenderError> {
        let template = std::str::from_utf8(template)
            .map_err(|e| RenderError::syntax(format!("HTML template is not UTF-8: {e}")))?;
        let html = self.templater.compile(template, view, options)?;
        debug!("[ENGINE] compiled HTML ({} bytes)", html.len());

        let bytes = self.pool.render(&html, options, cancel).await?;
        let page_count = inspect_pdf(&bytes)?;
        info!("[ENGINE] rendered PDF: {} page(s), {} bytes", page_count, bytes.len());
        Ok(RenderedPdf { bytes, page_count })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::cancel::CancelSignal;
    use crate::engine::RenderEngine;
    use async_trait::async_trait;
    use lopdf::{Document, Object, dictionary};
    use rapport_render_core::{RenderError, RenderOptions};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    pub fn blank_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                })
                .into()
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    /// Sleeps, then returns a one-page PDF. Tracks concurrent and total calls.
    #[derive(Debug)]
    pub struct SlowEngine {
        delay: Duration,
        running: AtomicUsize,
        pub peak: AtomicUsize,
        pub calls: AtomicUsize,
    }

    impl SlowEngine {
        pub fn new(delay: Duration) -> Self {
            Self {
                delay,
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RenderEngine for SlowEngine {
        async fn render_pdf(
            &self,
            _html: &str,
            _options: &RenderOptions,
            _cancel: &CancelSignal,
        ) -> Result<Vec<u8>, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(blank_pdf(1))
        }

        fn name(&self) -> &'static str {
            "SlowEngine"
        }
    }

    /// Records the HTML it receives and returns fixed bytes.
    #[derive(Debug)]
    pub struct RecordingEngine {
        pub output: Vec<u8>,
        pub seen: Mutex<Vec<String>>,
    }

    impl RecordingEngine {
        pub fn new(output: Vec<u8>) -> Self {
            Self {
                output,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RenderEngine for RecordingEngine {
        async fn render_pdf(
            &self,
            html: &str,
            _options: &RenderOptions,
            _cancel: &CancelSignal,
        ) -> Result<Vec<u8>, RenderError> {
            self.seen.lock().unwrap().push(html.to_string());
            Ok(self.output.clone())
        }

        fn name(&self) -> &'static str {
            "RecordingEngine"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingEngine, blank_pdf};
    use serde_json::json;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn renderer(engine: Arc<RecordingEngine>) -> BrowserRenderer {
        BrowserRenderer::new(EnginePool::new(engine, 2))
    }

    #[tokio::test]
    async fn compiles_and_validates() {
        init_logger();
        let engine = Arc::new(RecordingEngine::new(blank_pdf(2)));
        let view = json!({ "reportNumber": "SR-1", "checklistText": { "optics": "1. Reflector" } });

        let pdf = renderer(engine.clone())
            .render(
                b"<html><head></head><body>{{reportNumber}} {{checklistText.optics}}</body></html>",
                &view,
                &RenderOptions::default(),
                &CancelSignal::new(),
            )
            .await
            .unwrap();

        assert_eq!(pdf.page_count, 2);
        let seen = engine.seen.lock().unwrap();
        assert!(seen[0].contains("<body>SR-1 1. Reflector</body>"));
        assert!(seen[0].contains("<style data-print>@page"));
    }

    #[tokio::test]
    async fn non_pdf_output_is_an_engine_failure() {
        let engine = Arc::new(RecordingEngine::new(b"<html>oops</html>".to_vec()));
        let err = renderer(engine)
            .render(b"<p/>", &json!({}), &RenderOptions::default(), &CancelSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::RenderEngine(_)));
    }

    #[tokio::test]
    async fn truncated_pdf_is_an_engine_failure() {
        let mut bytes = blank_pdf(1);
        bytes.truncate(20);
        let engine = Arc::new(RecordingEngine::new(bytes));
        let err = renderer(engine)
            .render(b"<p/>", &json!({}), &RenderOptions::default(), &CancelSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::RenderEngine(_)));
    }

    #[tokio::test]
    async fn bad_template_never_reaches_the_engine() {
        let engine = Arc::new(RecordingEngine::new(blank_pdf(1)));
        let err = renderer(engine.clone())
            .render(b"{{#each x}}", &json!({}), &RenderOptions::default(), &CancelSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateSyntax { .. }));
        assert!(engine.seen.lock().unwrap().is_empty());
    }
}
