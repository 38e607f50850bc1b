#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use lopdf::{Document, Object, dictionary};
use rapport::{
    CancelSignal, PipelineBuilder, Record, RenderEngine, RenderError, RenderOptions, ReportPipeline,
};
use rapport_render_docx::Package;
use rapport_traits::InMemoryTemplateStore;
use std::sync::{Arc, Mutex};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn legacy_record() -> Record {
    Record::from_json(fixtures::LEGACY_RECORD).unwrap()
}

/// A store holding `service.docx` and `service.html`.
pub fn service_store() -> InMemoryTemplateStore {
    InMemoryTemplateStore::new()
        .with("service.docx", fixtures::service_docx())
        .unwrap()
        .with("service.html", fixtures::SERVICE_HTML.as_bytes().to_vec())
        .unwrap()
}

pub fn pipeline_with(store: InMemoryTemplateStore, engine: Arc<dyn RenderEngine>) -> ReportPipeline {
    PipelineBuilder::new()
        .with_store(Arc::new(store))
        .with_engine(engine)
        .with_max_instances(2)
        .build()
        .unwrap()
}

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

/// Paragraph texts of a rendered package's main document, line breaks as `\n`.
pub fn document_paragraphs(package: &[u8]) -> Vec<String> {
    let package = Package::read(package).unwrap();
    let xml = std::str::from_utf8(package.part("word/document.xml").unwrap()).unwrap();
    xml.split("</w:p>")
        .filter_map(|chunk| chunk.find("<w:p>").map(|start| text_of(&chunk[start..])))
        .collect()
}

fn text_of(fragment: &str) -> String {
    let mut out = String::new();
    let mut in_text = false;
    let mut rest = fragment;
    while let Some(open) = rest.find('<') {
        if in_text {
            out.push_str(&rest[..open]);
        }
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        let tag = &rest[open + 1..open + close];
        if tag == "w:t" || tag.starts_with("w:t ") {
            in_text = true;
        } else if tag == "/w:t" {
            in_text = false;
        } else if tag.starts_with("w:br") {
            out.push('\n');
        }
        rest = &rest[open + close + 1..];
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Returns a fixed PDF and records the HTML it was given.
#[derive(Debug)]
pub struct StubEngine {
    pub pages: usize,
    pub seen: Mutex<Vec<String>>,
}

impl StubEngine {
    pub fn new(pages: usize) -> Arc<Self> {
        Arc::new(Self {
            pages,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RenderEngine for StubEngine {
    async fn render_pdf(
        &self,
        html: &str,
        _options: &RenderOptions,
        _cancel: &CancelSignal,
    ) -> Result<Vec<u8>, RenderError> {
        self.seen.lock().unwrap().push(html.to_string());
        Ok(blank_pdf(self.pages))
    }

    fn name(&self) -> &'static str {
        "StubEngine"
    }
}

#[derive(Debug)]
pub struct FailingEngine;

#[async_trait]
impl RenderEngine for FailingEngine {
    async fn render_pdf(
        &self,
        _html: &str,
        _options: &RenderOptions,
        _cancel: &CancelSignal,
    ) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::RenderEngine("browser crashed".to_string()))
    }

    fn name(&self) -> &'static str {
        "FailingEngine"
    }
}

/// Never finishes on its own; only cancellation ends a render.
#[derive(Debug)]
pub struct HangingEngine;

#[async_trait]
impl RenderEngine for HangingEngine {
    async fn render_pdf(
        &self,
        _html: &str,
        _options: &RenderOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<u8>, RenderError> {
        cancel.cancelled().await;
        Err(RenderError::Cancelled)
    }

    fn name(&self) -> &'static str {
        "HangingEngine"
    }
}
