// src/pipeline/builder.rs
use super::orchestrator::ReportPipeline;
use crate::config::RapportConfig;
use crate::error::PipelineError;
use rapport_render_browser::{BrowserRenderer, EngineConfig, EnginePool, ProcessEngine, RenderEngine};
use rapport_render_core::RenderOptions;
use rapport_resource::FilesystemTemplateStore;
use rapport_traits::TemplateStore;
use rapport_types::TokenMapping;
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a [`ReportPipeline`].
pub struct PipelineBuilder {
    store: Option<Arc<dyn TemplateStore>>,
    engine: Option<Arc<dyn RenderEngine>>,
    engine_config: EngineConfig,
    max_instances: usize,
    default_mappings: Vec<TokenMapping>,
    options: RenderOptions,
    pdf: bool,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            store: None,
            engine: None,
            engine_config: EngineConfig::default(),
            max_instances: num_cpus::get(),
            default_mappings: Vec::new(),
            options: RenderOptions::default(),
            pdf: true,
        }
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Applies every setting of a loaded configuration, including the template
    /// directory and the default mappings file.
    pub fn from_config(config: &RapportConfig) -> Result<Self, PipelineError> {
        Ok(Self::new()
            .with_template_dir(&config.templates.dir)?
            .with_engine_config(config.engine_config())
            .with_max_instances(config.engine.max_instances)
            .with_render_options(config.render_options()?)
            .with_pdf(config.render.pdf)
            .with_default_mappings(config.default_mappings()?))
    }

    pub fn with_store(mut self, store: Arc<dyn TemplateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses a directory of template files, creating it if needed.
    pub fn with_template_dir<P: AsRef<Path>>(self, path: P) -> Result<Self, PipelineError> {
        let store = FilesystemTemplateStore::open(path)?;
        Ok(self.with_store(Arc::new(store)))
    }

    /// Replaces the process engine, e.g. with a different HTML-to-PDF backend.
    pub fn with_engine(mut self, engine: Arc<dyn RenderEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Launch settings for the default process engine. Ignored with [`with_engine`](Self::with_engine).
    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    /// Upper bound on concurrently running engine instances.
    pub fn with_max_instances(mut self, max_instances: usize) -> Self {
        self.max_instances = max_instances;
        self
    }

    pub fn with_default_mappings(mut self, mappings: Vec<TokenMapping>) -> Self {
        self.default_mappings = mappings;
        self
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_pdf(mut self, pdf: bool) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn build(self) -> Result<ReportPipeline, PipelineError> {
        let store = self.store.ok_or_else(|| {
            PipelineError::Config(
                "No template store has been configured. Use `with_template_dir` or `with_store`."
                    .to_string(),
            )
        })?;
        let engine: Arc<dyn RenderEngine> = match self.engine {
            Some(engine) => engine,
            None => Arc::new(ProcessEngine::new(self.engine_config)),
        };
        log::info!(
            "[PIPELINE] Using {} with {} engine ({} instance(s))",
            store.name(),
            engine.name(),
            self.max_instances.max(1)
        );
        let browser = BrowserRenderer::new(EnginePool::new(engine, self.max_instances));
        Ok(ReportPipeline::new(
            store,
            browser,
            self.default_mappings,
            self.options,
            self.pdf,
        ))
    }
}
