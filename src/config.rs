//! Layered configuration: an optional `rapport.toml` under `RAPPORT__*` environment
//! variables (`RAPPORT__ENGINE__MAX_INSTANCES=2`, `RAPPORT__TEMPLATES__DIR=...`).

use crate::error::PipelineError;
use rapport_render_browser::EngineConfig;
use rapport_render_core::RenderOptions;
use rapport_types::{Margins, PageSize, TokenMapping};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "rapport";
pub const ENV_PREFIX: &str = "RAPPORT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RapportConfig {
    pub templates: TemplatesConfig,
    pub render: RenderConfig,
    pub engine: EngineSettings,
    pub mappings: MappingsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub dir: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("templates"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Produce a PDF next to the package.
    pub pdf: bool,
    /// `a4`, `a3`, `letter` or `legal`.
    pub page_size: String,
    pub margins_mm: f32,
    pub print_background: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pdf: true,
            page_size: "a4".to_string(),
            margins_mm: 10.0,
            print_background: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
    pub grace_ms: u64,
    pub max_instances: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            program: engine.program,
            args: engine.args,
            timeout_secs: engine.timeout.as_secs(),
            grace_ms: engine.grace.as_millis() as u64,
            max_instances: num_cpus::get(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MappingsConfig {
    /// JSON file holding the default `[{token, path, default}]` list.
    pub file: Option<PathBuf>,
}

impl RapportConfig {
    /// Loads `rapport.toml` from the working directory if present, then the environment.
    pub fn load() -> Result<Self, PipelineError> {
        Self::load_from(None)
    }

    /// Loads from an explicit file (which must exist), then the environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self, PipelineError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };
        let config: RapportConfig = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("engine.args"),
            )
            .build()?
            .try_deserialize()?;
        log::debug!("[CONFIG] Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn render_options(&self) -> Result<RenderOptions, PipelineError> {
        let page_size = PageSize::from_name(&self.render.page_size).ok_or_else(|| {
            PipelineError::Config(format!("unknown page size '{}'", self.render.page_size))
        })?;
        if self.render.margins_mm.is_nan() || self.render.margins_mm < 0.0 {
            return Err(PipelineError::Config(format!(
                "margins_mm must be non-negative, got {}",
                self.render.margins_mm
            )));
        }
        Ok(RenderOptions {
            page_size,
            margins: Margins::uniform(self.render.margins_mm),
            print_background: self.render.print_background,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            program: self.engine.program.clone(),
            args: self.engine.args.clone(),
            timeout: Duration::from_secs(self.engine.timeout_secs),
            grace: Duration::from_millis(self.engine.grace_ms),
        }
    }

    /// Reads the configured default mappings, or none.
    pub fn default_mappings(&self) -> Result<Vec<TokenMapping>, PipelineError> {
        match &self.mappings.file {
            Some(path) => load_mappings(path),
            None => Ok(Vec::new()),
        }
    }
}

/// Reads a JSON array of token mappings.
pub fn load_mappings(path: &Path) -> Result<Vec<TokenMapping>, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read mappings from '{}': {}", path.display(), e),
        ))
    })?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_any_source() {
        let config = RapportConfig::default();
        assert_eq!(config.templates.dir, PathBuf::from("templates"));
        assert!(config.render.pdf);
        assert_eq!(config.engine.program, "chromium");
        assert!(config.engine.max_instances >= 1);
        assert_eq!(config.render_options().unwrap(), RenderOptions::default());
    }

    #[test]
    fn file_overrides_selected_values() {
        let file = write_toml(
            r#"
[templates]
dir = "/srv/templates"

[render]
page_size = "letter"
margins_mm = 15.0

[engine]
program = "/usr/bin/chromium-browser"
timeout_secs = 5
max_instances = 3
"#,
        );
        let config = RapportConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.templates.dir, PathBuf::from("/srv/templates"));
        assert!(config.render.pdf);

        let options = config.render_options().unwrap();
        assert_eq!(options.page_size, PageSize::Letter);
        assert_eq!(options.margins, Margins::uniform(15.0));

        let engine = config.engine_config();
        assert_eq!(engine.program, "/usr/bin/chromium-browser");
        assert_eq!(engine.timeout, Duration::from_secs(5));
        assert_eq!(engine.grace, Duration::from_secs(2));
        assert_eq!(config.engine.max_instances, 3);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = RapportConfig::load_from(Some(Path::new("/nonexistent/rapport.toml"))).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn unknown_page_size_is_rejected() {
        let mut config = RapportConfig::default();
        config.render.page_size = "b5".to_string();
        assert!(matches!(config.render_options(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn reads_mapping_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.json");
        std::fs::write(
            &path,
            r#"[{"token": "FOO", "path": "site.name", "default": "-"}, {"token": "FOO", "dataPath": "site.city"}]"#,
        )
        .unwrap();

        let mut config = RapportConfig::default();
        assert!(config.default_mappings().unwrap().is_empty());
        config.mappings.file = Some(path);
        let mappings = config.default_mappings().unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[1], TokenMapping::new("FOO", "site.city", ""));
    }
}
