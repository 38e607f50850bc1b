use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rapport::config::load_mappings;
use rapport::{CancelSignal, PipelineBuilder, PipelineError, RapportConfig, Record, StoreError, TemplateStore, prepare};
use rapport_resource::FilesystemTemplateStore;
use std::fs;
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Renders field-service reports to office documents and PDF.
#[derive(Parser, Debug)]
#[command(name = "rapport", version, about)]
struct Cli {
    /// Configuration file (defaults to ./rapport.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Template directory, overriding the configuration.
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a record with a named template.
    Render {
        /// Record JSON file.
        #[arg(long)]
        record: PathBuf,
        /// Template name; `service` uses service.docx and service.html.
        #[arg(long)]
        template: String,
        /// Token mappings JSON file, replacing the configured defaults.
        #[arg(long)]
        mappings: Option<PathBuf>,
        /// Only produce the office document.
        #[arg(long)]
        no_pdf: bool,
        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Manage stored templates.
    Templates {
        #[command(subcommand)]
        action: TemplatesCommand,
    },
    /// Print the token map a record would be rendered with.
    Tokens {
        #[arg(long)]
        record: PathBuf,
        #[arg(long)]
        mappings: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TemplatesCommand {
    /// List stored templates.
    List,
    /// Store a template file under a name.
    Add { name: String, file: PathBuf },
    /// Delete a stored template.
    Delete { name: String },
}

fn read_record(path: &Path) -> Result<Record, PipelineError> {
    let text = fs::read_to_string(path)?;
    Ok(Record::from_json(&text)?)
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = RapportConfig::load_from(cli.config.as_deref())?;
    if let Some(dir) = cli.templates {
        config.templates.dir = dir;
    }

    match cli.command {
        Command::Render {
            record,
            template,
            mappings,
            no_pdf,
            out,
        } => {
            let pipeline = PipelineBuilder::from_config(&config)?.build()?;
            let record = read_record(&record)?;
            let mut request = pipeline.request(record, template);
            if let Some(path) = mappings {
                request = request.with_mappings(load_mappings(&path)?);
            }
            if no_pdf {
                request = request.with_pdf(false);
            }

            let cancel = CancelSignal::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted; cancelling the PDF render.");
                    on_interrupt.cancel();
                }
            });

            let report = pipeline.render_with_cancel(request, &cancel).await?;
            fs::create_dir_all(&out)?;

            let package_path = out.join(&report.package.file_name);
            fs::write(&package_path, &report.package.bytes)?;
            println!("Wrote {}", package_path.display());

            if let Some(pdf) = &report.pdf {
                let pdf_path = out.join(&pdf.file_name);
                fs::write(&pdf_path, &pdf.bytes)?;
                println!("Wrote {} ({} page(s))", pdf_path.display(), pdf.page_count);
            }
            if let Some(error) = &report.pdf_error {
                eprintln!("PDF was not produced: {error}");
            }
            for degraded in &report.normalization.degraded {
                eprintln!("Unplaced legacy item: {degraded:?}");
            }
        }
        Command::Templates { action } => {
            let store = FilesystemTemplateStore::open(&config.templates.dir)?;
            match action {
                TemplatesCommand::List => {
                    for info in store.list()? {
                        let modified = info
                            .modified_at
                            .map(|t| DateTime::<Utc>::from(t).format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        println!("{:<40} {:>10}  {}", info.name, info.size, modified);
                    }
                }
                TemplatesCommand::Add { name, file } => {
                    store.save(&name, fs::read(&file)?)?;
                    println!("Stored {name}");
                }
                TemplatesCommand::Delete { name } => {
                    if !store.delete(&name)? {
                        return Err(StoreError::NotFound(name).into());
                    }
                    println!("Deleted {name}");
                }
            }
        }
        Command::Tokens { record, mappings } => {
            let record = read_record(&record)?;
            let mappings = match mappings {
                Some(path) => load_mappings(&path)?,
                None => config.default_mappings()?,
            };
            let prepared = prepare(&record, &mappings, Utc::now());
            println!("{}", serde_json::to_string_pretty(&prepared.tokens)?);
        }
    }
    Ok(())
}
