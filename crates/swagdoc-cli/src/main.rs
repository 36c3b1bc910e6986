use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use swagdoc_core::config::{self, CONFIG_FILE_NAME, OutputFormat, SwagdocConfig, TargetKind};
use swagdoc_core::load::is_yaml_path;
use swagdoc_core::{Document, SchemaType};

#[derive(Parser)]
#[command(
    name = "swagdoc",
    about = "Swagger 2.0 / OpenAPI 3 document converter",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document between Swagger 2.0 and OpenAPI 3
    Convert(ConvertArgs),

    /// Check that a document parses and all references resolve
    Validate {
        /// Path to the document (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print a summary of the operations in a document
    Inspect {
        /// Path to the document (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: FormatArg,
    },

    /// Initialize a new swagdoc configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args, Default)]
struct ConvertArgs {
    /// Input document; defaults to the configured input
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file; stdout when neither this nor the config sets one
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Document version to emit
    #[arg(short, long)]
    target: Option<TargetArg>,

    /// Output encoding; inferred from the output extension when unset
    #[arg(short, long)]
    format: Option<FormatArg>,

    /// Keep operation IDs exactly as they are in the input
    #[arg(long)]
    keep_operation_ids: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    Swagger2,
    Openapi3,
    Auto,
}

impl From<TargetArg> for TargetKind {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Swagger2 => TargetKind::Swagger2,
            TargetArg::Openapi3 => TargetKind::Openapi3,
            TargetArg::Auto => TargetKind::Auto,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => {
            let cfg = try_load_config()?.unwrap_or_default();
            cmd_convert(args, &cfg)
        }

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Inspect { input, format } => cmd_inspect(&input, format.into()),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "swagdoc", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<SwagdocConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_document(path: &Path) -> Result<Document> {
    Document::from_file(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Renders `document` as `target` in the given encoding.
fn render(
    document: &mut Document,
    target: SchemaType,
    format: OutputFormat,
    pretty: bool,
    generate_ids: bool,
) -> Result<String> {
    if generate_ids {
        document.generate_operation_ids();
    }
    let value = document.to_value(target)?;
    let text = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(&value)? + "\n",
        OutputFormat::Json => serde_json::to_string(&value)? + "\n",
        OutputFormat::Yaml => serde_yaml_ng::to_string(&value)?,
    };
    Ok(text)
}

fn cmd_convert(args: ConvertArgs, cfg: &SwagdocConfig) -> Result<()> {
    let input = args.input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output = args.output.or_else(|| cfg.output.as_ref().map(PathBuf::from));
    let mut document = load_document(&input)?;

    let target = args
        .target
        .map(TargetKind::from)
        .unwrap_or(cfg.target)
        .resolve(document.schema_type);
    let format = match (args.format, &output) {
        (Some(format), _) => format.into(),
        (None, Some(path)) if is_yaml_path(path) => OutputFormat::Yaml,
        (None, Some(_)) => OutputFormat::Json,
        (None, None) => cfg.format,
    };
    let generate_ids = cfg.operation_ids.generate && !args.keep_operation_ids;
    log::info!(
        "converting {} from {} to {}",
        input.display(),
        document.schema_type,
        target
    );

    let text = render(&mut document, target, format, cfg.pretty, generate_ids)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {} document to {}", target, path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<()> {
    let document = load_document(input)?;
    let version = match document.schema_type {
        SchemaType::OpenApi3 => format!("OpenAPI {}", document.openapi),
        _ => format!("Swagger {}", document.swagger),
    };
    eprintln!("Valid {} document: {}", version, document.info.title);
    eprintln!("  Version: {}", document.info.version);
    eprintln!("  Paths: {}", document.paths.len());
    eprintln!("  Operations: {}", document.operations().count());
    eprintln!("  Schemas: {}", document.components.schemas.len());

    let checked = document.validate_references()?;
    eprintln!("  References: {checked}");

    for operation in document.operations() {
        operation.actual_parameters().with_context(|| {
            format!(
                "failed to resolve parameters of {} {}",
                operation.method.as_upper_str(),
                operation.path
            )
        })?;
    }

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: &Path, format: OutputFormat) -> Result<()> {
    let mut document = load_document(input)?;
    document.generate_operation_ids();
    let summary = build_inspect_summary(&document)?;

    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&summary)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn build_inspect_summary(document: &Document) -> Result<serde_json::Value> {
    let mut operations = Vec::new();
    for op in document.operations() {
        let parameters: Vec<serde_json::Value> = op
            .actual_parameters()?
            .into_iter()
            .map(|p| serde_json::json!({ "name": p.name, "in": p.kind }))
            .collect();
        let request_body: Option<Vec<&String>> = op
            .operation
            .request_body()
            .map(|body| body.content.keys().collect());
        operations.push(serde_json::json!({
            "operation_id": op.operation.operation_id,
            "method": op.method.as_upper_str(),
            "path": op.path,
            "parameters": parameters,
            "request_body": request_body,
            "success": op.success_response().map(|(code, _)| code),
            "consumes": op.actual_consumes(),
            "produces": op.actual_produces(),
        }));
    }

    Ok(serde_json::json!({
        "type": document.schema_type.to_string(),
        "info": {
            "title": document.info.title,
            "version": document.info.version,
        },
        "servers": document.servers.iter().map(|s| &s.url).collect::<Vec<_>>(),
        "host": document.host(),
        "base_path": document.base_path(),
        "schemes": document.schemes(),
        "schemas": document.components.schemas.keys().collect::<Vec<_>>(),
        "operations": operations,
    }))
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
