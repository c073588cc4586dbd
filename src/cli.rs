use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Route composer - compose declarative route manifests into a resource tree or OpenAPI document
#[derive(Parser, Debug)]
#[command(name = "route-composer")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Route manifest file, or a directory of manifests to merge
    #[arg(value_name = "MANIFEST_PATH")]
    pub manifest_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// What to render: the composed resource tree or an OpenAPI document
    #[arg(short = 'r', long = "render", value_enum, default_value = "openapi")]
    pub render: RenderMode,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Rendered artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderMode {
    /// OpenAPI 3.0 document with integration extensions
    Openapi,
    /// Resource tree and request models as composed
    Tree,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!(
            "Manifest path does not exist: {}",
            args.manifest_path.display()
        );
    }

    info!("Manifest path: {}", args.manifest_path.display());
    info!("Render: {:?}", args.render);
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Produce the rendered output text for `args` without writing it anywhere
pub fn render(args: &CliArgs) -> Result<String> {
    use crate::manifest::RouteManifest;
    use crate::openapi::OpenApiBuilder;
    use crate::registry::compose;
    use crate::serializer::{serialize_json, serialize_yaml};

    // Step 1: Load manifests
    info!("Loading route manifests...");
    let manifest = RouteManifest::load(&args.manifest_path)?;
    let input = manifest.into_input()?;
    info!(
        "Loaded {} route(s) and {} parameter key(s)",
        input.routes.len(),
        input.parameters.len()
    );

    if input.routes.is_empty() {
        warn!("No routes declared in the manifest");
    }

    // Step 2: Compose
    info!("Composing routes...");
    let api = compose(&input.routes, &input.parameters)?;

    // Step 3: Render and serialize
    info!("Serializing {:?} to {:?} format...", args.render, args.output_format);
    let content = match args.render {
        RenderMode::Openapi => {
            let document = OpenApiBuilder::new().with_settings(&input.api).build(&api);
            match args.output_format {
                OutputFormat::Yaml => serialize_yaml(&document)?,
                OutputFormat::Json => serialize_json(&document)?,
            }
        }
        RenderMode::Tree => match args.output_format {
            OutputFormat::Yaml => serialize_yaml(&api)?,
            OutputFormat::Json => serialize_json(&api)?,
        },
    };

    info!("Summary:");
    info!("  - Operations: {}", api.tree().operation_count());
    info!("  - Resource nodes: {}", api.tree().node_count());
    info!("  - Request models: {}", api.models().len());

    Ok(content)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::serializer::write_to_file;

    info!("Starting route composition...");
    let content = render(&args)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote output to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Composition complete!");
    Ok(())
}
