//! CLI logic for the DiagramCraft tool.
//!
//! Every subcommand drives a [`RenderSession`] with the Mermaid engine. The
//! session runs on a Tokio runtime owned by [`run`].

pub mod error_adapter;

mod args;
mod config;

pub use args::{
    Args, Command, ExportArgs, ExportFormat, GenerateArgs, KindsArgs, RenderArgs, WatchArgs,
};

use std::{fs, time::Duration};

use log::{debug, info, warn};
use tokio::{runtime::Runtime, signal, time};

use diagramcraft::{
    DiagramcraftError, GenerationRequest, HttpGenerator, KindInfo, MermaidEngine, RenderOutcome,
    RenderSession, Snapshot, Stage, catalog, config::AppConfig,
};
use diagramcraft_parser::{ParseError, error::Diagnostic, validate};

type Session = RenderSession<MermaidEngine>;

/// Run the DiagramCraft CLI application
///
/// # Errors
///
/// Returns `DiagramcraftError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Syntax errors in the description (with diagnostics)
/// - Rendering, export and generation errors
pub fn run(args: &Args) -> Result<(), DiagramcraftError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let runtime = Runtime::new()?;

    runtime.block_on(async {
        match &args.command {
            Command::Render(render_args) => render(render_args, &app_config).await,
            Command::Watch(watch_args) => watch(watch_args, &app_config).await,
            Command::Export(export_args) => export(export_args, &app_config).await,
            Command::Generate(generate_args) => generate(generate_args, &app_config).await,
            Command::Kinds(kinds_args) => kinds(kinds_args, &app_config).await,
        }
    })
}

fn new_session(config: &AppConfig) -> Result<Session, DiagramcraftError> {
    let engine = MermaidEngine::new(config.render())?;
    RenderSession::new(engine, config)
}

async fn render(args: &RenderArgs, config: &AppConfig) -> Result<(), DiagramcraftError> {
    info!(input_path = args.input, output_path = args.output; "Processing diagram");

    let source = fs::read_to_string(&args.input)?;
    let session = new_session(config)?;
    let version = session.replace(source.as_str(), args.kind);
    let snapshot = session.settled(version).await;

    match snapshot.outcome() {
        Some(RenderOutcome::Rendered { svg }) => {
            fs::write(&args.output, svg.as_bytes())?;
            info!(output_file = args.output; "SVG exported successfully");
            if let Some(png_path) = &args.png {
                write_png(&session, png_path, args.scale).await?;
            }
            Ok(())
        }
        Some(RenderOutcome::DocumentPreview { text }) => {
            info!(input_path = args.input; "Input is a document; showing it as read-only text");
            println!("{text}");
            Ok(())
        }
        _ => Err(outcome_error(&snapshot, &source)),
    }
}

async fn watch(args: &WatchArgs, config: &AppConfig) -> Result<(), DiagramcraftError> {
    let session = new_session(config)?;
    let mut snapshots = session.subscribe();

    let mut last_text = fs::read_to_string(&args.input)?;
    session.edit(last_text.as_str());

    let mut ticker = time::interval(Duration::from_millis(args.interval_ms.max(10)));
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(input_path = args.input, interval_ms = args.interval_ms; "Watching for changes (Ctrl-C to stop)");
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Stopping watch");
                return Ok(());
            }
            _ = ticker.tick() => {
                match tokio::fs::read_to_string(&args.input).await {
                    Ok(text) if text != last_text => {
                        let version = session.edit(text.as_str());
                        debug!(version:% = version; "Input changed");
                        last_text = text;
                    }
                    Ok(_) => {}
                    Err(err) => warn!(input_path = args.input, err:% = err; "Could not read input"),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let snapshot = snapshots.borrow_and_update().clone();
                publish(&session, &snapshot, args).await?;
            }
        }
    }
}

/// Write outputs for a settled snapshot seen while watching.
async fn publish(session: &Session, snapshot: &Snapshot, args: &WatchArgs) -> Result<(), DiagramcraftError> {
    match snapshot.outcome() {
        Some(RenderOutcome::Rendered { svg }) => {
            fs::write(&args.output, svg.as_bytes())?;
            info!(version:% = snapshot.version(), output_file = args.output; "SVG updated");
            if let Some(png_path) = &args.png {
                if let Err(err) = write_png(session, png_path, None).await {
                    warn!(err:% = err; "PNG not updated");
                }
            }
        }
        Some(RenderOutcome::SyntaxError(err)) => {
            warn!(version:% = snapshot.version(), err:% = err; "Syntax error");
        }
        Some(RenderOutcome::RenderError(err)) => {
            warn!(version:% = snapshot.version(), err:% = err; "Render error");
        }
        Some(RenderOutcome::DocumentPreview { .. }) => {
            info!(version:% = snapshot.version(); "Input is a document; nothing to render");
        }
        Some(RenderOutcome::Pending) | None => {}
    }
    Ok(())
}

async fn export(args: &ExportArgs, config: &AppConfig) -> Result<(), DiagramcraftError> {
    let source = fs::read_to_string(&args.input)?;
    let session = new_session(config)?;
    let version = session.edit(source.as_str());

    let artifact = match args.format {
        ExportFormat::Source => session.export_source(),
        ExportFormat::Png => {
            let snapshot = session.settled(version).await;
            if snapshot.stage() == Stage::SyntaxError {
                return Err(outcome_error(&snapshot, &source));
            }
            session.export_raster(args.scale).await?
        }
    };

    let path = args.output.as_deref().unwrap_or(artifact.file_name());
    fs::write(path, artifact.bytes())?;
    info!(output_file = path, bytes = artifact.bytes().len(); "Artifact written");
    Ok(())
}

async fn generate(args: &GenerateArgs, config: &AppConfig) -> Result<(), DiagramcraftError> {
    let mut generator_config = config.generator().clone();
    if let Some(server) = &args.server {
        generator_config = generator_config.with_base_url(server.as_str());
    }
    let generator = HttpGenerator::new(&generator_config)?;
    let request = GenerationRequest::new(args.prompt.as_str(), args.kind)?;

    info!(kind:% = args.kind, server = generator_config.base_url(); "Generating diagram");
    let session = new_session(config)?;
    let version = session.apply_generation(generator.generate(&request).await)?;

    let description = session.description();
    fs::write(&args.output, description.text())?;
    info!(output_file = args.output; "Description written");

    if let Some(svg_path) = &args.svg {
        let snapshot = session.settled(version).await;
        match snapshot.outcome() {
            Some(RenderOutcome::Rendered { svg }) => {
                fs::write(svg_path, svg.as_bytes())?;
                info!(output_file = svg_path; "SVG exported successfully");
            }
            Some(RenderOutcome::DocumentPreview { .. }) => {
                warn!(output_file = svg_path; "Generated a document; no SVG written");
            }
            _ => return Err(outcome_error(&snapshot, description.text())),
        }
    }
    Ok(())
}

async fn kinds(args: &KindsArgs, config: &AppConfig) -> Result<(), DiagramcraftError> {
    let entries: Vec<KindInfo> = match &args.server {
        Some(server) => {
            let generator_config = config.generator().clone().with_base_url(server.as_str());
            HttpGenerator::new(&generator_config)?.kinds().await?
        }
        None => catalog(),
    };

    for entry in &entries {
        println!(
            "{:<10} {:<10} {}",
            entry.kind.as_str(),
            entry.display_name,
            entry.description
        );
    }
    Ok(())
}

async fn write_png(
    session: &Session,
    path: &str,
    scale: Option<f32>,
) -> Result<(), DiagramcraftError> {
    let artifact = session.export_raster(scale).await?;
    fs::write(path, artifact.bytes())?;
    info!(output_file = path, bytes = artifact.bytes().len(); "PNG exported successfully");
    Ok(())
}

/// The error to report for a snapshot that has no rendering.
fn outcome_error(snapshot: &Snapshot, source: &str) -> DiagramcraftError {
    match snapshot.outcome() {
        Some(RenderOutcome::SyntaxError(err)) => {
            let parse_err = err
                .diagnostics()
                .cloned()
                .unwrap_or_else(|| ParseError::from(Diagnostic::error(err.message())));
            DiagramcraftError::new_parse_error(parse_err, source)
        }
        Some(RenderOutcome::RenderError(err)) => DiagramcraftError::Render(err.to_string()),
        // An empty description has no outcome; report why it cannot render.
        None => match validate(source) {
            Err(parse_err) => DiagramcraftError::new_parse_error(parse_err, source),
            Ok(_) => DiagramcraftError::Render(format!("nothing rendered ({})", snapshot.stage())),
        },
        Some(_) => DiagramcraftError::Render(format!("nothing rendered ({})", snapshot.stage())),
    }
}
