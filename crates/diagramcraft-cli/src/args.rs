//! Command-line argument definitions for the DiagramCraft CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global options select the configuration file and logging
//! verbosity; each subcommand drives one use of the render session.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use diagramcraft::DiagramKind;

/// Command-line arguments for the DiagramCraft tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and render a description once
    Render(RenderArgs),
    /// Re-render a description every time the file changes
    Watch(WatchArgs),
    /// Write the source or PNG artifact of a description
    Export(ExportArgs),
    /// Generate a description from a prompt and render it
    Generate(GenerateArgs),
    /// List the available diagram kinds
    Kinds(KindsArgs),
}

#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Path to the input description
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Also write a PNG to this path
    #[arg(long)]
    pub png: Option<String>,

    /// Raster scale; defaults to the configured export scale
    #[arg(long)]
    pub scale: Option<f32>,

    /// Diagram kind the description is expected to be
    #[arg(long)]
    pub kind: Option<DiagramKind>,
}

#[derive(ClapArgs, Debug)]
pub struct WatchArgs {
    /// Path to the description being edited
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Also write a PNG to this path
    #[arg(long)]
    pub png: Option<String>,

    /// How often to check the input for changes, in milliseconds
    #[arg(long, default_value_t = 300)]
    pub interval_ms: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// The description text (`.mmd`)
    Source,
    /// The rendered diagram as PNG
    Png,
}

#[derive(ClapArgs, Debug)]
pub struct ExportArgs {
    /// Path to the input description
    pub input: String,

    #[arg(long, value_enum)]
    pub format: ExportFormat,

    /// Output path; defaults to the configured artifact file name
    #[arg(short, long)]
    pub output: Option<String>,

    /// Raster scale; defaults to the configured export scale
    #[arg(long)]
    pub scale: Option<f32>,
}

#[derive(ClapArgs, Debug)]
pub struct GenerateArgs {
    /// Natural-language description of the diagram
    #[arg(long)]
    pub prompt: String,

    #[arg(long, default_value = "flowchart")]
    pub kind: DiagramKind,

    /// Generator API base URL; overrides the configuration
    #[arg(long)]
    pub server: Option<String>,

    /// Where to write the generated description
    #[arg(short, long, default_value = "diagram.mmd")]
    pub output: String,

    /// Also render the description to this SVG path
    #[arg(long)]
    pub svg: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct KindsArgs {
    /// Fetch the catalog from this generator instead of the built-in list
    #[arg(long)]
    pub server: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_render_with_kind() {
        let args = Args::parse_from([
            "diagramcraft",
            "--log-level",
            "debug",
            "render",
            "flow.mmd",
            "--kind",
            "gitGraph",
            "--png",
            "flow.png",
        ]);

        assert_eq!(args.log_level, "debug");
        let Command::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(render.input, "flow.mmd");
        assert_eq!(render.output, "out.svg");
        assert_eq!(render.kind, Some(DiagramKind::GitGraph));
        assert_eq!(render.png.as_deref(), Some("flow.png"));
    }

    #[test]
    fn test_export_format() {
        let args = Args::parse_from(["diagramcraft", "export", "a.mmd", "--format", "png"]);
        let Command::Export(export) = args.command else {
            panic!("expected export");
        };
        assert_eq!(export.format, ExportFormat::Png);
        assert_eq!(export.output, None);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(
            Args::try_parse_from(["diagramcraft", "generate", "--prompt", "x", "--kind", "venn"])
                .is_err()
        );
    }
}
