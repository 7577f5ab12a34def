//! `solview render` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::Term;
use solview_artifact::{SolutionArtifact, decode_response};
use solview_config::{CliSettings, Config, DiagramMode};
use solview_diagrams::{EngineConfig, KrokiLoader, RichDiagramRenderer};
use solview_extract::CodeFenceExtractor;
use solview_renderer::{ArtifactPipeline, ViewModel, render_html};

use crate::error::CliError;
use crate::output::Output;

/// Output format of the rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// View model as pretty-printed JSON.
    Json,
    /// HTML fragment.
    Html,
}

/// Diagram display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Mode {
    /// Step list parsed from the flowchart.
    Structural,
    /// Engine-rendered diagram with source fallback.
    Rich,
}

impl From<Mode> for DiagramMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Structural => Self::Structural,
            Mode::Rich => Self::Rich,
        }
    }
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Artifact file to read (default: stdin, also with `-`).
    input: Option<PathBuf>,

    /// Treat input as a raw service response instead of artifact JSON.
    #[arg(long)]
    raw: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Diagram display mode (overrides config).
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Kroki server URL for rich diagram rendering (overrides config).
    #[arg(long, env = "SOLVIEW_KROKI_URL")]
    kroki_url: Option<String>,

    /// Language assumed for untagged code (overrides config).
    #[arg(long)]
    fallback_language: Option<String>,

    /// Path to configuration file (default: auto-discover solview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (show engine and fallback logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read, or
    /// the artifact JSON is invalid.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            mode: self.mode.map(Into::into),
            kroki_url: self.kroki_url,
            fallback_language: self.fallback_language,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::info!(
            mode = config.diagrams_resolved.mode.as_str(),
            config_path = ?config.config_path,
            "Configuration loaded"
        );

        let text = read_input(self.input.as_deref())?;
        let artifact = parse_artifact(&text, self.raw)?;
        let view = render_view(&config, &artifact, &output).await;

        let rendered = match self.format {
            Format::Json => serde_json::to_string_pretty(&view)?,
            Format::Html => render_html(&view),
        };
        Term::stdout().write_line(&rendered)?;

        if let ViewModel::Error { message, .. } = &view {
            output.warning(&format!("Artifact carries an error: {message}"));
        }
        Ok(())
    }
}

/// Read the input file, or stdin when no path (or `-`) is given.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Parse input as artifact JSON, or decode it as a raw service response.
fn parse_artifact(text: &str, raw: bool) -> Result<SolutionArtifact, CliError> {
    if text.trim().is_empty() {
        return Err(CliError::Validation("input is empty".to_owned()));
    }
    if raw {
        return Ok(decode_response(text));
    }
    Ok(serde_json::from_str(text)?)
}

async fn render_view(config: &Config, artifact: &SolutionArtifact, output: &Output) -> ViewModel {
    let pipeline = ArtifactPipeline::new(CodeFenceExtractor::new(
        config.code.fallback_language.clone(),
    ));
    let diagrams = &config.diagrams_resolved;

    match diagrams.mode {
        DiagramMode::Structural => pipeline.render(artifact),
        DiagramMode::Rich => {
            match &diagrams.kroki_url {
                Some(url) => output.info(&format!("Kroki URL: {url}")),
                None => output.warning("Diagram rendering: disabled (no kroki_url in config)"),
            }
            let loader = KrokiLoader::new(diagrams.kroki_url.clone()).timeout(diagrams.timeout);
            let engine_config = EngineConfig::default()
                .theme(diagrams.theme.as_str())
                .font_family(diagrams.font_family.as_str())
                .security_level(diagrams.security_level);
            let renderer = RichDiagramRenderer::with_config(loader, engine_config);
            pipeline.render_rich(artifact, &renderer).await
        }
    }
}
