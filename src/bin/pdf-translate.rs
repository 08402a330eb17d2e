//! CLI binary for pdf-translate.
//!
//! A thin shim over the library crate that maps CLI flags to `ClientConfig`,
//! feeds the given files through the browse or drop path, submits once and
//! renders every view on the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_translate::{
    ClientConfig, Presenter, SelectedFile, Severity, SubmissionController, TranslationDirection,
    UiState, View,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal presenter using indicatif ───────────────────────────────────────

/// Draws each [`View`] on stderr: a spinner while `Busy`, one coloured line
/// per status message otherwise.
struct TerminalPresenter {
    spinner: Mutex<Option<ProgressBar>>,
    last: Mutex<Option<View>>,
    quiet: bool,
}

impl TerminalPresenter {
    fn new(quiet: bool) -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
            last: Mutex::new(None),
            quiet,
        })
    }

    fn start_spinner(&self, label: &str, message: &str) {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.spinner.lock().unwrap_or_else(|e| e.into_inner()) = Some(bar);
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.spinner.lock().unwrap_or_else(|e| e.into_inner()).take() {
            bar.finish_and_clear();
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&self, view: &View) {
        let previous = self
            .last
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(view.clone());

        if view.state == UiState::Busy {
            if !self.quiet && previous.as_ref().map(|p| p.state) != Some(UiState::Busy) {
                let message = view.message.as_ref().map(|m| m.text.as_str()).unwrap_or("");
                self.start_spinner(&view.trigger.label, message);
            }
            return;
        }
        self.stop_spinner();

        if let Some(name) = &view.file_name {
            let changed = previous.as_ref().and_then(|p| p.file_name.as_ref()) != Some(name);
            if changed && !self.quiet {
                eprintln!("{} {}", cyan("◆"), dim(&format!("Selected {name}")));
            }
        }

        let message_changed = previous.as_ref().map(|p| &p.message) != Some(&view.message);
        if let (true, Some(msg)) = (message_changed, &view.message) {
            match msg.severity {
                Severity::Success if !self.quiet => eprintln!("{}", green(&msg.text)),
                Severity::Info if !self.quiet => eprintln!("{}", dim(&msg.text)),
                Severity::Error => eprintln!("{}", red(&msg.text)),
                _ => {}
            }
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Translate English → Khmer into the current directory
  pdf-translate paper.pdf

  # Khmer → English, saved under ./out
  pdf-translate --direction km-en -o out report.pdf

  # Drag-and-drop semantics: only the first file decides
  pdf-translate --drop scan.pdf notes.txt

  # Use a remote service
  pdf-translate --api-url https://translate.example.com paper.pdf

ENVIRONMENT VARIABLES:
  PDF_TRANSLATE_API_URL     Base URL of the translation service
  PDF_TRANSLATE_OUTPUT_DIR  Directory for translated.docx
  PDF_TRANSLATE_DIRECTION   en-km or km-en
  PDF_TRANSLATE_TIMEOUT     Request timeout in seconds (0 = none)
  RUST_LOG                  Override the log filter
"#;

/// Translate PDF files through a remote translation service.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-translate",
    version,
    about = "Translate PDF files through a remote translation service",
    long_about = "Upload a PDF to a translation service (POST <api-url>/translate) and save \
the translated document it returns as translated.docx.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to translate. With --drop, every file after the first is ignored.
    #[arg(required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Treat FILES as a drag-and-drop payload instead of a file-picker choice.
    #[arg(long)]
    drop: bool,

    /// Translation direction.
    #[arg(short, long, env = "PDF_TRANSLATE_DIRECTION", value_enum, default_value = "en-km")]
    direction: DirectionArg,

    /// Base URL of the translation service.
    #[arg(long, env = "PDF_TRANSLATE_API_URL", default_value = pdf_translate::config::DEFAULT_BASE_URL)]
    api_url: String,

    /// Directory to save the translated document in.
    #[arg(short, long, env = "PDF_TRANSLATE_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Replace an existing translated.docx instead of numbering a new one.
    #[arg(long, env = "PDF_TRANSLATE_OVERWRITE")]
    overwrite: bool,

    /// Request timeout in seconds. 0 waits indefinitely.
    #[arg(long, env = "PDF_TRANSLATE_TIMEOUT", default_value_t = 0)]
    timeout: u64,

    /// Print the outcome as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_TRANSLATE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_TRANSLATE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum DirectionArg {
    #[value(name = "en-km")]
    EnKm,
    #[value(name = "km-en")]
    KmEn,
}

impl From<DirectionArg> for TranslationDirection {
    fn from(v: DirectionArg) -> Self {
        match v {
            DirectionArg::EnKm => TranslationDirection::EnKm,
            DirectionArg::KmEn => TranslationDirection::KmEn,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and status lines already tell the user what happens;
    // library logs only show up with --verbose or RUST_LOG.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = ClientConfig::builder()
        .base_url(cli.api_url.clone())
        .output_dir(cli.output_dir.clone())
        .overwrite(cli.overwrite)
        .request_timeout_secs(Some(cli.timeout))
        .build()
        .context("Invalid configuration")?;

    let presenter = TerminalPresenter::new(cli.quiet);
    let controller = SubmissionController::from_config(&config, presenter)
        .context("Failed to set up the translation client")?;
    controller.set_direction(Some(cli.direction.clone().into()));

    // ── Select ───────────────────────────────────────────────────────────
    let mut files = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let file = SelectedFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }

    let accepted = if cli.drop {
        controller.select_via_drop(files)
    } else {
        controller.select_via_browse(files)
    };
    if !accepted {
        warn!("No PDF selected from {} input file(s)", cli.files.len());
    }

    // ── Submit ───────────────────────────────────────────────────────────
    let outcome = controller.submit().await.context("Submission failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
