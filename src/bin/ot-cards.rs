//! CLI binary for ot-cards.
//!
//! A thin shim over the library crate: `serve` runs the parse server,
//! `parse` drives the upload controller and prints, writes or copies the
//! rendered blocks.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ot_cards::config::DEFAULT_ADDR;
use ot_cards::{
    ClientConfig, ClipboardError, ClipboardHelper, CommandClipboard, CopyToast, HttpEndpoint,
    LocalEndpoint, NoopUploadView, ParseEndpoint, RenderedReport,
    ServerConfig, StatusKind, StatusMessage, SystemClipboard, UploadController, UploadView,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
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
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Terminal view using indicatif ────────────────────────────────────────────

/// Spinner while the request is in flight, one coloured line per outcome.
struct CliView {
    bar: ProgressBar,
}

impl CliView {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        Arc::new(Self { bar })
    }
}

impl UploadView for CliView {
    fn on_file_selected(&self, file_name: Option<&str>, _parse_enabled: bool) {
        self.bar
            .set_prefix(file_name.unwrap_or(ot_cards::upload::NO_FILE_LABEL).to_string());
    }

    fn on_busy(&self, busy: bool) {
        if busy {
            self.bar.enable_steady_tick(Duration::from_millis(80));
        } else {
            self.bar.finish_and_clear();
        }
    }

    fn on_status(&self, status: &StatusMessage) {
        match status.kind {
            StatusKind::Loading => self.bar.set_message(status.text.clone()),
            StatusKind::Success => self.bar.println(green(&status.text)),
            StatusKind::Error => self.bar.println(red(&status.text)),
        }
    }

    fn on_rendered(&self, report: &RenderedReport) {
        self.bar.println(dim(&format!(
            "{} blocks, {} chars of original text",
            report.blocks.len(),
            report.original_text.chars().count()
        )));
    }
}

/// Copy confirmation on stderr.
struct TerminalToast;

impl CopyToast for TerminalToast {
    fn show(&self, text: &str, _duration: Duration) {
        eprintln!("{} {}", green("✓"), text);
    }

    fn failed(&self, err: &ClipboardError) {
        eprintln!("{} {}", red("✗"), err);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the parse server and the upload page in ./public
  ot-cards serve --static-dir public

  # Parse through the running server, print all blocks
  ot-cards parse 評估報告.docx

  # Parse in-process, no server needed
  ot-cards parse --local 評估報告.docx

  # Copy block 4 (精細動作訓練 - 具體建議) to the clipboard
  ot-cards parse --local --copy 4 評估報告.docx

  # JSON output (blocks + original text)
  ot-cards parse --local --json 評估報告.docx > cards.json

BLOCKS:
   1  職能治療評估                     7  日常生活自理 - 飲食
   2  精細動作 - 評估工具              8  日常生活自理 - 穿脫衣
   3  精細動作 - 行為觀察及綜合結果    9  日常生活自理 - 盥洗衛生
   4  精細動作訓練 - 具體建議         10  日常生活自理 - 遊戲活動
   5  感覺統合 - 行為觀察及綜合結果   11  日常生活自理 - 生活作息及參與
   6  感覺統合訓練 - 具體建議

ENVIRONMENT VARIABLES:
  OT_CARDS_ADDR           Listen address for `serve`
  OT_CARDS_STATIC_DIR     Static directory for `serve`
  OT_CARDS_ENDPOINT       Parse endpoint URL for `parse`
  RUST_LOG                Overrides the log filter
"#;

/// Parse occupational-therapy evaluation reports into copyable text cards.
#[derive(Parser, Debug)]
#[command(
    name = "ot-cards",
    version,
    about = "Parse occupational-therapy evaluation reports (.docx) into copyable text cards",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "OT_CARDS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "OT_CARDS_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the parse server and serve the static upload page.
    Serve(ServeArgs),
    /// Parse one report and print, write or copy its blocks.
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address (host:port).
    #[arg(long, env = "OT_CARDS_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Directory served for every path other than /api/parse.
    #[arg(long, env = "OT_CARDS_STATIC_DIR", default_value = ".")]
    static_dir: PathBuf,

    /// Largest accepted upload in MiB.
    #[arg(long, env = "OT_CARDS_MAX_UPLOAD_MB", default_value_t = 20,
          value_parser = clap::value_parser!(u64).range(1..=1024))]
    max_upload_mb: u64,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// The .docx report.
    file: PathBuf,

    /// Parse endpoint URL.
    #[arg(long, env = "OT_CARDS_ENDPOINT", conflicts_with = "local")]
    endpoint: Option<String>,

    /// Parse in-process instead of uploading.
    #[arg(long, env = "OT_CARDS_LOCAL")]
    local: bool,

    /// Copy block N (1-11) to the clipboard.
    #[arg(long, env = "OT_CARDS_COPY",
          value_parser = clap::value_parser!(u64).range(1..=11))]
    copy: Option<u64>,

    /// Copy the original document text to the clipboard.
    #[arg(long, env = "OT_CARDS_COPY_ORIGINAL", conflicts_with = "copy")]
    copy_original: bool,

    /// Output the rendered blocks as JSON.
    #[arg(long, env = "OT_CARDS_JSON")]
    json: bool,

    /// Write the output to this file instead of stdout.
    #[arg(short, long, env = "OT_CARDS_OUTPUT")]
    output: Option<PathBuf>,

    /// Upload timeout in seconds.
    #[arg(long, env = "OT_CARDS_TIMEOUT", default_value_t = 120)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives the feedback during `parse`; library INFO logs would
    // only interleave with it.
    let show_progress = match &cli.command {
        Command::Parse(args) => !cli.quiet && !args.json,
        Command::Serve(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Parse(args) => {
            let view: Arc<dyn UploadView> = if show_progress {
                CliView::new() as Arc<dyn UploadView>
            } else {
                Arc::new(NoopUploadView)
            };
            let rendered = if args.local {
                run_parse(LocalEndpoint, view, &args).await?
            } else {
                let config = build_client_config(&args)?;
                let endpoint = HttpEndpoint::new(&config).context("Failed to build HTTP client")?;
                run_parse(endpoint, view, &args).await?
            };
            emit(&rendered, &args, cli.quiet)
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = ServerConfig::builder()
        .addr(args.addr)
        .static_dir(args.static_dir)
        .max_upload_bytes(usize::try_from(args.max_upload_mb * 1024 * 1024)?)
        .build()
        .context("Invalid configuration")?;

    ot_cards::server::serve(&config)
        .await
        .with_context(|| format!("Server on {} failed", config.addr))
}

/// Map CLI args to `ClientConfig`.
fn build_client_config(args: &ParseArgs) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder().timeout_secs(args.timeout);
    if let Some(ref endpoint) = args.endpoint {
        builder = builder.endpoint(endpoint.clone());
    }
    builder.build().context("Invalid configuration")
}

async fn run_parse<E: ParseEndpoint>(
    endpoint: E,
    view: Arc<dyn UploadView>,
    args: &ParseArgs,
) -> Result<RenderedReport> {
    let mut controller = UploadController::new(endpoint, view);
    controller.select_file(Some(args.file.clone()));
    controller
        .parse()
        .await
        .with_context(|| format!("Failed to parse {}", args.file.display()))
}

/// Print, write and copy the rendered report as requested.
fn emit(rendered: &RenderedReport, args: &ParseArgs, quiet: bool) -> Result<()> {
    let text = if args.json {
        serde_json::to_string_pretty(rendered).context("Failed to serialise output")?
    } else {
        rendered.to_text()
    };

    if let Some(ref path) = args.output {
        ot_cards::output::write_atomic(path, text.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !quiet {
            eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
        }
    } else if args.copy.is_none() && !args.copy_original {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
        if !text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    let selection = match (args.copy, args.copy_original) {
        (Some(n), _) => {
            let block = usize::try_from(n)
                .ok()
                .and_then(|n| rendered.blocks.get(n.wrapping_sub(1)))
                .with_context(|| format!("No block {n}"))?;
            Some((block.title.as_str(), block.content.as_str()))
        }
        (None, true) => Some(("原始文件", rendered.original_text.as_str())),
        (None, false) => None,
    };

    if let Some((title, content)) = selection {
        // The process exits right after this, so the copy command goes first.
        let mut helper =
            ClipboardHelper::command_first(CommandClipboard::detect(), SystemClipboard::new());
        helper
            .copy(content, &TerminalToast)
            .with_context(|| format!("Failed to copy 「{title}」"))?;
    }

    Ok(())
}
