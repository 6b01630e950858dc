//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use docview_outline::{Navigator, Outline, OutlineSource, RowKind};
use docview_shared::{
    AppConfig, GeneratedDocs, Job, JobStatus, TrackerConfig, init_config, load_config,
    validate_server,
};
use docview_tracker::JobTracker;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docview: generate repository documentation and browse it.
#[derive(Parser)]
#[command(
    name = "docview",
    version,
    about = "Generate documentation for a repository and browse the result.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Submit a documentation job and wait for it to finish.
    Generate {
        /// Repository to document, e.g. `owner/repo`.
        repo: String,

        /// Git provider: github or gitlab (defaults to config).
        #[arg(short, long)]
        provider: Option<String>,

        /// Directory to save the result into (defaults to <output_dir>/<repo>).
        #[arg(short, long)]
        out: Option<String>,

        /// Backend base URL (overrides config).
        #[arg(long, env = "DOCVIEW_SERVER")]
        server: Option<String>,

        /// Seconds between status polls (overrides config).
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Print the outline of a saved result or a Markdown file.
    Show {
        /// `result.json` written by `generate`, or any Markdown file.
        file: PathBuf,

        /// Print this section (slug or section id) instead of the outline.
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docview=info",
        1 => "docview=debug",
        _ => "docview=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            repo,
            provider,
            out,
            server,
            interval,
        } => cmd_generate(&repo, provider.as_deref(), out.as_deref(), server, interval).await,
        Command::Show { file, section } => cmd_show(&file, section.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

async fn cmd_generate(
    repo: &str,
    provider: Option<&str>,
    out: Option<&str>,
    server: Option<String>,
    interval: Option<u64>,
) -> Result<()> {
    let mut config = load_config()?;
    if let Some(server) = server {
        config.server.base_url = server;
    }
    if let Some(secs) = interval {
        config.polling.interval_secs = secs;
    }
    validate_server(&config)?;

    let provider = provider.unwrap_or(config.defaults.provider.as_str()).to_string();
    let output_dir = match out {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(&config.defaults.output_dir).join(repo_dir_name(repo)),
    };

    let tracker_config = TrackerConfig::from(&config);
    info!(repo, %provider, api = %tracker_config.api_root, "generating documentation");

    let tracker = JobTracker::http(&tracker_config)?;
    tracker.submit(repo, &provider).await?;

    let job = watch_job(&tracker).await?;

    println!();
    for line in &job.progress_log {
        println!("  • {line}");
    }
    println!();

    match job.status {
        JobStatus::Completed => {
            let docs = job.result.clone().unwrap_or_default();
            save_result(&docs, &output_dir)?;

            let nav = Navigator::new(Outline::build(docs.into()));
            print_outline(&nav);
            println!();
            println!("  Saved to: {}", output_dir.display());
            println!("  Time:     {:.1}s", job.elapsed().as_secs_f64());
            println!();
            Ok(())
        }
        JobStatus::Failed => Err(eyre!(
            "documentation job failed: {}",
            job.error.as_deref().unwrap_or("unknown error")
        )),
        other => Err(eyre!("job stopped in unexpected state '{other}'")),
    }
}

/// Follow the job until it is terminal, redrawing the spinner as it goes.
///
/// Ctrl-C resets the tracker, which stops polling.
async fn watch_job(tracker: &JobTracker<docview_tracker::HttpBackend>) -> Result<Job> {
    let progress = CliProgress::new();
    let mut rx = tracker.subscribe();
    // Redraws the elapsed time even when the job state does not change.
    let mut clock = tokio::time::interval(Duration::from_millis(500));

    loop {
        let job = rx.borrow_and_update().clone();
        progress.update(&job);
        if job.status.is_terminal() || job.status == JobStatus::Idle {
            progress.finish();
            return Ok(job);
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    progress.finish();
                    return Ok(tracker.snapshot());
                }
            }
            _ = clock.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                progress.finish();
                tracker.reset();
                warn!("interrupted, job abandoned");
                return Err(eyre!("interrupted"));
            }
        }
    }
}

/// Write `result.json`, the flat body, and one file per module document.
fn save_result(docs: &GeneratedDocs, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("cannot create output directory {}", dir.display()))?;

    let json = serde_json::to_string_pretty(docs)?;
    std::fs::write(dir.join("result.json"), json)?;

    if let Some(markdown) = &docs.markdown {
        std::fs::write(dir.join("documentation.md"), markdown)?;
    }

    if let Some(structured) = &docs.structured {
        let docs_dir = dir.join("docs");
        std::fs::create_dir_all(&docs_dir)?;
        for (name, body) in &structured.documents {
            // Server-chosen names: keep only the final component.
            let Some(file_name) = Path::new(name).file_name() else {
                warn!(name, "skipping document with unusable file name");
                continue;
            };
            std::fs::write(docs_dir.join(file_name), body)?;
        }
    }

    info!(dir = %dir.display(), "result saved");
    Ok(())
}

/// `owner/repo` → `owner-repo`.
fn repo_dir_name(repo: &str) -> String {
    repo.trim()
        .trim_matches('/')
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == ':' { '-' } else { c })
        .collect()
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress display using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn update(&self, job: &Job) {
        let step = job.last_log().unwrap_or("Waiting…");
        self.spinner.set_message(format!(
            "[{}] {step} ({}s)",
            job.status,
            job.elapsed().as_secs()
        ));
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn cmd_show(file: &Path, section: Option<&str>) -> Result<()> {
    let source = OutlineSource::load(file)?;
    let mut nav = Navigator::new(Outline::build(source));

    let Some(key) = section else {
        print_outline(&nav);
        return Ok(());
    };

    if !nav.select(key) {
        return Err(eyre!("no section '{key}' in {}", file.display()));
    }

    if let Some(crumb) = nav.active_breadcrumb() {
        println!("{crumb}");
    }
    println!("{}", nav.active_title().unwrap_or(key));
    println!();
    println!("{}", nav.active_content().unwrap_or("(no content)"));
    println!();
    if let Some(prev) = nav.previous() {
        println!("  ← {} ({})", prev.title, prev.key);
    }
    if let Some(next) = nav.next() {
        println!("  → {} ({})", next.title, next.key);
    }
    Ok(())
}

/// Print the sidebar as an indented tree with a footer count.
fn print_outline(nav: &Navigator) {
    let outline = nav.outline();
    if outline.is_empty() {
        println!("  No documentation content.");
        return;
    }

    if let Outline::Structured(s) = outline {
        let sidebar = s.sidebar();
        if !sidebar.project_name.is_empty() {
            println!("  {} ({})", sidebar.project_name, sidebar.project_type);
        }
    }

    for row in nav.visible_rows() {
        let indent = "  ".repeat(row.depth + 1);
        let marker = match (row.kind, row.active) {
            (RowKind::Category, _) => "",
            (RowKind::Entry, true) => "▸ ",
            (RowKind::Entry, false) => "- ",
        };
        println!("{indent}{marker}{}", row.label);
    }

    println!();
    println!(
        "  {} sections ({} mode)",
        nav.section_count(),
        outline.mode()
    );
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
