mod inputs;
mod loader;
mod progress;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use premonition::{HttpTransport, InitialState, Premonition, Reconstruction};
use progress::ProgressObserver;
use settings::{Overrides, RunSettings};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "premonition")]
#[command(
    about = "Reconstruct a GraphQL schema from validation errors when introspection is disabled",
    long_about = None
)]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// GraphQL endpoint URL
    url: Option<String>,

    /// Candidate names, one per line
    #[arg(short, long, value_name = "FILE")]
    wordlist: Option<PathBuf>,

    /// Document template containing a single FUZZ marker
    #[arg(short, long, value_name = "FILE")]
    document: Option<PathBuf>,

    /// Continue from a schema written by a previous run
    #[arg(long, value_name = "FILE")]
    input_schema: Option<PathBuf>,

    /// Write the schema here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP headers (can be specified multiple times)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Number of candidate names per probe document
    #[arg(long, value_name = "N")]
    bucket_size: Option<usize>,

    /// Maximum number of requests in flight
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    connect_timeout: Option<u64>,

    /// Number of retry attempts on failure
    #[arg(long, visible_alias = "retries", value_name = "COUNT")]
    retry: Option<u32>,

    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Force colored output even when not a TTY
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long, conflicts_with = "color")]
    no_color: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// Suppress progress indicators (spinners)
    #[arg(long)]
    no_progress: bool,
}

/// Output verbosity options
#[derive(Debug, Clone, Copy)]
struct OutputOptions {
    /// Whether to show progress indicators (spinners)
    show_progress: bool,
    /// Whether to show informational output (success messages, summaries)
    show_info: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            headers: self.headers.clone(),
            insecure: self.insecure,
            bucket_size: self.bucket_size,
            concurrency: self.concurrency,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            retry: self.retry,
            wordlist: self.wordlist.clone(),
            document: self.document.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();
    configure_colors(cli.color, cli.no_color);

    let output_opts = OutputOptions {
        show_progress: !cli.quiet && !cli.no_progress,
        show_info: !cli.quiet,
    };

    run(cli, output_opts).await
}

#[tracing::instrument(skip_all)]
async fn run(cli: Cli, output_opts: OutputOptions) -> Result<()> {
    let start_time = std::time::Instant::now();

    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            loader::find_config(&cwd)
        }
    };
    let file_config = match &config_path {
        Some(path) => loader::load_config(path)?,
        None => loader::FileConfig::default(),
    };

    let RunSettings {
        config,
        wordlist,
        document,
    } = settings::resolve_settings(cli.overrides(), file_config)?;

    let wordlist = inputs::load_wordlist(&wordlist)?;
    let template = inputs::load_template(&document)?;
    let initial = match &cli.input_schema {
        Some(path) => InitialState::Snapshot(inputs::load_snapshot(path)?),
        None => InitialState::Fresh,
    };

    let url = config.url.clone();
    let transport = HttpTransport::new(&config).context("Failed to build HTTP client")?;

    let observer = Arc::new(ProgressObserver::new(progress::spinner(
        &format!("Probing {url}..."),
        output_opts.show_progress,
    )));
    let engine = Premonition::new(config, transport)?.with_observer(observer.clone());

    let result = engine.run(&template, &wordlist, initial).await;
    observer.finish();
    let run = result.with_context(|| format!("Failed to reconstruct schema from {url}"))?;

    let content = run
        .schema
        .to_json_string_pretty()
        .context("Failed to serialize schema")?;
    write_output(cli.output.as_deref(), &content)?;

    if output_opts.show_info {
        print_summary(&run, cli.output.as_deref(), start_time.elapsed());
    }

    Ok(())
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    if let Some(path) = path {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        if !content.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }
    Ok(())
}

/// Summary goes to stderr so stdout stays a clean schema document.
fn print_summary(run: &Reconstruction, output: Option<&Path>, duration: std::time::Duration) {
    let fields = run
        .schema
        .get_type(&run.container)
        .map_or(0, |ty| ty.fields.len());

    match output {
        Some(path) => eprintln!(
            "{} Reconstructed {} fields of {} into {}",
            "✓".green(),
            fields,
            run.container.bold(),
            path.display().to_string().cyan(),
        ),
        None => eprintln!(
            "{} Reconstructed {} fields of {}",
            "✓".green(),
            fields,
            run.container.bold(),
        ),
    }

    for field in &run.skipped_fields {
        eprintln!("  {} {}: type unknown, skipped", "⚠".yellow(), field);
    }
    for (field, argument) in &run.skipped_arguments {
        eprintln!(
            "  {} {}.{}: type unknown, skipped",
            "⚠".yellow(),
            field,
            argument
        );
    }

    eprintln!(
        "  {} {} requests in {:.2}s",
        "⏱".dimmed(),
        run.requests,
        duration.as_secs_f64()
    );
}

/// Initialize tracing. Logs go to stderr and are off unless `RUST_LOG` is set.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Decide whether to force colors on or off.
///
/// Flags win over the environment. `NO_COLOR` (any value) disables colors,
/// `CLICOLOR_FORCE` (non-empty, non-zero) enables them and `CLICOLOR=0`
/// disables them. `None` leaves the decision to TTY detection.
/// See <https://no-color.org/> and <https://bixense.com/clicolors/>.
fn color_override(
    force_color: bool,
    no_color: bool,
    env: impl Fn(&str) -> Option<String>,
) -> Option<bool> {
    if force_color {
        return Some(true);
    }
    if no_color || env("NO_COLOR").is_some() {
        return Some(false);
    }
    if let Some(val) = env("CLICOLOR_FORCE") {
        return (!val.is_empty() && val != "0").then_some(true);
    }
    env("CLICOLOR").is_some_and(|val| val == "0").then_some(false)
}

fn configure_colors(force_color: bool, no_color: bool) {
    let env = |key: &str| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned());
    if let Some(enabled) = color_override(force_color, no_color, env) {
        colored::control::set_override(enabled);
    }
}
