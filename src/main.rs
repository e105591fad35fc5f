use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_loop::{run_task, LoopDeps};
use capture_store::{CaptureSink, FsCaptureStore};
use decision_policy::{DecisionPolicy, FallbackPolicy, LlmPolicy};
use page_adapter::ChromiumPage;
use uitrail_core_types::Task;

use uitrail_cli::{apps, report, CliConfig};

#[derive(Parser)]
#[command(
    name = "uitrail",
    version,
    about = "Drive a web app through its UI from a natural-language task, capturing evidence at every step"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ~/.uitrail/config.yaml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a task, e.g. `uitrail run "linear: create project for TES"`.
    Run(RunArgs),
    /// List the known application entry points.
    Apps,
}

#[derive(Args)]
struct RunArgs {
    /// Task query of the form "<app>: <goal>".
    query: String,

    /// Explicit start URL, overriding the app registry.
    #[arg(long)]
    start_url: Option<String>,

    /// Object type hint used in capture prefixes (e.g. `project`).
    #[arg(long)]
    object_type: Option<String>,

    /// Iteration budget override.
    #[arg(long)]
    max_steps: Option<u32>,

    /// Run with a visible browser window.
    #[arg(long)]
    headed: bool,

    /// Capture output directory override.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip the reasoning backend and use the deterministic selector.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => run(args, cli.config.as_deref()).await,
        Command::Apps => {
            for (name, url) in apps::KNOWN_APPS {
                println!("{name:<10} {url}");
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(args: RunArgs, config_path: Option<&std::path::Path>) -> Result<()> {
    let mut config = CliConfig::load(config_path)?;
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(dir) = args.output_dir {
        config.capture.output_dir = Some(dir);
    }
    if let Some(steps) = args.max_steps {
        config.flow.max_steps = steps;
    }

    let mut task = Task::from_query(&args.query);
    if task.goal.is_empty() {
        bail!("query must look like \"<app>: <goal>\", got {:?}", args.query);
    }
    task.object_type = args.object_type;

    let start_url = match args.start_url {
        Some(url) => url,
        None => match apps::start_url_for(&task.app_name) {
            Some(url) => url.to_string(),
            None => bail!(
                "unknown app {:?}; pass --start-url or use one of: {}",
                task.app_name,
                apps::KNOWN_APPS
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
    };
    let task = task.with_start_url(start_url);

    let page = Arc::new(
        ChromiumPage::launch(&config.page_config())
            .await
            .context("launching browser")?,
    );

    let policy: Arc<dyn DecisionPolicy> = if args.offline || !config.llm.enabled {
        info!("reasoning backend disabled; using fallback selector");
        Arc::new(FallbackPolicy)
    } else {
        Arc::new(LlmPolicy::new(config.llm_policy_config()))
    };

    let output_dir = config.capture.resolve_output_dir();
    let sink = Arc::new(FsCaptureStore::new(&output_dir));
    info!(dir = %output_dir.display(), "capturing to");

    let deps = LoopDeps {
        page: page.clone(),
        policy,
        sink: sink.clone(),
    };

    let result = run_task(&task, &deps, &config.flow_loop_config()).await;

    // Terminate the Chromium child on both outcomes; the loop's handles
    // are gone once deps is dropped.
    drop(deps);
    match Arc::try_unwrap(page) {
        Ok(page) => page.close().await,
        Err(_) => warn!("browser handle still shared; leaving shutdown to process exit"),
    }

    let report = result.context("running task flow")?;
    let steps = sink.steps(&report.flow.id).await?;
    report::print_report(&report, &steps);
    Ok(())
}
