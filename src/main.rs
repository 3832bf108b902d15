// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, build an API client, hand off to `ui`.
// - Errors are printed rather than propagated unless `--strict` is given.

use batch_enrich_cli::api::ApiClient;
use batch_enrich_cli::config::{ClientConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
use batch_enrich_cli::model::{BatchId, EnrichmentFlags};
use batch_enrich_cli::poll::PollOutcome;
use batch_enrich_cli::ui::{self, SpinnerSleeper};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "batch-enrich",
    version,
    about = "Upload a CSV to the enrichment service and watch the batch"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the enrichment service
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Number of status checks before giving up
    #[arg(long, global = true, default_value_t = 30)]
    attempts: u32,

    /// Seconds between status checks
    #[arg(long, global = true, value_name = "SECS", default_value_t = 10)]
    interval: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// Exit non-zero on errors (1) and when the batch never completes (2)
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a CSV file, then watch the created batch
    Upload(UploadArgs),
    /// Watch an existing batch by id
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct UploadArgs {
    /// CSV file to upload; prompts interactively when omitted
    file: Option<PathBuf>,

    /// Skip Finexio supplier matching
    #[arg(long)]
    no_finexio: bool,

    /// Skip Mastercard enrichment
    #[arg(long)]
    no_mastercard: bool,

    /// Skip Google address validation
    #[arg(long)]
    no_google_address: bool,

    /// Skip Akkio prediction
    #[arg(long)]
    no_akkio: bool,

    /// Stop after the upload instead of watching the batch
    #[arg(long)]
    no_watch: bool,
}

impl UploadArgs {
    fn flags(&self) -> EnrichmentFlags {
        EnrichmentFlags {
            finexio: !self.no_finexio,
            mastercard: !self.no_mastercard,
            google_address: !self.no_google_address,
            akkio: !self.no_akkio,
        }
    }
}

#[derive(Args, Debug)]
struct WatchArgs {
    /// Batch identifier returned by the upload
    id: String,
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<Option<PollOutcome>> {
    let config = ClientConfig::default()
        .with_base_url(&cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_attempts(cli.attempts)
        .with_interval(Duration::from_secs(cli.interval));
    let schedule = config.schedule;
    tracing::debug!(?config, "client configured");
    let api = ApiClient::new(config)?;
    let mut sleeper = SpinnerSleeper;

    match &cli.command {
        Command::Upload(args) => {
            let (path, flags) = match &args.file {
                Some(path) => (path.clone(), args.flags()),
                None => ui::prompt_upload()?,
            };
            let receipt = ui::upload(&api, &path, flags)?;
            if args.no_watch {
                return Ok(None);
            }
            let outcome = ui::watch(&api, &mut sleeper, &receipt.batch_id, schedule)?;
            Ok(Some(outcome))
        }
        Command::Watch(args) => {
            let outcome = ui::watch(&api, &mut sleeper, &BatchId::new(&args.id), schedule)?;
            Ok(Some(outcome))
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(Some(PollOutcome::Exhausted { .. })) if cli.strict => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&err);
            if cli.strict {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}
