use anyhow::Result;
use clap::Parser;
use skewer::{ModelKind, RunConfig, RunError};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "skewer")]
#[command(about = "Sends inference requests to a prediction service and reports the error rate")]
struct Args {
    /// Maximum number of concurrent inference requests
    #[arg(long, env = "SKEWER_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Number of test requests
    #[arg(long = "num_tests", env = "SKEWER_NUM_TESTS", default_value_t = 10)]
    num_tests: usize,

    /// PredictionService host:port
    #[arg(long, env = "SKEWER_SERVER", default_value = "127.0.0.1:8500")]
    server: String,

    /// Request payload to send: bert or text-cnn
    #[arg(long, env = "SKEWER_MODEL", default_value = "bert")]
    model: ModelKind,

    /// Do not print a progress dot per answered request
    #[arg(long)]
    quiet: bool,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        RunConfig {
            server: args.server,
            concurrency: args.concurrency,
            num_tests: args.num_tests,
            model: args.model,
            progress: !args.quiet,
            ..RunConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RunConfig::from(Args::parse());

    match skewer::run(config).await {
        Ok(report) => {
            println!("\n{report}");
            Ok(())
        }
        Err(RunError::Config(err)) => {
            // usage problem: tell the user, send nothing
            error!("{err}");
            println!("{err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
