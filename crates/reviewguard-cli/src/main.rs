mod config;
mod run;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("reviewguard v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::parse();
    let report = run::run(&config).await?;

    tracing::info!(
        fetched = report.fetched,
        negative = report.negative,
        indeterminate = report.indeterminate,
        offers_submitted = report.offers_submitted,
        offers_updated = report.offers_updated,
        offers_rejected = report.offers_rejected,
        checkpoint_advanced = report.checkpoint_advanced,
        "run complete"
    );
    Ok(())
}
