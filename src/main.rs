use campaign_dates::{Config, Error};
use chrono::Utc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_span_events(FmtSpan::NEW)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = Config::from_env()?;
    let report = campaign_dates::run(&config, Utc::now()).await?;

    println!(
        "backfilled {} of {} campaigns ({} eligible)",
        report.updated.len(),
        report.total,
        report.eligible
    );

    Ok(())
}
