use chrono::{DateTime, Utc};

pub mod campaign;
pub mod config;
pub mod database;
pub mod error;
pub mod timeline;

pub use campaign::manager::{BackfillOptions, BackfillReport};
pub use config::Config;
pub use error::Error;
pub use timeline::{DurationBucket, Marker, TimelineSelection};

pub async fn run(config: &Config, now: DateTime<Utc>) -> Result<BackfillReport, Error> {
    let db = database::open_store(config).await?;

    let options = BackfillOptions {
        expected_count: config.expected_count,
        ..BackfillOptions::new(now)
    };

    campaign::manager::backfill_campaigns(db.as_ref(), &options).await
}
