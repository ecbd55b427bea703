use mongodb::bson::{self, Document};
use mongodb::{Client, Collection};
use tracing::info;

use crate::campaign::db::{CampaignStore, JsonFileStore};
use crate::config::Config;
use crate::error::Error;

pub type MongoCampaignStore = Collection<Document>;

#[tracing::instrument(skip(config))]
pub async fn open_store(config: &Config) -> Result<Box<dyn CampaignStore>, Error> {
    match &config.mongo_uri {
        Some(uri) => {
            info!("connecting to db: {}", config.mongo_database);
            let db = Client::with_uri_str(uri)
                .await?
                .database(&config.mongo_database);

            // ping the database to ensure connection is established
            db.run_command(bson::doc! { "ping": 1 }, None).await?;

            let campaigns: MongoCampaignStore = db.collection(&config.mongo_collection);
            Ok(Box::new(campaigns))
        }
        None => {
            let campaigns = JsonFileStore::new(&config.data_path);
            info!("using campaign file: {}", campaigns.path().display());
            Ok(Box::new(campaigns))
        }
    }
}
