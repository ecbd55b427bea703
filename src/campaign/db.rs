use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, Document};
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::database::MongoCampaignStore;
use crate::error::Error;

use super::ID;

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn load_campaigns(&self) -> Result<Vec<Value>, Error>;

    // `updated` holds the indices of the records that were changed since loading
    async fn save_campaigns(&self, campaigns: &[Value], updated: &[usize]) -> Result<(), Error>;
}

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonFileStore {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("campaigns");

        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()))
    }
}

#[async_trait]
impl CampaignStore for JsonFileStore {
    #[tracing::instrument(skip(self))]
    async fn load_campaigns(&self) -> Result<Vec<Value>, Error> {
        let contents = fs::read_to_string(&self.path).await?;

        match serde_json::from_str(&contents)? {
            Value::Array(campaigns) => Ok(campaigns),
            _ => Err(Error::StoreIsNotAnArray),
        }
    }

    // the whole collection is rewritten, so `updated` is not needed here
    #[tracing::instrument(skip(self, campaigns))]
    async fn save_campaigns(&self, campaigns: &[Value], updated: &[usize]) -> Result<(), Error> {
        let contents = serde_json::to_string_pretty(campaigns)?;
        let temp_path = self.temp_path();
        debug!("writing {} campaigns to {}", campaigns.len(), temp_path.display());

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(contents.as_bytes()).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err.into());
        }

        Ok(())
    }
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn load_campaigns(&self) -> Result<Vec<Value>, Error> {
        let campaigns: Vec<Document> = self.find(bson::doc! {}, None).await?.try_collect().await?;

        Ok(campaigns
            .into_iter()
            .map(|campaign| Bson::Document(campaign).into_relaxed_extjson())
            .collect())
    }

    #[tracing::instrument(skip(self, campaigns))]
    async fn save_campaigns(&self, campaigns: &[Value], updated: &[usize]) -> Result<(), Error> {
        for &index in updated {
            let campaign = campaigns
                .get(index)
                .cloned()
                .ok_or(Error::UpdatedIndexOutOfRange {
                    index,
                    total: campaigns.len(),
                })?;

            let campaign = match Bson::try_from(campaign)? {
                Bson::Document(campaign) => campaign,
                _ => return Err(Error::RecordIsNotAnObject { index }),
            };

            let id = campaign
                .get(ID)
                .cloned()
                .ok_or(Error::RecordMissingId { index })?;

            self.replace_one(bson::doc! { "_id": id }, campaign, None)
                .await?;
        }

        Ok(())
    }
}
