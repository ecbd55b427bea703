use std::env;
use std::path::PathBuf;

use crate::campaign::manager::EXPECTED_ELIGIBLE;
use crate::error::Error;

const DATA_PATH: &str = "CAMPAIGN_DATA_PATH";
const MONGO_URI: &str = "CAMPAIGN_MONGO_URI";
const MONGO_DATABASE: &str = "CAMPAIGN_MONGO_DATABASE";
const MONGO_COLLECTION: &str = "CAMPAIGN_MONGO_COLLECTION";
const EXPECTED_COUNT: &str = "BACKFILL_EXPECTED_COUNT";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub mongo_collection: String,
    pub expected_count: Option<usize>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            data_path: PathBuf::from("data/campaigns.json"),
            mongo_uri: None,
            mongo_database: "dashboard".to_string(),
            mongo_collection: "campaigns".to_string(),
            expected_count: Some(EXPECTED_ELIGIBLE),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, Error> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(DATA_PATH) {
            config.data_path = PathBuf::from(path);
        }
        config.mongo_uri = lookup(MONGO_URI).filter(|uri| !uri.trim().is_empty());
        if let Some(database) = lookup(MONGO_DATABASE) {
            config.mongo_database = database;
        }
        if let Some(collection) = lookup(MONGO_COLLECTION) {
            config.mongo_collection = collection;
        }
        if let Some(count) = lookup(EXPECTED_COUNT) {
            config.expected_count = parse_expected_count(&count)?;
        }

        Ok(config)
    }
}

fn parse_expected_count(value: &str) -> Result<Option<usize>, Error> {
    match value.trim() {
        "" | "none" => Ok(None),
        count => count.parse().map(Some).map_err(|_| Error::InvalidConfig {
            key: EXPECTED_COUNT,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_the_file_store() {
        let config = lookup(&[]).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.data_path, PathBuf::from("data/campaigns.json"));
        assert_eq!(config.expected_count, Some(40));
        assert_eq!(config.mongo_uri, None);
    }

    #[test]
    fn reads_overrides() {
        let config = lookup(&[
            ("CAMPAIGN_DATA_PATH", "/srv/dashboard/campaigns.json"),
            ("CAMPAIGN_MONGO_URI", "mongodb://localhost:27017"),
            ("CAMPAIGN_MONGO_DATABASE", "marketing"),
            ("BACKFILL_EXPECTED_COUNT", "12"),
        ])
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("/srv/dashboard/campaigns.json"));
        assert_eq!(config.mongo_uri.as_deref(), Some("mongodb://localhost:27017"));
        assert_eq!(config.mongo_database, "marketing");
        assert_eq!(config.mongo_collection, "campaigns");
        assert_eq!(config.expected_count, Some(12));
    }

    #[test]
    fn expected_count_can_be_disabled() {
        let config = lookup(&[("BACKFILL_EXPECTED_COUNT", "none")]).unwrap();

        assert_eq!(config.expected_count, None);
    }

    #[test]
    fn blank_mongo_uri_means_file_store() {
        let config = lookup(&[("CAMPAIGN_MONGO_URI", "  ")]).unwrap();

        assert_eq!(config.mongo_uri, None);
    }

    #[test]
    fn rejects_bad_expected_count() {
        let result = lookup(&[("BACKFILL_EXPECTED_COUNT", "forty")]);

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidConfig {
                key: "BACKFILL_EXPECTED_COUNT",
                value: "forty".to_string(),
            }
        );
    }
}
