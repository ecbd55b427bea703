use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use derivative::Derivative;
use mongodb::bson::extjson::de::Error as ExtJsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};
use serde_json::Error as JsonError;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // config
    InvalidConfig {
        key: &'static str,
        value: String,
    },

    // store contents
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonError),
    StoreIsNotAnArray,
    RecordIsNotAnObject {
        index: usize,
    },
    RecordMissingId {
        index: usize,
    },
    UpdatedIndexOutOfRange {
        index: usize,
        total: usize,
    },
    #[serde(serialize_with = "display")]
    InvalidExtendedJson(#[derivative(PartialEq = "ignore")] ExtJsonError),

    // io
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidConfig { .. } => "E1001000",
            Error::InvalidJson(_) => "E2001000",
            Error::StoreIsNotAnArray => "E2001001",
            Error::RecordIsNotAnObject { .. } => "E2001002",
            Error::RecordMissingId { .. } => "E2001003",
            Error::InvalidExtendedJson(_) => "E2001004",
            Error::UpdatedIndexOutOfRange { .. } => "E2001005",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::IoError(_) => "E5001003",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidConfig { .. } => "A configuration value could not be parsed",
            Error::InvalidJson(_) => "The campaign store could not be parsed as json",
            Error::StoreIsNotAnArray => "The campaign store is not a json array",
            Error::RecordIsNotAnObject { .. } => "A campaign record is not a json object",
            Error::RecordMissingId { .. } => "A campaign record has no _id to write back to",
            Error::InvalidExtendedJson(_) => {
                "A campaign record could not be converted from extended json"
            }
            Error::UpdatedIndexOutOfRange { .. } => {
                "An updated record index is outside of the loaded campaigns"
            }
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<JsonError> for Error {
    fn from(error: JsonError) -> Error {
        Error::InvalidJson(error)
    }
}

impl From<ExtJsonError> for Error {
    fn from(error: ExtJsonError) -> Error {
        Error::InvalidExtendedJson(error)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidExtendedJson(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
