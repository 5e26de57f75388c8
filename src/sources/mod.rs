//! Dataset sources
//!
//! A document source hands back the dataset payload exactly as stored
//! (possibly gzip-compressed). Decoding is left to the dataset layer so the
//! scanning engine can keep the compact raw bytes around.
//!
//! The relational source is not a [`DocumentSource`]: rows are read through
//! [`crate::database::CompanyStore`].

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::errors::SourceResult;

pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetSourceKind {
    /// JSON document on the local file system
    #[default]
    File,
    /// JSON document downloaded over HTTP(S)
    Http,
    /// `companies` table in a relational database
    Database,
}

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human-readable location, safe to log
    fn describe(&self) -> String;

    /// Fetch the complete raw payload
    async fn fetch(&self) -> SourceResult<Bytes>;
}
