pub mod config;
pub mod credentials;
pub mod error;
pub mod mock;
pub mod models;
pub mod providers;
pub mod service;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use crate::config::Config;
pub use crate::error::{ErrorKind, Result, SentimentError};
pub use crate::models::{
    AnalysisMode, AnalysisResult, BatchRequest, Post, ProviderIdentity, SentimentLabel,
};
pub use crate::service::SentimentService;
