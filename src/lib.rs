pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{GitHubTreeSource, JsonUrlSource, LocalFileSource, ReqwestBackend};
pub use config::{ImporterSettings, SourceSpec};
pub use self::core::{
    pipeline::{ImportPipeline, ImportSummary},
    rate_limiter::RateLimiter,
    transport::SignedTransport,
};
pub use domain::model::{Credentials, QueryRecord};
pub use utils::error::{ImportError, Result};
