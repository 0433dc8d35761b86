pub mod normalize;
pub mod pipeline;
pub mod rate_limiter;
pub mod signer;
pub mod transport;

pub use crate::domain::model::{BatchReport, ImportResult, Outcome, QueryRecord};
pub use crate::domain::ports::{
    ConfigProvider, HttpBackend, HttpMethod, QuerySource, SavedQueryApi, SourceEntry,
};
pub use crate::utils::error::Result;
