// Adapters layer: concrete implementations for external systems (http, query sources).

pub mod github;
pub mod http;
pub mod json_url;
pub mod local_file;

pub use github::GitHubTreeSource;
pub use http::ReqwestBackend;
pub use json_url::JsonUrlSource;
pub use local_file::LocalFileSource;
