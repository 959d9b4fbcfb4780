// sdkup-net/src/lib.rs
pub mod http;
pub mod validation;

pub use http::{build_http_client, Fetcher, HttpFetcher};
pub use sdkup_common::error::{Result, SdkupError};
pub use validation::validate_url;
