pub mod cached;
pub mod http;
pub mod trait_def;

#[cfg(test)]
pub(crate) mod test_support;

pub use cached::CachedStats;
pub use http::HttpBackend;
pub use trait_def::{BackendApi, BackendError, BackendResult};
