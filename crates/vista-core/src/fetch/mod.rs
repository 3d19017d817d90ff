//! Photo catalog retrieval.
//!
//! A [`PhotoSource`] knows how to obtain catalog records (over HTTP or from a
//! local file); the [`PhotoFetcher`] drives it asynchronously and publishes
//! results into the store, discarding results from superseded requests.

mod fetcher;
mod file;
mod http;
mod source;

pub use fetcher::{FetchOptions, FetchOutcome, PhotoFetcher};
pub use file::FilePhotoSource;
pub use http::HttpPhotoSource;
pub use source::{cache_busted, parse_catalog, CatalogRecord, CatalogUrls, PhotoSource};
