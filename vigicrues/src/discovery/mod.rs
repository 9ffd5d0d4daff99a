//! Station catalog search.
//!
//! The Vigicrues station referential is published as an OpenDataSoft
//! dataset with full-text search. It knows every station ever registered,
//! including closed ones, but carries only identity fields; details come
//! from the detail service.

mod client;
mod convert;
mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_SEARCH_LIMIT, DiscoveryApi};
pub use convert::convert_search_results;
pub use types::{CatalogRecord, RecordsResponse};
