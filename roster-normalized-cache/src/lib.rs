//! A normalized cache exchange for the roster client. Query results are split into entities
//! keyed by `Typename:id` and links between them, so every query that selects an entity sees
//! the latest copy of it, and mutations can update the results of related queries.

#[macro_use]
extern crate async_trait;
#[cfg(test)]
#[macro_use]
extern crate lazy_static;

mod cache_exchange;
mod store;
mod types;

pub use cache_exchange::{NormalizedCacheExchange, NormalizedCacheImpl};
pub use store::{QueryStore, Store};
pub use types::{NormalizedCacheExtension, NormalizedCacheOptions};

pub(crate) type HashSet<T> = std::collections::HashSet<T, fnv::FnvBuildHasher>;
