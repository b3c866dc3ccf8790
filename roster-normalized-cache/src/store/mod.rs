mod data;
#[allow(clippy::module_inception)]
mod store;

pub use store::{QueryStore, Store};
