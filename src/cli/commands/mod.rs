//! CLI command implementations.

mod config;
mod index;
mod recipes;
mod search;
mod serve;
mod suggest;

pub use config::run_config;
pub use index::run_index;
pub use recipes::run_recipes;
pub use search::run_search;
pub use serve::run_serve;
pub use suggest::run_suggest;
