pub mod config;
pub mod constants;
pub mod detail;
pub mod dom;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod sources;
pub mod store;
pub mod types;
