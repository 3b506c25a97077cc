pub mod analyzers;
pub mod config;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod sources;
pub mod upload;
