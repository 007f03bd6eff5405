pub mod auth;
pub mod cli;
pub mod completion;
pub mod config;
pub mod history;
pub mod journal;
pub mod model;
pub mod scoring;
pub mod store;
pub mod themes;

pub use config::Config;
pub use journal::RequestContext;
pub use scoring::Analyzer;
pub use store::JournalStore;
