pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod messages;
pub mod reconcile;
pub mod redemption;
pub mod upstream;
pub mod util;
