//! Tag filter expressions for ping targets: a small boolean language over
//! tags, the targets it filters, automatic tag rules, structured criteria,
//! ping history and persisted settings.

pub mod app;
pub mod config;
pub mod criteria;
pub mod dsl;
pub mod ping;
pub mod tagging;
pub mod targets;
