pub mod adapters;
pub mod configuration;
pub mod core;
pub mod error;
pub mod utils;

pub use reqwest::Client;
