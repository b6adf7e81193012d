pub mod analysis;
pub mod analysis_request;
pub mod analyzer;
pub mod api_connection;
pub mod cli;
pub mod config;
pub mod image_input;
pub mod presentation;
pub mod session;
