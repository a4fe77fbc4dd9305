pub mod config;
pub mod document;
pub mod error;
pub mod line;
pub mod message;
pub mod rope;
pub mod state;
pub mod text_server;
