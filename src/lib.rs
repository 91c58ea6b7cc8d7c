pub mod api;
pub mod database;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;
pub mod websocket;
