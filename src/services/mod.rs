pub mod chat;
pub mod message;
pub mod summary;
pub mod user;
pub mod voice_storage;
