pub mod handlers;
pub mod record;
pub mod repository;
pub mod upload;
