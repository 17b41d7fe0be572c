pub mod cache;
pub mod entities;
pub mod error;
pub mod repository;
pub mod types;
