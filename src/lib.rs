pub mod booking;
pub mod clock;
pub mod database;
pub mod error;
pub mod handlers;
pub mod item;
pub mod repository;
pub mod request;
pub mod user;
