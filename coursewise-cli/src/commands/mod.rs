pub mod catalog;
pub mod chat;
pub mod config;
pub mod feedback;
pub mod models;
pub mod recommend;
pub mod serve;
pub mod user;
