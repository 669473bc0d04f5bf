pub mod client;
pub mod config;
pub mod controller;
pub mod dto;
pub mod error;
pub mod firebase;
pub mod models;
pub mod repository;
pub mod response;
pub mod services;
pub mod state;
