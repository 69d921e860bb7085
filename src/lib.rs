pub mod admin;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod models;
pub mod registry;
pub mod routes;
pub mod services;
pub mod state;
