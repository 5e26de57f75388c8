pub mod config;
pub mod database;
pub mod dataset;
pub mod entities;
pub mod errors;
pub mod lookup;
pub mod models;
pub mod services;
pub mod sources;
pub mod utils;
pub mod web;
