pub mod api;
pub mod config;
pub mod console;
pub mod db;
pub mod model;
pub mod tracker;
