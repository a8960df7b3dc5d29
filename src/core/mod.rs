pub mod compose;
pub mod config;
pub mod mention;
pub mod render;
