pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod router;
pub mod service;
pub mod text;
pub mod types;
pub mod views;

pub use error::SiftError;
pub use router::{SiftState, sift_router};
