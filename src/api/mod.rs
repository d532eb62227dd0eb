//! HTTP API handlers for studymap-ra

pub mod health;
pub mod resources;

pub use health::health_routes;
pub use resources::resource_routes;
