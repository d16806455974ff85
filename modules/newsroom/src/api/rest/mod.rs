//! REST API layer - HTTP DTOs, handlers and routes

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod mapper;
pub mod openapi;
pub mod routes;

pub use error::{map_domain_error, Problem};
pub use routes::register_routes;
