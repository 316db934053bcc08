//! REST API layer

pub mod auth;
pub mod dto;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod mapper;
pub mod routes;
