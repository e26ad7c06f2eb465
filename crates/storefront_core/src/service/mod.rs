//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep transport layers decoupled from storage details.

pub mod resource_service;

pub use resource_service::{
    CategoryService, ListResult, OrderService, ProductService, ResourceService, ServiceResult,
    SqliteResourceService, UserService,
};
