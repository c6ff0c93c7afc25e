//! # Yatube Core
//!
//! The domain layer of the Yatube blogging platform.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! records, ports, the post form validator and the pagination helper.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;

pub use error::DomainError;
