//! # Yatube Shared
//!
//! Request and response types shared by the web layer: query strings,
//! authentication forms and the problem-details error body.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
