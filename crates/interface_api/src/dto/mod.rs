//! Request/Response data transfer objects

pub mod folio;
pub mod stay;
