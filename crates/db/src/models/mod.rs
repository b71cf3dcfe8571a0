//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and, where the table is written to, a create DTO.

pub mod event;
pub mod notification;
pub mod user;
