//! Document structs and DTOs.
//!
//! Each submodule contains:
//! - A `Serialize + Deserialize` document struct matching the stored JSON
//! - `Deserialize` create / update DTOs used by the API layer
//! - Response shapes that are safe to hand to clients

pub mod brand;
pub mod project;
pub mod user;
