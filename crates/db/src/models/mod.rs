//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching the
//! table row, plus any request DTOs that write to it.

pub mod coffee_shop;
pub mod event;
