//! Request handlers, one submodule per resource.

pub mod auth;
pub mod categories;
pub mod coffee_shops;
pub mod events;
pub mod geocode;
pub mod moderation;
