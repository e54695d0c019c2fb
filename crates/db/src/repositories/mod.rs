//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod coffee_shop_repo;
pub mod event_repo;

pub use coffee_shop_repo::CoffeeShopRepo;
pub use event_repo::EventRepo;
