//! Domain Layer
//!
//! Grocery entities and the errors raised by stores.

mod entity;
mod grocery;

pub use entity::{DomainError, DomainResult, Entity};
pub use grocery::{GroceryItem, GroceryRecord, ItemKey, NewGrocery};
