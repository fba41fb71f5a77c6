//! Shopping cart.
//!
//! [`Cart`] is the plain value type; [`CartStore`] owns the persisted,
//! shared copy and serializes every mutation against it.

mod line;
mod store;

pub use line::{Cart, CartLine, MAX_QUANTITY_PER_ITEM};
pub use store::CartStore;
