//! Display cleanup for entry descriptions.

mod quantity;

pub use quantity::dedupe_qty;
