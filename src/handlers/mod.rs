pub mod cart;
pub mod identity;
pub mod orders;
pub mod payments;
pub mod shipments;
