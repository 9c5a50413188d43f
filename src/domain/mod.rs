pub mod account;
pub mod cart;
pub mod errors;
pub mod inventory;
pub mod order;
pub mod payment;
pub mod ports;
pub mod retry;
pub mod shipment;
pub mod shipping;
pub mod status;
