pub mod cart_service;
pub mod order_service;
pub mod payment_service;
pub mod shipment_service;

#[cfg(test)]
pub mod test_support;
