//! Shipping fee computation.
//!
//! A single pure function used by both checkout and the quote endpoint, so
//! the two can never disagree.

use bigdecimal::BigDecimal;

/// Orders at or above this subtotal ship free.
const FREE_SHIPPING_THRESHOLD: i64 = 100;
/// Base fee for the first line item.
const BASE_FEE: i64 = 15;
/// Increment per additional distinct line item.
const PER_EXTRA_ITEM: i64 = 5;

/// Flat shipping fee for a destination.
///
/// `item_count` is the number of distinct line items, not total units. The
/// destination CEP is accepted for interface stability but pricing is not
/// currently differentiated by region.
pub fn shipping_fee(subtotal: &BigDecimal, item_count: usize, _destination_cep: &str) -> BigDecimal {
    if item_count == 0 {
        return BigDecimal::from(0);
    }
    if *subtotal >= BigDecimal::from(FREE_SHIPPING_THRESHOLD) {
        return BigDecimal::from(0);
    }
    BigDecimal::from(BASE_FEE + PER_EXTRA_ITEM * (item_count as i64 - 1))
}

/// Validates a Brazilian CEP: eight digits, optional dash after the fifth.
pub fn is_valid_cep(cep: &str) -> bool {
    let bytes = cep.as_bytes();
    match bytes.len() {
        8 => bytes.iter().all(u8::is_ascii_digit),
        9 => {
            bytes[5] == b'-'
                && bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}
