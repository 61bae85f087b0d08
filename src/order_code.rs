//! Order code generation for gateway payment requests.

use chrono::Utc;

/// Order codes are the last nine decimal digits of a millisecond timestamp,
/// which always fits the gateway's signed 32-bit order field.
const ORDER_CODE_MODULUS: i64 = 1_000_000_000;

/// Produces order codes from the current UTC time.
///
/// Codes wrap roughly every 11.5 days and are NOT globally unique: two
/// stores checking out in the same millisecond-modulo window can collide.
/// Webhook resolution compensates by matching the paid amount against the
/// pending order's recorded amount before committing.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderCodeGenerator;

impl OrderCodeGenerator {
    pub fn next(&self) -> i32 {
        order_code_from_millis(Utc::now().timestamp_millis())
    }
}

/// Truncate a millisecond timestamp to its last nine decimal digits.
pub fn order_code_from_millis(millis: i64) -> i32 {
    millis.rem_euclid(ORDER_CODE_MODULUS) as i32
}
