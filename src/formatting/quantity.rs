use alloy_primitives::U256;
use serde_json::{Number, Value};

/// Block tags a block-number-or-tag argument may carry instead of a number.
pub const NAMED_BLOCKS: [&str; 3] = ["latest", "earliest", "pending"];

pub fn is_named_block(value: &Value) -> bool {
    value.as_str().is_some_and(|s| NAMED_BLOCKS.contains(&s))
}

/// True for a `0x`-prefixed string of hex digits (including the empty `0x`).
pub fn is_hex_string(value: &Value) -> bool {
    value
        .as_str()
        .and_then(strip_hex_prefix)
        .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Encode a quantity in wire form: `0x` followed by hex digits, no leading zeros.
pub fn encode_quantity(value: U256) -> String {
    format!("0x{:x}", value)
}

/// Decode a wire-form quantity. `None` for anything that is not `0x` + hex.
pub fn decode_quantity(s: &str) -> Option<U256> {
    let digits = strip_hex_prefix(s)?;
    if digits.is_empty() {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

/// A non-negative JSON integer as a quantity. Floats, negatives and
/// exponent forms are not quantities.
pub fn integer_from_number(n: &Number) -> Option<U256> {
    U256::from_str_radix(&n.to_string(), 10).ok()
}

/// Read a quantity from either of its two JSON representations.
pub fn quantity_from_value(value: &Value) -> Option<U256> {
    match value {
        Value::Number(n) => integer_from_number(n),
        Value::String(s) => decode_quantity(s),
        _ => None,
    }
}

/// Hex quantity string → native JSON integer, over the full 256-bit range.
///
/// Values that are not hex quantities are returned unchanged.
pub fn hex_to_integer(value: Value) -> Value {
    let converted = value
        .as_str()
        .and_then(decode_quantity)
        .and_then(|q| q.to_string().parse::<Number>().ok());

    match converted {
        Some(n) => Value::Number(n),
        None => value,
    }
}

/// Native JSON integer → hex quantity string. Non-integers are unchanged.
pub fn integer_to_hex(value: Value) -> Value {
    let converted = match &value {
        Value::Number(n) => integer_from_number(n),
        _ => None,
    };

    match converted {
        Some(q) => Value::String(encode_quantity(q)),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quantity_round_trip() {
        let samples = [
            U256::ZERO,
            U256::from(1u64),
            U256::from(255u64),
            U256::from(21000u64),
            U256::from(u64::MAX),
            U256::from(u64::MAX) + U256::from(1u64),
            U256::MAX,
        ];
        for q in samples {
            assert_eq!(decode_quantity(&encode_quantity(q)), Some(q));
        }
    }

    #[test]
    fn test_value_round_trip() {
        for n in [0u64, 1, 16, 1_000_000, u64::MAX] {
            let wire = integer_to_hex(json!(n));
            assert!(is_hex_string(&wire));
            assert_eq!(hex_to_integer(wire), json!(n));
        }
    }

    #[test]
    fn test_encode_has_no_leading_zeros() {
        assert_eq!(encode_quantity(U256::ZERO), "0x0");
        assert_eq!(encode_quantity(U256::from(21000u64)), "0x5208");
    }

    #[test]
    fn test_hex_to_integer_leaves_non_quantities() {
        assert_eq!(hex_to_integer(json!("latest")), json!("latest"));
        assert_eq!(hex_to_integer(json!("0x")), json!("0x"));
        assert_eq!(hex_to_integer(json!(12)), json!(12));
    }

    #[test]
    fn test_wide_quantities_keep_every_digit() {
        // 20 ether, above u64::MAX
        let native: Value = serde_json::from_str("20000000000000000000").unwrap();
        assert_eq!(hex_to_integer(json!("0x1158e460913d00000")), native);
        assert_eq!(integer_to_hex(native), json!("0x1158e460913d00000"));

        let max = encode_quantity(U256::MAX);
        let native = hex_to_integer(json!(max.clone()));
        assert_eq!(native.to_string(), U256::MAX.to_string());
        assert_eq!(integer_to_hex(native), json!(max));
    }

    #[test]
    fn test_integer_to_hex_skips_non_integers() {
        let float: Value = serde_json::from_str("1.5").unwrap();
        assert_eq!(integer_to_hex(float.clone()), float);
        assert_eq!(integer_to_hex(json!(-1)), json!(-1));
        assert_eq!(integer_to_hex(json!("0x10")), json!("0x10"));
    }

    #[test]
    fn test_named_blocks() {
        assert!(is_named_block(&json!("latest")));
        assert!(is_named_block(&json!("earliest")));
        assert!(is_named_block(&json!("pending")));
        assert!(!is_named_block(&json!("0x10")));
        assert!(!is_named_block(&json!(16)));
    }

    #[test]
    fn test_quantity_from_value() {
        assert_eq!(quantity_from_value(&json!(21000)), Some(U256::from(21000u64)));
        assert_eq!(quantity_from_value(&json!("0x5208")), Some(U256::from(21000u64)));
        assert_eq!(quantity_from_value(&json!("21000")), None);
        assert_eq!(quantity_from_value(&json!(null)), None);
        let wide: Value = serde_json::from_str("20000000000000000000").unwrap();
        assert_eq!(
            quantity_from_value(&wide),
            Some(U256::from(20_000_000_000_000_000_000u128))
        );
    }
}
