use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use serde_json::Value;
use tracing::warn;

use super::quantity::{hex_to_integer, integer_to_hex};
use crate::schema::Kind;

/// One step of a normalizer chain.
///
/// A normalizer is only invoked for kinds it reports as supported, and must
/// return values it does not recognize unchanged so that reapplying the
/// chain is harmless.
pub trait Normalizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, kind: &Kind) -> bool;

    fn normalize(&self, kind: &Kind, value: Value) -> Value;
}

/// Ordered list of normalizers, applied left to right.
#[derive(Clone, Default)]
pub struct NormalizerChain {
    steps: Vec<Arc<dyn Normalizer>>,
}

impl NormalizerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizers applied to outgoing arguments.
    pub fn request_default() -> Self {
        Self::new()
            .with(BytesToHex)
            .with(IntToHex)
            .with(StringToHex)
            .with(AddressToHex)
    }

    /// Normalizers applied to incoming results.
    ///
    /// Used with [`FormatterFactory::build_results`](super::FormatterFactory::build_results);
    /// the proxy pipeline itself leaves results to the backend's encoding.
    pub fn result_default() -> Self {
        Self::new().with(HexToInt)
    }

    pub fn with(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.steps.push(Arc::new(normalizer));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Normalize `value` as declared `kind`.
    ///
    /// Array kinds normalize every element with the element kind; order and
    /// count are preserved.
    pub fn normalize(&self, kind: &Kind, value: Value) -> Value {
        match (kind, value) {
            (Kind::Array(inner), Value::Array(items)) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.normalize(inner, item))
                    .collect(),
            ),
            (kind, value) => self
                .steps
                .iter()
                .filter(|step| step.supports(kind))
                .fold(value, |value, step| step.normalize(kind, value)),
        }
    }
}

impl fmt::Debug for NormalizerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|step| step.name()))
            .finish()
    }
}

/// Interpret a JSON array of numbers as raw bytes.
fn byte_array(value: &Value) -> Option<Vec<u8>> {
    value
        .as_array()?
        .iter()
        .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
        .collect()
}

fn is_unprefixed_hex(s: &str, len: Option<usize>) -> bool {
    !s.starts_with("0x")
        && !s.is_empty()
        && len.map_or(s.len() % 2 == 0, |len| s.len() == len)
        && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Raw bytes of a byte-like value: a byte array, a `0x` hex string, or an
/// even-length bare hex string.
fn decode_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Array(_) => byte_array(value),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(digits) => hex::decode(digits).ok(),
            None if is_unprefixed_hex(s, None) => hex::decode(s).ok(),
            None => None,
        },
        _ => None,
    }
}

/// Byte kinds become `0x` hex. Fixed-size kinds (`bytesN`) are right-padded
/// with zeros to N bytes; values longer than N are forwarded unchanged.
pub struct BytesToHex;

impl Normalizer for BytesToHex {
    fn name(&self) -> &'static str {
        "bytes_to_hex"
    }

    fn supports(&self, kind: &Kind) -> bool {
        kind.is_byte_like()
    }

    fn normalize(&self, kind: &Kind, value: Value) -> Value {
        let Some(mut bytes) = decode_bytes(&value) else {
            return value;
        };
        if let Some(width) = kind.byte_width() {
            if bytes.len() > width {
                warn!("{} value has {} bytes; forwarding unchanged", kind, bytes.len());
                return value;
            }
            bytes.resize(width, 0);
        }
        Value::String(format!("0x{}", hex::encode(bytes)))
    }
}

/// Quantities: native integers become hex quantities.
pub struct IntToHex;

impl Normalizer for IntToHex {
    fn name(&self) -> &'static str {
        "int_to_hex"
    }

    fn supports(&self, kind: &Kind) -> bool {
        matches!(kind, Kind::Uint)
    }

    fn normalize(&self, _kind: &Kind, value: Value) -> Value {
        integer_to_hex(value)
    }
}

/// Text arguments are sent as the hex of their UTF-8 bytes.
pub struct StringToHex;

impl Normalizer for StringToHex {
    fn name(&self) -> &'static str {
        "string_to_hex"
    }

    fn supports(&self, kind: &Kind) -> bool {
        matches!(kind, Kind::String)
    }

    fn normalize(&self, _kind: &Kind, value: Value) -> Value {
        match value {
            Value::String(s) if !s.starts_with("0x") => {
                Value::String(format!("0x{}", hex::encode(s.as_bytes())))
            }
            other => other,
        }
    }
}

/// Addresses: 20 raw bytes become an EIP-55 checksummed address.
pub struct AddressToHex;

impl Normalizer for AddressToHex {
    fn name(&self) -> &'static str {
        "address_to_hex"
    }

    fn supports(&self, kind: &Kind) -> bool {
        matches!(kind, Kind::Address)
    }

    fn normalize(&self, _kind: &Kind, value: Value) -> Value {
        if let Some(bytes) = byte_array(&value).filter(|b| b.len() == 20) {
            return Value::String(Address::from_slice(&bytes).to_checksum(None));
        }
        match value {
            Value::String(s) if is_unprefixed_hex(&s, Some(40)) => Value::String(format!("0x{}", s)),
            other => other,
        }
    }
}

/// Result side: hex quantities become native integers.
pub struct HexToInt;

impl Normalizer for HexToInt {
    fn name(&self) -> &'static str {
        "hex_to_int"
    }

    fn supports(&self, kind: &Kind) -> bool {
        matches!(kind, Kind::Uint)
    }

    fn normalize(&self, _kind: &Kind, value: Value) -> Value {
        hex_to_integer(value)
    }
}
