use std::fmt;

/// Semantic classification of an RPC argument, parsed from an ABI type name.
///
/// A kind selects normalizer behavior; it is never a value itself. Names the
/// parser does not recognize become [`Kind::Unknown`] and pass values through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// 20-byte account or contract address
    Address,
    /// 32-byte hash (`bytes32`)
    Hash,
    /// Fixed-size byte array other than 32 bytes (`bytes1`..`bytes31`)
    FixedBytes(usize),
    /// Dynamic byte array
    Bytes,
    /// Non-negative integer quantity (`uint`, `uintN`)
    Uint,
    Bool,
    String,
    /// Homogeneous array of the inner kind (`T[]`)
    Array(Box<Kind>),
    Unknown(String),
}

impl Kind {
    /// Parse an ABI type name such as `address`, `bytes32` or `uint[]`.
    pub fn parse(name: &str) -> Kind {
        let name = name.trim();
        if let Some(inner) = name.strip_suffix("[]") {
            return Kind::Array(Box::new(Kind::parse(inner)));
        }

        match name {
            "address" => Kind::Address,
            "bool" => Kind::Bool,
            "string" => Kind::String,
            "bytes" => Kind::Bytes,
            "bytes32" => Kind::Hash,
            "uint" => Kind::Uint,
            _ => {
                if let Some(size) = name.strip_prefix("bytes").and_then(|s| s.parse::<usize>().ok()) {
                    if (1..32).contains(&size) {
                        return Kind::FixedBytes(size);
                    }
                }
                if let Some(bits) = name.strip_prefix("uint").and_then(|s| s.parse::<usize>().ok()) {
                    if bits > 0 && bits <= 256 && bits % 8 == 0 {
                        return Kind::Uint;
                    }
                }
                Kind::Unknown(name.to_string())
            }
        }
    }

    /// True for every kind whose wire form is a `0x` byte string.
    pub fn is_byte_like(&self) -> bool {
        matches!(self, Kind::Bytes | Kind::Hash | Kind::FixedBytes(_))
    }

    /// Encoded width of a fixed-size byte kind; `None` for everything else.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            Kind::Hash => Some(32),
            Kind::FixedBytes(size) => Some(*size),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Address => f.write_str("address"),
            Kind::Hash => f.write_str("bytes32"),
            Kind::FixedBytes(size) => write!(f, "bytes{}", size),
            Kind::Bytes => f.write_str("bytes"),
            Kind::Uint => f.write_str("uint"),
            Kind::Bool => f.write_str("bool"),
            Kind::String => f.write_str("string"),
            Kind::Array(inner) => write!(f, "{}[]", inner),
            Kind::Unknown(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_kinds() {
        assert_eq!(Kind::parse("address"), Kind::Address);
        assert_eq!(Kind::parse("bytes32"), Kind::Hash);
        assert_eq!(Kind::parse("bytes8"), Kind::FixedBytes(8));
        assert_eq!(Kind::parse("bytes8").byte_width(), Some(8));
        assert_eq!(Kind::Hash.byte_width(), Some(32));
        assert_eq!(Kind::Bytes.byte_width(), None);
        assert_eq!(Kind::parse("bytes"), Kind::Bytes);
        assert_eq!(Kind::parse("uint"), Kind::Uint);
        assert_eq!(Kind::parse("uint256"), Kind::Uint);
        assert_eq!(Kind::parse("bool"), Kind::Bool);
    }

    #[test]
    fn test_parse_array_kinds() {
        assert_eq!(Kind::parse("address[]"), Kind::Array(Box::new(Kind::Address)));
        assert_eq!(
            Kind::parse("uint[][]"),
            Kind::Array(Box::new(Kind::Array(Box::new(Kind::Uint))))
        );
    }

    #[test]
    fn test_unrecognized_names_are_unknown() {
        assert_eq!(Kind::parse("bytes33"), Kind::Unknown("bytes33".to_string()));
        assert_eq!(Kind::parse("uint7"), Kind::Unknown("uint7".to_string()));
        assert_eq!(Kind::parse("tuple"), Kind::Unknown("tuple".to_string()));
    }

    #[test]
    fn test_display_matches_parse() {
        for name in ["address", "bytes32", "bytes8", "uint", "address[]", "bool"] {
            assert_eq!(Kind::parse(name).to_string(), name);
        }
    }
}
