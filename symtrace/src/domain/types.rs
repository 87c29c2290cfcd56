//! Core domain newtypes

use std::fmt;

/// Process ID of the symbolization target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(pub i32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

/// A raw address queried for symbolization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr(pub u64);

impl Addr {
    /// Parse an address from `0x`-prefixed hex or plain decimal.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16).ok().map(Self)
        } else {
            s.parse::<u64>().ok().map(Self)
        }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_parse_hex_and_decimal() {
        assert_eq!(Addr::parse("0x2010"), Some(Addr(0x2010)));
        assert_eq!(Addr::parse("0X2010"), Some(Addr(0x2010)));
        assert_eq!(Addr::parse("8208"), Some(Addr(8208)));
        assert_eq!(Addr::parse("  0x10  "), Some(Addr(0x10)));
        assert_eq!(Addr::parse("zebra"), None);
        assert_eq!(Addr::parse("0x"), None);
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(Pid(1234).to_string(), "PID:1234");
        assert_eq!(Addr(0x2000).to_string(), "0x2000");
    }
}
