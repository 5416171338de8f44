use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Engine executable version, packed the way the script extender reports it:
/// `major << 24 | minor << 16 | build << 4 | sub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeVersion(u32);

impl RuntimeVersion {
    pub const V1_9_4: RuntimeVersion = RuntimeVersion::new(1, 9, 4, 0);
    pub const V1_10_20: RuntimeVersion = RuntimeVersion::new(1, 10, 20, 0);

    pub const fn new(major: u8, minor: u8, build: u16, sub: u8) -> Self {
        Self(
            (major as u32) << 24
                | (minor as u32) << 16
                | ((build as u32) & 0xFFF) << 4
                | ((sub as u32) & 0xF),
        )
    }

    pub const fn from_packed(packed: u32) -> Self {
        Self(packed)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    pub const fn major(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn minor(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn build(self) -> u16 {
        ((self.0 >> 4) & 0xFFF) as u16
    }

    pub const fn sub(self) -> u8 {
        (self.0 & 0xF) as u8
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major(),
            self.minor(),
            self.build(),
            self.sub()
        )
    }
}

impl FromStr for RuntimeVersion {
    type Err = Error;

    /// Accepts `1.10.20`, `1.10.20.0`, or a packed hex value such as `0x010A0140`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u32::from_str_radix(hex, 16)
                .map(Self)
                .map_err(|e| Error::InvalidVersion(format!("'{}': {}", s, e)));
        }

        let parts: Vec<&str> = s.split('.').collect();
        if !(3..=4).contains(&parts.len()) {
            return Err(Error::InvalidVersion(format!(
                "'{}': expected major.minor.build[.sub]",
                s
            )));
        }

        let field = |index: usize, max: u32| -> Result<u32> {
            let value: u32 = parts[index]
                .parse()
                .map_err(|e| Error::InvalidVersion(format!("'{}': {}", s, e)))?;
            if value > max {
                return Err(Error::InvalidVersion(format!(
                    "'{}': component {} out of range",
                    s, value
                )));
            }
            Ok(value)
        };

        let major = field(0, 0xFF)?;
        let minor = field(1, 0xFF)?;
        let build = field(2, 0xFFF)?;
        let sub = if parts.len() == 4 { field(3, 0xF)? } else { 0 };

        Ok(Self::new(major as u8, minor as u8, build as u16, sub as u8))
    }
}

impl Serialize for RuntimeVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RuntimeVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing() {
        assert_eq!(RuntimeVersion::V1_10_20.packed(), 0x010A0140);
        assert_eq!(RuntimeVersion::V1_9_4.packed(), 0x01090040);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(RuntimeVersion::V1_10_20.to_string(), "1.10.20.0");
        assert_eq!(
            "1.10.20".parse::<RuntimeVersion>().unwrap(),
            RuntimeVersion::V1_10_20
        );
        assert_eq!(
            "1.9.4.0".parse::<RuntimeVersion>().unwrap(),
            RuntimeVersion::V1_9_4
        );
        assert_eq!(
            "0x010A0140".parse::<RuntimeVersion>().unwrap(),
            RuntimeVersion::V1_10_20
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("1.10".parse::<RuntimeVersion>().is_err());
        assert!("1.x.20".parse::<RuntimeVersion>().is_err());
        assert!("1.10.20.16".parse::<RuntimeVersion>().is_err());
        assert!("256.0.0".parse::<RuntimeVersion>().is_err());
    }
}
