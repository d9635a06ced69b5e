use super::errors::{ErrorKind, Result};
use failchain::{bail, ensure};
use serde::de::{Deserialize, Deserializer, Error as SerdeDeError};
use serde::ser::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Display;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::str::FromStr;

/// An 8-byte, NUL-padded lump name as stored in the map format.
#[derive(Clone, Copy, Default, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct WadName([u8; 8]);

impl WadName {
    pub fn from_bytes(value: &[u8]) -> Result<WadName> {
        let mut name = [0u8; 8];
        let mut nulled = false;
        for (dest, &src) in name.iter_mut().zip(value.iter()) {
            ensure!(
                src.is_ascii(),
                ErrorKind::invalid_byte_in_name(src, value)
            );

            let new_byte = match src.to_ascii_uppercase() {
                b @ b'A'..=b'Z'
                | b @ b'0'..=b'9'
                | b @ b'_'
                | b @ b'-'
                | b @ b'['
                | b @ b']'
                | b @ b'%'
                | b @ b'\\' => b,
                b'\0' => {
                    nulled = true;
                    break;
                }
                b => {
                    bail!(ErrorKind::invalid_byte_in_name(b, value));
                }
            };
            *dest = new_byte;
        }

        ensure!(nulled || value.len() <= 8, ErrorKind::name_too_long(value));
        Ok(WadName(name))
    }

    /// An all-NUL name, the sentinel a sidedef stores when a texture slot is
    /// unused.
    pub fn empty() -> WadName {
        WadName([0u8; 8])
    }

    /// The node builder treats a mid-texture as absent when the leading two
    /// bytes of its name are NUL.
    pub fn is_empty_texture(&self) -> bool {
        self.0[0] == 0 && self.0[1] == 0
    }
}

impl FromStr for WadName {
    type Err = super::errors::Error;
    fn from_str(value: &str) -> Result<WadName> {
        WadName::from_bytes(value.as_bytes())
    }
}

impl Display for WadName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", String::from_utf8_lossy(&self[..]))
    }
}

impl Deref for WadName {
    type Target = [u8; 8];
    fn deref(&self) -> &[u8; 8] {
        &self.0
    }
}

impl Debug for WadName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "WadName({:?})",
            String::from_utf8_lossy(&self[..])
        )
    }
}

impl PartialEq<[u8; 8]> for WadName {
    fn eq(&self, rhs: &[u8; 8]) -> bool {
        self.deref() == rhs
    }
}

impl Borrow<[u8; 8]> for WadName {
    fn borrow(&self) -> &[u8; 8] {
        self.deref()
    }
}

impl Serialize for WadName {
    fn serialize<S>(&self, serializer: S) -> StdResult<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WadName {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WadName::from_bytes(&<[u8; 8]>::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}
