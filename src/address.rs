//! Address normalization.
//!
//! Both address families are mapped into a single unsigned 128-bit domain so that range
//! bounds and query addresses compare with plain integer ordering. IPv4 addresses occupy
//! the low 32 bits, IPv6 addresses the full width. Family only matters while parsing text.
use crate::error::Error;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// A normalized network address.
#[derive(Debug, Clone, Copy, Default, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct AddressValue(u128);

impl AddressValue {
    #[must_use]
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u128 {
        self.0
    }
}

/// Normalize a textual IPv4 (dotted-quad) or IPv6 (colon-form) address.
///
/// Text containing a `:` is parsed as IPv6, anything else as IPv4.
///
/// # Errors
///
/// Returns [`Error::MalformedAddress`] if the text isn't a valid literal of its family. IPv4
/// octets outside `[0, 255]` are rejected rather than wrapped.
pub fn normalize(text: &str) -> Result<AddressValue, Error> {
    if text.contains(':') {
        return Ipv6Addr::from_str(text)
            .map(AddressValue::from)
            .map_err(|_| Error::MalformedAddress(text.to_string()));
    }
    parse_dotted_quad(text)
        .map(AddressValue::from)
        .ok_or_else(|| Error::MalformedAddress(text.to_string()))
}

fn parse_dotted_quad(text: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');
    for octet in &mut octets {
        *octet = parse_octet(parts.next()?)?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(Ipv4Addr::from(octets)),
    }
}

fn parse_octet(part: &str) -> Option<u8> {
    // u8::from_str alone would admit a leading '+'.
    if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for AddressValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl From<Ipv4Addr> for AddressValue {
    fn from(addr: Ipv4Addr) -> Self {
        Self(u128::from(u32::from(addr)))
    }
}

impl From<Ipv6Addr> for AddressValue {
    fn from(addr: Ipv6Addr) -> Self {
        Self(u128::from(addr))
    }
}

impl From<IpAddr> for AddressValue {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4_addr) => v4_addr.into(),
            IpAddr::V6(v6_addr) => v6_addr.into(),
        }
    }
}

impl fmt::Display for AddressValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
