//! Network ranges and address containment.
//!
//! # Responsibilities
//! - Parse CIDR literals (IPv4 and IPv6) into a normalized base + prefix
//! - Test whether an address lies inside a range
//!
//! # Design Decisions
//! - Parsing is non-strict: host bits are zeroed instead of rejected
//! - IPv4 prefixes may also be written as a contiguous netmask or hostmask
//! - Families never mix: an IPv4 address is never inside an IPv6 range,
//!   including IPv4-mapped IPv6 forms
//! - Display renders the normalized form (`10.0.0.0/8`), not the input

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors from parsing a CIDR literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkParseError {
    #[error("empty network literal")]
    Empty,

    #[error("invalid address '{0}'")]
    Address(String),

    #[error("invalid prefix length '{0}'")]
    Prefix(String),

    #[error("prefix length {len} exceeds {max} for this address family")]
    PrefixTooLong { len: u8, max: u8 },
}

/// A contiguous block of addresses in one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkRange {
    V4 { base: Ipv4Addr, prefix: u8 },
    V6 { base: Ipv6Addr, prefix: u8 },
}

impl NetworkRange {
    /// Build a range from any address in it. Host bits are cleared.
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, NetworkParseError> {
        match addr {
            IpAddr::V4(v4) => {
                if prefix > 32 {
                    return Err(NetworkParseError::PrefixTooLong { len: prefix, max: 32 });
                }
                let base = u32::from(v4) & v4_mask(prefix);
                Ok(NetworkRange::V4 { base: Ipv4Addr::from(base), prefix })
            }
            IpAddr::V6(v6) => {
                if prefix > 128 {
                    return Err(NetworkParseError::PrefixTooLong { len: prefix, max: 128 });
                }
                let base = u128::from(v6) & v6_mask(prefix);
                Ok(NetworkRange::V6 { base: Ipv6Addr::from(base), prefix })
            }
        }
    }

    /// Base (all-zero host bits) address.
    pub fn base(&self) -> IpAddr {
        match *self {
            NetworkRange::V4 { base, .. } => IpAddr::V4(base),
            NetworkRange::V6 { base, .. } => IpAddr::V6(base),
        }
    }

    /// Last (all-one host bits) address.
    pub fn last(&self) -> IpAddr {
        match *self {
            NetworkRange::V4 { base, prefix } => {
                IpAddr::V4(Ipv4Addr::from(u32::from(base) | !v4_mask(prefix)))
            }
            NetworkRange::V6 { base, prefix } => {
                IpAddr::V6(Ipv6Addr::from(u128::from(base) | !v6_mask(prefix)))
            }
        }
    }

    /// Returns true if `addr` is inside this range.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match (self, addr) {
            (NetworkRange::V4 { base, prefix }, IpAddr::V4(a)) => {
                u32::from(*a) & v4_mask(*prefix) == u32::from(*base)
            }
            (NetworkRange::V6 { base, prefix }, IpAddr::V6(a)) => {
                u128::from(*a) & v6_mask(*prefix) == u128::from(*base)
            }
            _ => false,
        }
    }
}

fn v4_mask(prefix: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0)
}

fn v6_mask(prefix: u8) -> u128 {
    u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0)
}

/// Prefix length of a dotted IPv4 netmask (`255.255.0.0`) or hostmask
/// (`0.0.255.255`). Netmask reading wins, so `0.0.0.0` is `/0`.
fn mask_prefix(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    [bits, !bits].into_iter().find_map(|m| {
        let prefix = m.leading_ones() as u8;
        (m == v4_mask(prefix)).then_some(prefix)
    })
}

impl FromStr for NetworkRange {
    type Err = NetworkParseError;

    /// Parses `addr/len`, `addr/netmask`, `addr/hostmask`, or a bare
    /// address as a single-host range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NetworkParseError::Empty);
        }

        let (addr_part, prefix_part) = match s.split_once('/') {
            Some((a, p)) => (a, Some(p)),
            None => (s, None),
        };

        let addr: IpAddr = addr_part
            .parse()
            .map_err(|_| NetworkParseError::Address(addr_part.to_string()))?;

        let prefix = match prefix_part {
            // `u8::from_str` would accept a leading '+'
            Some(p) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => p
                .parse::<u8>()
                .map_err(|_| NetworkParseError::Prefix(p.to_string()))?,
            // Masks are an IPv4-only notation.
            Some(p) if addr.is_ipv4() => p
                .parse::<Ipv4Addr>()
                .ok()
                .and_then(mask_prefix)
                .ok_or_else(|| NetworkParseError::Prefix(p.to_string()))?,
            Some(p) => return Err(NetworkParseError::Prefix(p.to_string())),
            None => match addr {
                IpAddr::V4(_) => 32,
                IpAddr::V6(_) => 128,
            },
        };

        NetworkRange::new(addr, prefix)
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkRange::V4 { base, prefix } => write!(f, "{}/{}", base, prefix),
            NetworkRange::V6 { base, prefix } => write!(f, "{}/{}", base, prefix),
        }
    }
}

impl Serialize for NetworkRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
