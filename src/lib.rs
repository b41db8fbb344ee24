//! httpasn
//!
//! Redirects HTTP clients based on the Autonomous System Number (ASN) owning their source
//! address.
//!
//! ASNs are resolved with an in-memory [`RangeTable`] of inclusive address ranges, built once
//! from an [iptoasn] style `ip2asn-combined.tsv.gz` dataset. IPv4 and IPv6 addresses are
//! [normalized][address::normalize] into a single 128-bit domain, and lookups are a binary
//! search over the ranges sorted by start address.
//!
//! [iptoasn]: https://iptoasn.com
//!
#![warn(clippy::pedantic)]

pub mod address;
pub mod api;
pub mod config;
pub mod error;
pub mod redirect;
pub mod resolver;
pub mod table;

pub use address::{normalize, AddressValue};
pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use redirect::{RedirectMap, SharedRedirects};
pub use resolver::{Resolver, SharedResolver};
pub use table::{AllowSet, AsnRange, RangeTable};
