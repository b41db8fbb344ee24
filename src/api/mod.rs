//! HTTP API serving ASN based redirects.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/asn` (GET)
//!
//!   Looks up the ASN owning an address. The address is taken from the optional `ip` query
//!   parameter, or the client's source address when absent:
//!
//!   ```bash
//!   ❯ curl 'http://localhost:8080/asn?ip=178.248.240.6'
//!   {"ip":"178.248.240.6","asn":196922,"country":"DE","description":"HOFMEIER Hofmeier Consult GmbH"}
//!   ```
//!
//!   Addresses outside every loaded range return `"asn": 0` with `null` metadata. Returns
//!   HTTP 400 (Bad Request) if `ip` isn't a valid IPv4 or IPv6 address.
//!
//!   Only ranges of ASNs in the [redirect file][crate::redirect] are loaded unless
//!   [`Config::load_all`][crate::config::Config::load_all] is set.
//!
//! ## Any other path (GET)
//!
//!   The full request URI (path and query) is resolved against the
//!   [redirect file][crate::redirect] using the ASN of the client's source address.
//!
//!   `/healthcheck` and `/asn` always take precedence, so redirect file targets with exactly
//!   those paths are never served. Targets with a query string, e.g. `/asn?x=1`, still are.
//!
//!   * Returns HTTP 301 (Moved Permanently) to the URL configured for the client's ASN, or to
//!     the target's default (ASN `0`) URL if the client's ASN is unknown or unmapped.
//!   * Returns HTTP 404 (Not Found) if the URI isn't a configured target, or the target has
//!     no default URL to fall back to.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
