use crate::table::AsnRange;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct LookupParams {
    pub ip: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct LookupResult {
    pub ip: String,
    /// `0` when no range contains `ip`.
    pub asn: u32,
    pub country: Option<String>,
    pub description: Option<String>,
}

impl LookupResult {
    pub fn new(ip: String, range: Option<&AsnRange>) -> Self {
        match range {
            Some(range) => Self {
                ip,
                asn: range.number,
                country: Some(range.country.clone()),
                description: Some(range.description.clone()),
            },
            None => Self {
                ip,
                ..Self::default()
            },
        }
    }
}
