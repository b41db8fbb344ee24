//! Parsing of individual range table source rows.
use crate::address::{normalize, AddressValue};
use std::collections::HashSet;

/// One block of addresses assigned to one ASN.
///
/// Bounds are inclusive and `start <= end` holds for every range kept in a
/// [`RangeTable`][super::RangeTable].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnRange {
    pub start: AddressValue,
    pub end: AddressValue,
    pub number: u32,
    pub country: String,
    pub description: String,
}

impl AsnRange {
    #[must_use]
    pub fn contains(&self, addr: AddressValue) -> bool {
        self.start <= addr && addr <= self.end
    }
}

/// A load-time filter restricting a range table to specific ASNs.
///
/// An empty `AllowSet` admits every valid row ("load all" mode).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowSet(HashSet<u32>);

impl AllowSet {
    /// An `AllowSet` that admits every ASN.
    #[must_use]
    pub fn load_all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_load_all(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn permits(&self, asn: u32) -> bool {
        self.is_load_all() || self.0.contains(&asn)
    }

    pub fn insert(&mut self, asn: u32) -> bool {
        self.0.insert(asn)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<u32> for AllowSet {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Why a source row was left out of the table.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than five tab separated fields.
    TooFewFields,
    /// The ASN field isn't an unsigned integer.
    InvalidAsn,
    /// ASN 0 is reserved.
    ReservedAsn,
    /// The ASN isn't in the non-empty [`AllowSet`].
    NotAllowed,
    /// A start or end address failed to normalize.
    MalformedBounds,
    /// The start address is greater than the end address.
    InvertedBounds,
}

/// The outcome of parsing one source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Range(AsnRange),
    Skipped(SkipReason),
}

/// Parse one `start\tend\tasn\tcountry\tdescription` row. Fields past the fifth are ignored.
pub(super) fn parse(line: &str, allow: &AllowSet) -> RowOutcome {
    let mut fields = line.split('\t');
    let (Some(start), Some(end), Some(asn), Some(country), Some(description)) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return RowOutcome::Skipped(SkipReason::TooFewFields);
    };

    let number = match asn.parse::<u32>() {
        Ok(0) => return RowOutcome::Skipped(SkipReason::ReservedAsn),
        Ok(number) => number,
        Err(_) => return RowOutcome::Skipped(SkipReason::InvalidAsn),
    };
    if !allow.permits(number) {
        return RowOutcome::Skipped(SkipReason::NotAllowed);
    }

    let (Ok(start), Ok(end)) = (normalize(start), normalize(end)) else {
        return RowOutcome::Skipped(SkipReason::MalformedBounds);
    };
    if start > end {
        return RowOutcome::Skipped(SkipReason::InvertedBounds);
    }

    RowOutcome::Range(AsnRange {
        start,
        end,
        number,
        country: country.to_string(),
        description: description.to_string(),
    })
}
