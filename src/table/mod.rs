//! The ASN range table.
//!
//! A [`RangeTable`] is built once from a tab separated source of
//! `start_address, end_address, asn, country_code, description` rows, usually gzip
//! compressed (e.g. the [iptoasn] `ip2asn-combined.tsv.gz` dataset). The rows may arrive in
//! any order. Once built the table is sorted ascending by range start and never mutated, so
//! it can be shared between any number of readers without locking.
//!
//! Malformed rows are skipped rather than failing the build. See [`SkipReason`] for the
//! recovered conditions. Only failing to open or read the source is fatal.
//!
//! # Overlapping ranges
//!
//! Source ranges are assumed not to overlap. This isn't enforced: overlapping adjacent
//! ranges are counted in [`BuildStats::overlaps`] and logged, and a query for an address in
//! an overlapping region returns whichever candidate the binary search probes first. That is
//! not necessarily the range with the lowest start.
//!
//! [iptoasn]: https://iptoasn.com
use crate::address::{normalize, AddressValue};
use crate::error::Error;
use flate2::read::MultiGzDecoder;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

mod row;

pub use row::{AllowSet, AsnRange, RowOutcome, SkipReason};

/// Counters collected while building a [`RangeTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub rows: usize,
    pub ranges: usize,
    pub too_few_fields: usize,
    pub invalid_asn: usize,
    pub reserved_asn: usize,
    pub not_allowed: usize,
    pub malformed_bounds: usize,
    pub inverted_bounds: usize,
    /// Adjacent ranges (after sorting) whose intervals intersect.
    pub overlaps: usize,
}

impl BuildStats {
    fn record_skip(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::TooFewFields => &mut self.too_few_fields,
            SkipReason::InvalidAsn => &mut self.invalid_asn,
            SkipReason::ReservedAsn => &mut self.reserved_asn,
            SkipReason::NotAllowed => &mut self.not_allowed,
            SkipReason::MalformedBounds => &mut self.malformed_bounds,
            SkipReason::InvertedBounds => &mut self.inverted_bounds,
        };
        *counter += 1;
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.rows.saturating_sub(self.ranges)
    }

    fn log(&self) {
        tracing::info!(
            "loaded {} ASN ranges from {} rows ({} skipped)",
            self.ranges,
            self.rows,
            self.skipped()
        );
        tracing::debug!(
            too_few_fields = self.too_few_fields,
            invalid_asn = self.invalid_asn,
            reserved_asn = self.reserved_asn,
            not_allowed = self.not_allowed,
            malformed_bounds = self.malformed_bounds,
            inverted_bounds = self.inverted_bounds,
            "skipped rows"
        );
        if self.overlaps > 0 {
            tracing::warn!(
                "{} adjacent ASN ranges overlap, lookups in those regions are ambiguous",
                self.overlaps
            );
        }
    }
}

/// An immutable set of [`AsnRange`]s sorted ascending by start address.
#[derive(Debug, Default)]
pub struct RangeTable {
    ranges: Box<[AsnRange]>,
    stats: BuildStats,
}

impl RangeTable {
    /// Build a table from the source file at the given path. Files with a `.gz` extension are
    /// decompressed, anything else is read as plain tab separated text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] if the path can't be opened.
    ///
    /// Returns [`Error::DecompressionFailed`] if a `.gz` file isn't valid gzip data.
    ///
    /// Returns [`Error::IO`] if a plain file can't be read.
    pub fn try_from_file(p: impl AsRef<Path>, allow: &AllowSet) -> Result<Self, Error> {
        let path = p.as_ref();
        let f = File::open(path).map_err(|source| Error::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loading ASN ranges from {}", path.display());
        match path.extension().and_then(OsStr::to_str) {
            Some("gz") => Self::from_gzip(f, allow),
            _ => Self::from_tsv(BufReader::new(f), allow),
        }
    }

    /// Build a table from a gzip compressed stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecompressionFailed`] if the stream isn't valid gzip data.
    pub fn from_gzip<R: Read>(stream: R, allow: &AllowSet) -> Result<Self, Error> {
        let reader = BufReader::new(MultiGzDecoder::new(stream));
        Self::build(reader, allow, Error::DecompressionFailed)
    }

    /// Build a table from an uncompressed stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the stream can't be read.
    pub fn from_tsv<R: BufRead>(reader: R, allow: &AllowSet) -> Result<Self, Error> {
        Self::build(reader, allow, Error::IO)
    }

    fn build<R: BufRead>(
        reader: R,
        allow: &AllowSet,
        read_error: fn(io::Error) -> Error,
    ) -> Result<Self, Error> {
        let mut stats = BuildStats::default();
        let mut ranges = Vec::new();

        for line in reader.split(b'\n') {
            let line = line.map_err(read_error)?;
            stats.rows += 1;
            let line = String::from_utf8_lossy(&line);
            match row::parse(line.trim_end_matches('\r'), allow) {
                RowOutcome::Range(range) => ranges.push(range),
                RowOutcome::Skipped(reason) => stats.record_skip(reason),
            }
        }

        // Stable, so ranges sharing a start keep their source order.
        ranges.sort_by_key(|range| range.start);
        stats.ranges = ranges.len();
        stats.overlaps = ranges
            .windows(2)
            .filter(|pair| pair[0].end >= pair[1].start)
            .count();
        stats.log();

        Ok(Self {
            ranges: ranges.into_boxed_slice(),
            stats,
        })
    }

    /// Find the range containing `addr`, if any.
    #[must_use]
    pub fn find(&self, addr: AddressValue) -> Option<&AsnRange> {
        if self.ranges.is_empty() {
            return None;
        }

        let mut low = 0;
        let mut high = self.ranges.len() - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let range = &self.ranges[mid];
            if range.contains(addr) {
                return Some(range);
            } else if range.start > addr {
                match mid.checked_sub(1) {
                    Some(next) => high = next,
                    None => break,
                }
            } else {
                low = mid + 1;
            }
        }
        None
    }

    /// Return the ASN owning `addr`, or 0 if no range contains it.
    #[must_use]
    pub fn lookup(&self, addr: AddressValue) -> u32 {
        self.find(addr).map_or(0, |range| range.number)
    }

    /// Like [`RangeTable::lookup`], for a textual address. Malformed addresses return 0.
    #[must_use]
    pub fn lookup_str(&self, text: &str) -> u32 {
        normalize(text).map_or(0, |addr| self.lookup(addr))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AsnRange> {
        self.ranges.iter()
    }

    #[must_use]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }
}
