//! A shared, reloadable handle to the current [`RangeTable`].
//!
//! Readers take a snapshot of the table and query it without locking. A reload builds a new
//! table off to the side and publishes it as a unit, so a reader never observes a partially
//! constructed table. Snapshots taken before a swap keep the old table alive until dropped.
use crate::address::AddressValue;
use crate::error::Error;
use crate::table::{AllowSet, RangeTable};
use arc_swap::{ArcSwap, Guard};
use std::path::Path;
use std::sync::Arc;

#[allow(clippy::module_name_repetitions)]
pub type SharedResolver = Arc<Resolver>;

#[derive(Debug)]
pub struct Resolver {
    table: ArcSwap<RangeTable>,
}

impl Resolver {
    #[must_use]
    pub fn new(table: RangeTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    /// The current table. Holding the returned guard keeps that table alive across reloads.
    pub fn snapshot(&self) -> Guard<Arc<RangeTable>> {
        self.table.load()
    }

    /// Return the ASN owning `addr` in the current table, or 0.
    pub fn lookup(&self, addr: AddressValue) -> u32 {
        self.snapshot().lookup(addr)
    }

    /// Atomically publish `table`, returning the one it replaced.
    pub fn replace(&self, table: RangeTable) -> Arc<RangeTable> {
        self.table.swap(Arc::new(table))
    }

    /// Rebuild the table from `p` and publish it. The current table is kept if the build fails.
    ///
    /// # Errors
    ///
    /// Returns any error from [`RangeTable::try_from_file`].
    pub fn reload_from_file(&self, p: impl AsRef<Path>, allow: &AllowSet) -> Result<(), Error> {
        let table = RangeTable::try_from_file(p, allow)?;
        let old = self.replace(table);
        tracing::info!(
            "replaced {} ASN ranges with {}",
            old.len(),
            self.snapshot().len()
        );
        Ok(())
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(RangeTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::normalize;
    use std::io::Write;

    const SAMPLE: &str = include_str!("../tests/data/ip2asn-sample.tsv");

    #[test]
    fn default_resolver_is_empty() {
        let resolver = Resolver::default();
        assert!(resolver.snapshot().is_empty());
        assert_eq!(resolver.lookup(normalize("178.248.240.6").unwrap()), 0);
    }

    #[test]
    fn replace_publishes_new_table() {
        let resolver = Resolver::default();
        let snapshot = resolver.snapshot();

        let table = RangeTable::from_tsv(SAMPLE.as_bytes(), &AllowSet::load_all()).unwrap();
        let old = resolver.replace(table);

        assert!(old.is_empty());
        // Snapshots taken before the swap still see the old table.
        assert!(snapshot.is_empty());
        assert_eq!(resolver.lookup(normalize("178.248.240.6").unwrap()), 196_922);
    }

    #[test]
    fn failed_reload_keeps_current_table() {
        let table = RangeTable::from_tsv(SAMPLE.as_bytes(), &AllowSet::load_all()).unwrap();
        let resolver = Resolver::new(table);

        let res = resolver.reload_from_file("/nonexistent/ip2asn.tsv.gz", &AllowSet::load_all());
        assert!(matches!(res, Err(Error::SourceUnavailable { .. })));
        assert_eq!(resolver.snapshot().len(), 11);
    }

    #[test]
    fn reload_from_file() {
        let mut f = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        f.write_all(b"4.2.2.0\t4.2.2.255\t3356\tUS\tLEVEL3\n").unwrap();
        f.flush().unwrap();

        let resolver = Resolver::default();
        resolver
            .reload_from_file(f.path(), &AllowSet::load_all())
            .unwrap();
        assert_eq!(resolver.snapshot().len(), 1);
        assert_eq!(resolver.lookup(normalize("4.2.2.1").unwrap()), 3356);
    }

    #[test]
    fn concurrent_readers() {
        let table = RangeTable::from_tsv(SAMPLE.as_bytes(), &AllowSet::load_all()).unwrap();
        let resolver: SharedResolver = Arc::new(Resolver::new(table));
        let addr = normalize("31.212.9.5").unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resolver = resolver.clone();
                std::thread::spawn(move || (0..1000).all(|_| resolver.lookup(addr) == 3320))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
