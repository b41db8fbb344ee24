//! Redirect targets keyed by request URI and ASN.
//!
//! The redirect file holds one `target,asn,url` mapping per line, e.g.
//!
//! ```text
//! # target,asn,url
//! /speedtest,0,https://speedtest.example.com/
//! /speedtest,3320,https://speedtest.telekom.example.com/
//! /speedtest,196922,https://speedtest.hofmeier.example.com/
//! ```
//!
//! `target` is matched against the full request URI. ASN `0` names the default URL for a
//! target, used when the client's ASN is unknown or has no mapping of its own. Lines
//! starting with `#` and lines with fewer than three fields are ignored.
use crate::error::Error;
use crate::table::AllowSet;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

pub type SharedRedirects = Arc<RedirectMap>;

/// The outcome of resolving a request against a [`RedirectMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect<'a> {
    /// The target isn't configured.
    UnknownTarget,
    /// The client's ASN has its own URL.
    Asn(&'a str),
    /// The client's ASN is unknown or unmapped, fall back to the target's default URL.
    Default(&'a str),
    /// The client's ASN is unknown or unmapped, and the target has no default URL.
    NoDefault,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectMap {
    targets: HashMap<String, HashMap<u32, String>>,
}

impl RedirectMap {
    /// Load a [`RedirectMap`] from the redirect file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the path can't be opened or read.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        Self::parse(BufReader::new(f))
    }

    /// Parse redirect mappings from a reader. Malformed lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the reader fails.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut targets: HashMap<String, HashMap<u32, String>> = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.starts_with('#') {
                continue;
            }
            let mut fields = line.splitn(3, ',');
            let (Some(target), Some(asn), Some(url)) = (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            let Ok(asn) = asn.parse::<u32>() else {
                tracing::warn!("ignoring broken ASN in redirect file: \"{asn}\"");
                continue;
            };
            targets
                .entry(target.to_string())
                .or_default()
                .insert(asn, url.to_string());
        }
        Ok(Self { targets })
    }

    /// Every ASN named in the redirect file, including `0` for defaults.
    ///
    /// A file naming only defaults yields `{0}`, which admits no range table rows since ASN 0
    /// is reserved. Only an empty file yields the load-all set.
    #[must_use]
    pub fn allow_set(&self) -> AllowSet {
        self.targets
            .values()
            .flat_map(HashMap::keys)
            .copied()
            .collect()
    }

    /// Pick the redirect for a request to `target` from a client in `asn` (0 if unknown).
    #[must_use]
    pub fn resolve(&self, target: &str, asn: u32) -> Redirect<'_> {
        let Some(urls) = self.targets.get(target) else {
            return Redirect::UnknownTarget;
        };
        if asn != 0 {
            if let Some(url) = urls.get(&asn) {
                return Redirect::Asn(url);
            }
        }
        urls.get(&0)
            .map_or(Redirect::NoDefault, |url| Redirect::Default(url))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RangeTable;

    const REDIRECTS: &str = "\
# target,asn,url
/speedtest,0,https://speedtest.example.com/
/speedtest,3320,https://speedtest.telekom.example.com/
/speedtest,196922,https://speedtest.hofmeier.example.com/?a=1,b=2
/mirror,2914,https://mirror.ntt.example.com/
/broken,AS3320,https://broken.example.com/
/short,3320
";

    fn redirects() -> RedirectMap {
        RedirectMap::parse(REDIRECTS.as_bytes()).unwrap()
    }

    #[test]
    fn parse_skips_comments_and_malformed_lines() {
        let map = redirects();
        assert_eq!(map.len(), 2);
        assert_eq!(map.resolve("/broken", 3320), Redirect::UnknownTarget);
        assert_eq!(map.resolve("/short", 3320), Redirect::UnknownTarget);
        assert_eq!(map.resolve("# target", 0), Redirect::UnknownTarget);
    }

    #[test]
    fn resolve() {
        let map = redirects();
        assert_eq!(
            map.resolve("/speedtest", 3320),
            Redirect::Asn("https://speedtest.telekom.example.com/")
        );
        assert_eq!(
            map.resolve("/speedtest", 196_922),
            Redirect::Asn("https://speedtest.hofmeier.example.com/?a=1,b=2")
        );
        assert_eq!(
            map.resolve("/speedtest", 13335),
            Redirect::Default("https://speedtest.example.com/")
        );
        assert_eq!(
            map.resolve("/speedtest", 0),
            Redirect::Default("https://speedtest.example.com/")
        );
        assert_eq!(map.resolve("/mirror", 3320), Redirect::NoDefault);
        assert_eq!(map.resolve("/unknown", 3320), Redirect::UnknownTarget);
    }

    #[test]
    fn allow_set_names_every_asn() {
        let allow = redirects().allow_set();
        assert_eq!(allow.len(), 4);
        for asn in [0, 3320, 196_922, 2914] {
            assert!(allow.permits(asn));
        }
        assert!(!allow.permits(13335));
    }

    #[test]
    fn defaults_only_file_loads_nothing() {
        let map = RedirectMap::parse("/speedtest,0,https://speedtest.example.com/\n".as_bytes())
            .unwrap();
        let allow = map.allow_set();
        assert!(!allow.is_load_all());

        let sample = include_str!("../tests/data/ip2asn-sample.tsv");
        let table = RangeTable::from_tsv(sample.as_bytes(), &allow).unwrap();
        assert!(table.is_empty());
        assert_eq!(
            map.resolve("/speedtest", table.lookup_str("31.212.9.5")),
            Redirect::Default("https://speedtest.example.com/")
        );
    }

    #[test]
    fn empty_file_loads_all() {
        let map = RedirectMap::parse("".as_bytes()).unwrap();
        assert!(map.is_empty());
        assert!(map.allow_set().is_load_all());
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            RedirectMap::try_from_file("/nonexistent/redirects.txt"),
            Err(Error::IO(_))
        ));
    }
}
