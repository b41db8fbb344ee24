use flate2::write::GzEncoder;
use flate2::Compression;
use httpasn::{normalize, AddressValue, AllowSet, RangeTable, RedirectMap, Resolver};
use std::io::Write;
use std::path::PathBuf;

const SAMPLE: &[u8] = include_bytes!("data/ip2asn-sample.tsv");

fn gzip_file(data: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(".tsv.gz")
        .tempfile()
        .unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    f.write_all(&encoder.finish().unwrap()).unwrap();
    f.flush().unwrap();
    f
}

fn assert_known_ranges(table: &RangeTable) {
    assert_eq!(table.lookup(normalize("178.248.240.6").unwrap()), 196_922);
    assert_eq!(table.lookup(normalize("31.212.9.5").unwrap()), 3320);
    assert_eq!(table.lookup(AddressValue::new(3_758_096_127)), 55415);
    assert_eq!(table.lookup(normalize("2a02:1308::1").unwrap()), 196_922);
}

#[test]
fn gzip_file_lookups() {
    let f = gzip_file(SAMPLE);
    let table = RangeTable::try_from_file(f.path(), &AllowSet::load_all()).unwrap();
    assert_eq!(table.len(), 11);
    assert_known_ranges(&table);
    assert_eq!(table.lookup(normalize("0.0.0.1").unwrap()), 0);
    assert_eq!(table.lookup(normalize("ffff::1").unwrap()), 0);
}

#[test]
fn plain_file_lookups() {
    let table =
        RangeTable::try_from_file("tests/data/ip2asn-sample.tsv", &AllowSet::load_all()).unwrap();
    assert_eq!(table.len(), 11);
    assert_known_ranges(&table);
}

#[test]
fn corrupt_gzip_file() {
    let mut f = tempfile::Builder::new()
        .suffix(".tsv.gz")
        .tempfile()
        .unwrap();
    f.write_all(SAMPLE).unwrap();
    f.flush().unwrap();
    let res = RangeTable::try_from_file(f.path(), &AllowSet::load_all());
    assert!(matches!(res, Err(httpasn::error::Error::DecompressionFailed(_))));
}

#[test]
fn redirect_file_filters_table() {
    let redirects = RedirectMap::parse(
        "/speedtest,0,https://speedtest.example.com/\n\
         /speedtest,3320,https://speedtest.telekom.example.com/\n\
         /speedtest,196922,https://speedtest.hofmeier.example.com/\n"
            .as_bytes(),
    )
    .unwrap();
    let f = gzip_file(SAMPLE);
    let table = RangeTable::try_from_file(f.path(), &redirects.allow_set()).unwrap();
    assert_eq!(table.len(), 4);
    assert!(table.iter().all(|range| [3320, 196_922].contains(&range.number)));
    assert_eq!(table.lookup(AddressValue::new(3_758_096_127)), 0);
}

#[test]
fn reload_swaps_table() {
    let resolver = Resolver::default();
    let before = resolver.snapshot();

    let f = gzip_file(SAMPLE);
    resolver
        .reload_from_file(f.path(), &AllowSet::load_all())
        .unwrap();

    assert!(before.is_empty());
    assert_known_ranges(&resolver.snapshot());
}

fn dataset_path() -> PathBuf {
    std::env::var_os("HTTPASN_DATABASE")
        .map_or_else(|| PathBuf::from("ip2asn-combined.tsv.gz"), PathBuf::from)
}

// The iptoasn dataset is too large to bundle. Run with:
//   curl -O https://iptoasn.com/data/ip2asn-combined.tsv.gz
//   cargo test -- --ignored
#[test]
#[ignore]
fn real_dataset() {
    let allow: AllowSet = [3320, 196_922, 33891, 12337, 2914].into_iter().collect();
    let filtered = RangeTable::try_from_file(dataset_path(), &allow).unwrap();
    assert!(filtered.len() > 400, "found only {} ranges", filtered.len());

    let table = RangeTable::try_from_file(dataset_path(), &AllowSet::load_all()).unwrap();
    assert!(table.len() > 800_000, "found only {} ranges", table.len());
    assert_known_ranges(&table);

    let ranges: Vec<_> = table.iter().collect();
    assert!(ranges.windows(2).all(|pair| pair[0].start <= pair[1].start));
}
