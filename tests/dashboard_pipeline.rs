use std::io::Write;

use pretty_assertions::assert_eq;
use us_population_dashboard::data::cache::DatasetCache;
use us_population_dashboard::data::loader::{load_file, LoadOptions};
use us_population_dashboard::data::metrics::{compute_year_metrics, delta_view, top_n};
use us_population_dashboard::data::views::{build_export_table, build_pivot};
use us_population_dashboard::data::DataError;

const SOURCE: &str = "\
 States ,Id,2010,2011,2012
California,6,\"37,319,502\",\"37,638,369\",\"37,948,800\"
Texas,48,\"25,241,897\",\"25,645,504\",\"26,084,120\"
Wyoming,56,\"564,487\",\"567,299\",\"576,305\"
Vermont,50,\"625,879\",\"627,051\",\"626,090\"
";

fn write_source(text: &str) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(text.as_bytes()).unwrap();
    tmp.flush().unwrap();
    tmp
}

#[test]
fn load_metrics_and_export_from_file() {
    let tmp = write_source(SOURCE);
    let ds = load_file(tmp.path(), &LoadOptions::default()).unwrap();
    assert_eq!(ds.len(), 12);
    assert_eq!((ds.min_year(), ds.max_year()), (2010, 2012));

    let m = compute_year_metrics(&ds, 2012).unwrap();
    assert_eq!(m.top_state.record.state, "California");
    assert_eq!(m.top_state_delta(), Some(310_431.0));
    assert_eq!(m.low_state.record.state, "Wyoming");
    assert_eq!(m.low_state_delta(), Some(9_006.0));

    let top: Vec<String> = top_n(&ds, 2012, 2).unwrap().into_iter().map(|r| r.state).collect();
    assert_eq!(top, vec!["California", "Texas"]);

    let export = build_export_table(&ds, 2012).unwrap();
    let csv = export.to_csv_string(b',').unwrap();
    assert_eq!(
        csv.lines().collect::<Vec<_>>(),
        vec![
            "states,id,year,population",
            "California,6,2012,37948800.0",
            "Texas,48,2012,26084120.0",
            "Vermont,50,2012,626090.0",
            "Wyoming,56,2012,576305.0",
        ]
    );
}

#[test]
fn every_year_yields_consistent_views() {
    let tmp = write_source(SOURCE);
    let ds = load_file(tmp.path(), &LoadOptions::default()).unwrap();
    let pivot = build_pivot(&ds);
    assert_eq!(pivot.cell_count(), ds.years().len() * ds.states().len());

    for year in ds.min_year()..=ds.max_year() {
        let m = compute_year_metrics(&ds, year).unwrap();
        let view = delta_view(&ds, year).unwrap();
        for d in &view {
            assert!(m.top_state.record.population >= d.record.population);
            assert_eq!(pivot.get(year, &d.record.state), Some(d.record.population));
            if year == ds.min_year() {
                assert_eq!(d.population_prev, None);
            } else {
                assert_eq!(d.population_prev, ds.population(&d.record.state, year - 1));
            }
        }
        assert_eq!(top_n(&ds, year, 10).unwrap().len(), ds.states().len());
    }

    assert!(matches!(
        compute_year_metrics(&ds, 2025),
        Err(DataError::Range { year: 2025, .. })
    ));
}

#[test]
fn cache_shares_one_dataset() {
    let tmp = write_source(SOURCE);
    let mut cache = DatasetCache::new();
    let a = cache.get_or_load(tmp.path(), &LoadOptions::default()).unwrap();
    let b = cache.get_or_load(tmp.path(), &LoadOptions::default()).unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}

#[test]
fn malformed_file_fails_whole_load() {
    let tmp = write_source("states,id,2010\nTexas,48,\"1,200\"\nOhio,x39,5\n");
    let err = load_file(tmp.path(), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, DataError::MalformedSource { .. }));
    assert!(err.to_string().contains("x39"));
}
