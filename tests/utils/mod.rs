#![allow(dead_code)]
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use rrss_analysis::{ProfileSource, RawAscent, RawRow, ReferenceHeights};

pub mod ascent_tests;

#[allow(unused_macros)] // False alarm
macro_rules! test_file {
    ($test_mod_name:ident, $fname:expr) => {
        mod $test_mod_name {
            use crate::utils::{self, ascent_tests};
            use rrss_analysis::RawAscent;
            use std::collections::HashMap;

            fn load_data() -> (RawAscent, HashMap<String, i64>, HashMap<String, Vec<f64>>) {
                utils::load_test_file($fname)
            }

            #[test]
            fn tropopause() {
                let (raw, ivals, fvals) = load_data();
                ascent_tests::test_tropopause(&raw, &ivals, &fvals);
            }

            #[test]
            fn stability_regions() {
                let (raw, ivals, fvals) = load_data();
                ascent_tests::test_regions(&raw, &ivals, &fvals);
            }

            #[test]
            fn region_records() {
                let (raw, ivals, _) = load_data();
                ascent_tests::test_records(&raw, &ivals);
            }

            #[test]
            fn smooth_all_fields() {
                let (raw, ivals, _) = load_data();
                ascent_tests::test_smooth_all_fields(&raw, &ivals);
            }
        }
    };
}

pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
    assert!(eps > 0.0);

    (val1 - val2).abs() < eps
}

pub fn test_data_path(fname: &str) -> PathBuf {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);
    test_path
}

fn read_file(fname: &str) -> String {
    let location = test_data_path(fname);
    let mut f = File::open(&location).expect(&format!("Error opening file: {:#?}", location));

    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .expect(&format!("Error reading file: {:#?}", location));

    contents
}

pub fn load_all_test_files() -> Vec<RawAscent> {
    [
        "standard_two_layers.csv",
        "canadian_sparse_heights.csv",
        "no_tropopause.csv",
    ]
    .iter()
    .map(|fname| load_test_file(fname).0)
    .collect()
}

pub fn load_reference_heights() -> ReferenceHeights {
    ReferenceHeights::from_str(&read_file("reference_heights.txt"))
        .expect("Error parsing reference heights")
}

pub fn load_test_rows(fname: &str) -> Vec<RawRow> {
    load_test_file(fname).0.rows().to_vec()
}

pub fn load_test_file(
    fname: &str,
) -> (RawAscent, HashMap<String, i64>, HashMap<String, Vec<f64>>) {
    let contents = read_file(fname);
    let mut line_iter = contents.lines().skip(1); // Header

    //
    // Parse profile data
    //
    let mut rows: Vec<RawRow> = vec![];
    for line in line_iter.by_ref() {
        if line.starts_with("### Expected ###") {
            break;
        }

        let tokens: Vec<f64> = line
            .split(',')
            .map(|tok| f64::from_str(tok.trim()).expect("Error parsing profile value"))
            .collect();
        if tokens.len() < 8 {
            continue;
        }

        rows.push(RawRow {
            station: tokens[0] as i32,
            pressure: tokens[1],
            temperature: tokens[2],
            dew_point_depression: tokens[3],
            height: tokens[4],
            longitude: tokens[5],
            latitude: tokens[6],
            time: tokens[7],
        });
    }

    //
    // Parse expected values
    //
    let mut source = ProfileSource::Standard;
    let mut ivals: HashMap<String, i64> = HashMap::new();
    let mut fvals: HashMap<String, Vec<f64>> = HashMap::new();

    for line in line_iter {
        let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
        match tokens.as_slice() {
            ["source", "canadian"] => source = ProfileSource::Canadian,
            ["source", _] => source = ProfileSource::Standard,
            [key, val] => {
                ivals.insert(
                    key.to_string(),
                    i64::from_str(val).expect("Error parsing integer value"),
                );
            }
            [key, vals @ ..] if !vals.is_empty() => {
                let vals = vals
                    .iter()
                    .map(|v| f64::from_str(v).expect("Error parsing float value"))
                    .collect();
                fvals.insert(key.to_string(), vals);
            }
            _ => {}
        }
    }

    let station = rows.first().map(|r| r.station).unwrap_or(0);
    let raw = RawAscent::new(station, source, rows).with_description(fname.to_owned());

    (raw, ivals, fvals)
}
