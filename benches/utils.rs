use rrss_analysis::{ProfileSource, RawAscent, RawRow};
use std::{fs::File, io::Read, path::PathBuf, str::FromStr};

pub fn load_all_test_files() -> [RawAscent; 3] {
    let raw1 = load_test_file("standard_two_layers.csv", ProfileSource::Standard);
    let raw2 = load_test_file("canadian_sparse_heights.csv", ProfileSource::Canadian);
    let raw3 = load_test_file("no_tropopause.csv", ProfileSource::Standard);

    [raw1, raw2, raw3]
}

#[allow(dead_code)]
pub fn load_gridded_profiles() -> Vec<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    load_all_test_files()
        .iter()
        .map(|raw| {
            let prof = raw
                .to_profile()
                .unwrap()
                .regrid(metfor::Meters(10.0))
                .unwrap()
                .with_potential_temperature();

            let height: Vec<f64> = prof.height_profile().iter().map(|z| z.0).collect();
            let temperature: Vec<f64> = prof.temperature_profile().iter().map(|t| t.0).collect();
            let theta: Vec<f64> = prof.theta_profile().iter().map(|th| th.0).collect();

            (height, temperature, theta)
        })
        .collect()
}

fn load_test_file(fname: &str, source: ProfileSource) -> RawAscent {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);
    load_test_csv_ascent(&test_path, source)
}

fn load_test_csv_ascent(location: &PathBuf, source: ProfileSource) -> RawAscent {
    let mut f = File::open(location).expect(&format!("Error opening file: {:#?}", location));

    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .expect(&format!("Error reading file: {:#?}", location));

    let rows: Vec<RawRow> = contents
        .lines()
        .skip(1)
        .take_while(|line| !line.starts_with("###"))
        .filter_map(|line| {
            let tokens: Vec<f64> = line
                .split(',')
                .filter_map(|tok| f64::from_str(tok.trim()).ok())
                .collect();
            if tokens.len() < 8 {
                return None;
            }

            Some(RawRow {
                station: tokens[0] as i32,
                pressure: tokens[1],
                temperature: tokens[2],
                dew_point_depression: tokens[3],
                height: tokens[4],
                longitude: tokens[5],
                latitude: tokens[6],
                time: tokens[7],
            })
        })
        .collect();

    let station = rows.first().map(|r| r.station).unwrap_or(0);
    RawAscent::new(station, source, rows)
}
