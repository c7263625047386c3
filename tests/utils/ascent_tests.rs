use std::collections::HashMap;

use super::*;
use rrss_analysis::{analyze_ascent, write_region_records, PipelineConfig, TropopauseStatus};

pub fn test_tropopause(
    raw: &RawAscent,
    tgt_int_vals: &HashMap<String, i64>,
    tgt_float_vals: &HashMap<String, Vec<f64>>,
) {
    let analysis = analyze_ascent(raw, &PipelineConfig::default()).unwrap();
    let trop = analysis.tropopause();
    println!("tropopause: {:?} {}", trop.height(), trop.status());

    let status = *tgt_int_vals
        .get("tropopause status")
        .expect("No tropopause status given.");
    assert_eq!(i64::from(trop.status().code()), status);

    if trop.status() == TropopauseStatus::NotFound {
        assert!(trop.height().is_none());
        assert!(analysis.profile().is_empty());
    } else {
        let range = tgt_float_vals
            .get("tropopause height")
            .expect("No tropopause height given.");
        let height = trop.height().unpack().0;
        assert!(height >= range[0] && height <= range[1]);

        // Everything at and above the tropopause is gone.
        let profile = analysis.profile();
        let top = profile.height_profile()[profile.len() - 1].0;
        assert!(top < height);
    }
}

pub fn test_regions(
    raw: &RawAscent,
    tgt_int_vals: &HashMap<String, i64>,
    tgt_float_vals: &HashMap<String, Vec<f64>>,
) {
    let analysis = analyze_ascent(raw, &PipelineConfig::default()).unwrap();

    println!("\nregions = [");
    for region in analysis.regions() {
        println!("{:#?}", region);
    }
    println!("]");

    let num_regions = *tgt_int_vals.get("num regions").expect("No num value given.") as usize;
    assert_eq!(analysis.regions().len(), num_regions);
    assert_eq!(analysis.summary().region_count, num_regions);

    if num_regions == 0 {
        return;
    }

    let bounds = tgt_float_vals
        .get("region bounds")
        .expect("No region bounds given.");
    assert_eq!(bounds.len(), 2 * num_regions);

    // Every expected layer holds exactly one region.
    for layer in bounds.chunks(2) {
        let count = analysis
            .region_records()
            .iter()
            .filter(|rec| rec.bottom.height.0 >= layer[0] && rec.top.height.0 <= layer[1])
            .count();
        assert_eq!(count, 1);
    }

    let regions = analysis.regions();
    for (i, r0) in regions.iter().enumerate() {
        assert!(r0.gradient < PipelineConfig::default().region_search().ref_gradient);
        for r1 in &regions[i + 1..] {
            assert!(!r0.overlaps(r1));
        }
    }

    // Strongest first.
    for pair in regions.windows(2) {
        assert!(pair[0].strength >= pair[1].strength);
    }
}

pub fn test_records(raw: &RawAscent, tgt_int_vals: &HashMap<String, i64>) {
    let analysis = analyze_ascent(raw, &PipelineConfig::default()).unwrap();
    let num_regions = *tgt_int_vals.get("num regions").expect("No num value given.") as usize;

    let mut buf: Vec<u8> = vec![];
    write_region_records(&mut buf, analysis.region_records()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    println!("{}", text);

    assert_eq!(text.lines().count(), num_regions);
    for line in text.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 17);
        assert_eq!(fields[0], format!("{:05}", raw.station()));
    }

    for rec in analysis.region_records() {
        assert!(rec.middle.height > rec.bottom.height);
        assert!(rec.middle.height < rec.top.height);
        assert!(rec.middle.theta > rec.bottom.theta);
        assert!(rec.middle.theta < rec.top.theta);
        assert_eq!(rec.launch_time, analysis.profile().launch_time());
    }
}

pub fn test_smooth_all_fields(raw: &RawAscent, tgt_int_vals: &HashMap<String, i64>) {
    let config = PipelineConfig::default().with_smooth_all_fields(true);
    let analysis = analyze_ascent(raw, &config).unwrap();

    let status = *tgt_int_vals
        .get("tropopause status")
        .expect("No tropopause status given.");
    assert_eq!(i64::from(analysis.tropopause().status().code()), status);
}
