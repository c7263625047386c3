//! Per-ascent output records and their text format.
//!
//! Records are written one per line with tab separated fields. Heights are written in km.
use crate::profile::ProfilePoint;
use crate::stability::StabilityRegion;
use crate::tropopause::TropopauseStatus;
use chrono::NaiveDateTime;
use metfor::{Km, Meters};
use optional::Optioned;
use std::fmt::{self, Display};
use std::io::{self, Write};

/// A region of reduced stability along with where and when it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRecord {
    /// WMO station number.
    pub station: i32,
    /// Latitude and longitude of the launch site.
    pub location: Option<(f64, f64)>,
    /// Valid time of the ascent.
    pub valid_time: Option<NaiveDateTime>,
    /// Launch time in seconds.
    pub launch_time: Optioned<i64>,
    /// Height of the tropopause for the ascent.
    pub tropopause_height: Optioned<Meters>,
    /// The region, with indexes into the analyzed profile.
    pub region: StabilityRegion,
    /// Values at the bottom of the region.
    pub bottom: ProfilePoint,
    /// Values at the top of the region.
    pub top: ProfilePoint,
    /// Values interpolated to the middle of the region.
    pub middle: ProfilePoint,
}

/// Summary of an ascent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentSummary {
    /// WMO station number.
    pub station: i32,
    /// Valid time of the ascent.
    pub valid_time: Option<NaiveDateTime>,
    /// Height of the tropopause.
    pub tropopause_height: Optioned<Meters>,
    /// How the tropopause search ended.
    pub status: TropopauseStatus,
    /// Whether the tropopause is above the station's reference height, if that is known.
    pub above_reference: Option<bool>,
    /// Number of regions found.
    pub region_count: usize,
}

fn write_point(f: &mut fmt::Formatter, pnt: &ProfilePoint) -> fmt::Result {
    write!(
        f,
        "\t{:6.2}\t{:6.2}\t{:6.3}\t{:6.2}",
        pnt.temperature.0,
        pnt.dew_point_depression.0,
        Km::from(pnt.height).0,
        pnt.theta.0
    )
}

impl Display for RegionRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:05}\t", self.station)?;

        match self.location {
            Some((lat, lon)) => write!(f, "( {:8.4}, {:8.4})\t", lon, lat)?,
            None => write!(f, "( {:>8}, {:>8})\t", "NaN", "NaN")?,
        }

        match self.valid_time {
            Some(vt) => write!(f, "{}\t", vt.format("%Y%m%d%H"))?,
            None => write!(f, "{:>10}\t", "-")?,
        }

        match self.launch_time.into_option() {
            Some(lt) => write!(f, "{:5}\t", lt)?,
            None => write!(f, "{:>5}\t", "-")?,
        }

        write!(f, "{:6.3}", Km::from(self.tropopause_height.unpack()).0)?;

        write_point(f, &self.bottom)?;
        write_point(f, &self.top)?;
        write_point(f, &self.middle)
    }
}

impl Display for AscentSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let above = match self.above_reference {
            Some(true) => "true",
            Some(false) => "false",
            None => "-",
        };

        write!(f, "{}\t{:2}", above, self.region_count)
    }
}

/// Write region records, one per line.
pub fn write_region_records<'a, W, I>(mut writer: W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a RegionRecord>,
{
    for rec in records {
        writeln!(writer, "{}", rec)?;
    }
    Ok(())
}

/// Write ascent summaries, one per line.
pub fn write_summaries<'a, W, I>(mut writer: W, summaries: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a AscentSummary>,
{
    for summary in summaries {
        writeln!(writer, "{}", summary)?;
    }
    Ok(())
}
