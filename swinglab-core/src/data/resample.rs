//! Resample a bar series to a coarser frequency.
//!
//! Bars are grouped by ISO week or calendar month. Each group becomes one bar:
//! open of the first, max high, min low, close of the last, summed volume,
//! stamped with the last constituent's timestamp (the period's final trading day).

use crate::domain::{validate_bars, Bar, BarFrequency, DataError};
use chrono::{Datelike, NaiveDateTime};

fn period_key(timestamp: NaiveDateTime, frequency: BarFrequency) -> (i32, u32) {
    let date = timestamp.date();
    match frequency {
        BarFrequency::Daily => (date.year(), date.ordinal()),
        BarFrequency::Weekly => {
            let week = date.iso_week();
            (week.year(), week.week())
        }
        BarFrequency::Monthly => (date.year(), date.month()),
    }
}

/// Aggregate `bars` into `frequency` bars.
///
/// The input is validated first. Resampling to `Daily` returns the input unchanged.
pub fn resample(bars: &[Bar], frequency: BarFrequency) -> Result<Vec<Bar>, DataError> {
    validate_bars(bars)?;
    if frequency == BarFrequency::Daily {
        return Ok(bars.to_vec());
    }

    let mut out: Vec<Bar> = Vec::new();
    let mut current_key = None;
    for bar in bars {
        let key = period_key(bar.timestamp, frequency);
        match out.last_mut() {
            Some(agg) if current_key == Some(key) => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
                agg.timestamp = bar.timestamp;
            }
            _ => {
                out.push(bar.clone());
                current_key = Some(key);
            }
        }
    }
    Ok(out)
}
