use crate::data::ProductionTable;
use crate::map::color::{Rgb, SERIES_PALETTE};

/// A fixed vertical marker on the time axis
pub struct EventMarker {
    pub year: i32,
    pub label: &'static str,
}

pub const EVENT_MARKERS: [EventMarker; 3] = [
    EventMarker { year: 1960, label: "OPEC Founded" },
    EventMarker { year: 1973, label: "1973 Oil Crisis" },
    EventMarker { year: 2008, label: "2008 Financial Crisis" },
];

pub const LINE_CHART_TITLE: &str = "Natural Gas Production by Country (1900-2022)";

/// One country's polyline, split into segments wherever a yearly value is
/// missing so gaps stay gaps
pub struct Series {
    pub name: String,
    pub color: Rgb,
    pub segments: Vec<Vec<(i32, f64)>>,
}

impl Series {
    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.segments.iter().flatten().copied()
    }
}

/// View model for the multi-series time-line chart
pub struct LineChart {
    pub series: Vec<Series>,
    pub x_min: i32,
    pub x_max: i32,
    pub y_max: f64,
}

impl LineChart {
    /// Build the chart for the selected countries. Empty selection means
    /// no chart at all, not an error. Countries with no column in the
    /// table contribute nothing.
    pub fn build(table: &ProductionTable, selected: &[String]) -> Option<Self> {
        if selected.is_empty() {
            return None;
        }
        let x_min = *table.years().iter().min()?;
        let x_max = *table.years().iter().max()?;

        let mut y_max = 0.0f64;
        let mut series = Vec::new();
        for (i, name) in selected.iter().filter(|c| table.has_country(c)).enumerate() {
            let points = table.series(name);
            let mut segments: Vec<Vec<(i32, f64)>> = Vec::new();
            for (year, value) in points {
                y_max = y_max.max(value);
                match segments.last_mut() {
                    Some(seg) if seg.last().is_some_and(|&(prev, _)| year == prev + 1) => {
                        seg.push((year, value));
                    }
                    _ => segments.push(vec![(year, value)]),
                }
            }
            series.push(Series {
                name: name.clone(),
                color: SERIES_PALETTE[i % SERIES_PALETTE.len()],
                segments,
            });
        }

        Some(Self {
            series,
            x_min,
            x_max,
            y_max: if y_max > 0.0 { y_max } else { 1.0 },
        })
    }

    /// Tick years every 10 years across the x range
    pub fn decade_ticks(&self) -> Vec<i32> {
        let first = self.x_min - self.x_min.rem_euclid(10) + if self.x_min % 10 == 0 { 0 } else { 10 };
        (first..=self.x_max).step_by(10).collect()
    }
}
