use crate::data::ProductionTable;

pub const RANKING_TITLE: &str = "Natural Gas Production Ranking for Selected Year";
pub const GAIN_LOSS_NOTE: &str =
    "Gains/Losses: Countries with the highest increase or decrease in production for the selected year.";

/// Year-over-year change for one country
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDelta {
    pub country: String,
    pub delta: f64,
}

/// The single largest gain and largest loss among the selected countries
#[derive(Debug, Clone, PartialEq)]
pub struct GainLoss {
    pub top_gain: MetricDelta,
    pub top_loss: MetricDelta,
}

/// View model for the per-year ranking panel
pub struct Ranking {
    pub year: i32,
    /// (country, production) sorted descending by production; countries
    /// with no figure for the year rank at zero
    pub bars: Vec<(String, f64)>,
    /// Absent when the previous year is out of range (year 1900) or no
    /// selected country has figures for both years
    pub gain_loss: Option<GainLoss>,
}

impl Ranking {
    pub fn build(table: &ProductionTable, selected: &[String], year: i32) -> Option<Self> {
        if selected.is_empty() || !table.has_year(year) {
            return None;
        }

        let mut bars: Vec<(String, f64)> = selected
            .iter()
            .map(|c| (c.clone(), table.value(year, c).unwrap_or(0.0)))
            .collect();
        bars.sort_by(|a, b| b.1.total_cmp(&a.1));

        let gain_loss = if table.has_year(year - 1) {
            // Deltas align current and previous year by column label, so
            // column order in the source file never matters
            let mut deltas: Vec<MetricDelta> = selected
                .iter()
                .filter_map(|c| {
                    let current = table.value(year, c)?;
                    let previous = table.value(year - 1, c)?;
                    Some(MetricDelta {
                        country: c.clone(),
                        delta: current - previous,
                    })
                })
                .collect();
            deltas.sort_by(|a, b| b.delta.total_cmp(&a.delta));
            match (deltas.first(), deltas.last()) {
                (Some(gain), Some(loss)) => Some(GainLoss {
                    top_gain: gain.clone(),
                    top_loss: loss.clone(),
                }),
                _ => None,
            }
        } else {
            None
        };

        Some(Self {
            year,
            bars,
            gain_loss,
        })
    }
}
