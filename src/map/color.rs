use ratatui::style::Color;

/// 24-bit color usable both on the terminal and in the HTML artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }
}

/// Neutral fill for regions whose value is NaN. Joined values are
/// zero-filled before coloring, so this only guards malformed input.
pub const NO_DATA_GRAY: Rgb = Rgb::new(0xD3, 0xD3, 0xD3);

const PRODUCTION_STOPS: [(f64, Rgb); 11] = [
    (0.0, Rgb::new(0xD2, 0xB4, 0x8C)),
    (5.0, Rgb::new(0xC9, 0xA6, 0x6D)),
    (10.0, Rgb::new(0xB8, 0x8D, 0x00)),
    (50.0, Rgb::new(0xD5, 0x7A, 0x00)),
    (100.0, Rgb::new(0xFF, 0x6F, 0x00)),
    (200.0, Rgb::new(0xB2, 0x22, 0x22)),
    (500.0, Rgb::new(0x8B, 0x00, 0x00)),
    (650.0, Rgb::new(0x80, 0x00, 0x00)),
    (1000.0, Rgb::new(0x66, 0x00, 0x00)),
    (1300.0, Rgb::new(0x80, 0x00, 0x20)),
    (1468.0, Rgb::new(0x4B, 0x00, 0x00)),
];

/// Default series palette for the line chart, one color per selected
/// country, cycling past ten.
pub const SERIES_PALETTE: [Rgb; 10] = [
    Rgb::new(0x63, 0x6E, 0xFA),
    Rgb::new(0xEF, 0x55, 0x3B),
    Rgb::new(0x00, 0xCC, 0x96),
    Rgb::new(0xAB, 0x63, 0xFA),
    Rgb::new(0xFF, 0xA1, 0x5A),
    Rgb::new(0x19, 0xD3, 0xF3),
    Rgb::new(0xFF, 0x66, 0x92),
    Rgb::new(0xB6, 0xE8, 0x80),
    Rgb::new(0xFF, 0x97, 0xFF),
    Rgb::new(0xFE, 0xCB, 0x52),
];

/// Bucketed color gradient: ordered (threshold, color) stops over a
/// clamped domain. Values are clamped to [vmin, vmax] first, then mapped
/// to the last stop whose threshold does not exceed them, so everything
/// below the domain shares one color and everything above shares the last.
pub struct StepColormap {
    stops: &'static [(f64, Rgb)],
    vmin: f64,
    vmax: f64,
    pub caption: &'static str,
}

/// The cumulative-production scale: 11 stops, domain [5, 1468] EJ
pub fn production_colormap() -> StepColormap {
    StepColormap {
        stops: &PRODUCTION_STOPS,
        vmin: 5.0,
        vmax: 1468.0,
        caption: "Cumulative production (EJ)",
    }
}

impl StepColormap {
    pub fn stops(&self) -> &[(f64, Rgb)] {
        self.stops
    }

    /// Map a value to its bucket color. NaN gets the neutral gray.
    pub fn color_at(&self, value: f64) -> Rgb {
        if value.is_nan() {
            return NO_DATA_GRAY;
        }
        let v = value.clamp(self.vmin, self.vmax);
        let mut color = self.stops[0].1;
        for &(threshold, c) in self.stops {
            if threshold <= v {
                color = c;
            } else {
                break;
            }
        }
        color
    }

    /// Bucket index for a value
    pub fn bucket(&self, value: f64) -> usize {
        let v = value.clamp(self.vmin, self.vmax);
        let mut idx = 0;
        for (i, &(threshold, _)) in self.stops.iter().enumerate() {
            if threshold <= v {
                idx = i;
            } else {
                break;
            }
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_domain_clamps_to_first_stop() {
        let cm = production_colormap();
        assert_eq!(cm.color_at(3.0), cm.color_at(5.0));
        assert_eq!(cm.color_at(0.0), cm.color_at(5.0));
    }

    #[test]
    fn test_above_domain_clamps_to_last_stop() {
        let cm = production_colormap();
        assert_eq!(cm.color_at(2000.0), cm.color_at(1468.0));
        assert_eq!(cm.color_at(1468.0), Rgb::new(0x4B, 0x00, 0x00));
    }

    #[test]
    fn test_in_domain_buckets() {
        let cm = production_colormap();
        assert_eq!(cm.color_at(7.0), Rgb::new(0xC9, 0xA6, 0x6D));
        assert_eq!(cm.color_at(120.0), Rgb::new(0xFF, 0x6F, 0x00));
        assert_eq!(cm.color_at(1300.0), Rgb::new(0x80, 0x00, 0x20));
    }

    #[test]
    fn test_monotonic_buckets() {
        let cm = production_colormap();
        let samples = [0.0, 1.0, 5.0, 9.9, 10.0, 49.0, 99.0, 150.0, 400.0, 600.0, 900.0, 1200.0, 1400.0, 1468.0, 9000.0];
        let mut prev = 0;
        for v in samples {
            let b = cm.bucket(v);
            assert!(b >= prev, "bucket regressed at {v}");
            prev = b;
        }
    }

    #[test]
    fn test_nan_falls_back_to_gray() {
        let cm = production_colormap();
        assert_eq!(cm.color_at(f64::NAN), NO_DATA_GRAY);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::new(0xD2, 0xB4, 0x8C).hex(), "#D2B48C");
    }
}
