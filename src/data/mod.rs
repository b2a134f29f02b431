use anyhow::{bail, Context, Result};
use geojson::{GeoJson, Value};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub const MAP_DATA_FILE: &str = "data_for_map.csv";
pub const LINE_DATA_FILE: &str = "line_data.csv";
pub const WORLD_GEOJSON_FILE: &str = "worldmap.geojson";

/// One melted cell of the wide per-year table
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionRecord {
    pub country: String,
    pub year: i32,
    pub production: f64,
}

/// Row of the cumulative production table
#[derive(Debug, Clone, Deserialize)]
pub struct CumulativeRecord {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Cumulative production")]
    pub cumulative: f64,
}

/// Country → cumulative production (EJ), 1900-2022
pub struct CumulativeTable {
    records: Vec<CumulativeRecord>,
    index: HashMap<String, f64>,
}

impl CumulativeTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut records = Vec::new();
        for row in rdr.deserialize() {
            let rec: CumulativeRecord = row.context("malformed cumulative production row")?;
            records.push(rec);
        }
        let index = records
            .iter()
            .map(|r| (r.country.clone(), r.cumulative))
            .collect();
        Ok(Self { records, index })
    }

    /// Exact-name lookup; no fuzzy or alias resolution
    pub fn get(&self, country: &str) -> Option<f64> {
        self.index.get(country).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Wide per-year production table: one row per year, one column per
/// country. Cells are absent where the source has no figure; lookups are
/// by column label, never by position.
pub struct ProductionTable {
    countries: Vec<String>,
    columns: HashMap<String, usize>,
    years: Vec<i32>,
    rows: HashMap<i32, usize>,
    cells: Vec<Vec<Option<f64>>>,
}

impl ProductionTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers().context("reading production table header")?;
        match headers.get(0) {
            Some("Year") => {}
            other => bail!("production table must lead with a Year column, found {other:?}"),
        }
        let countries: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        let columns = countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        let mut years = Vec::new();
        let mut rows = HashMap::new();
        let mut cells = Vec::new();
        for record in rdr.records() {
            let record = record.context("reading production table row")?;
            let year: i32 = record
                .get(0)
                .unwrap_or_default()
                .trim()
                .parse()
                .with_context(|| format!("bad Year cell in row {}", cells.len() + 1))?;
            let mut row = Vec::with_capacity(countries.len());
            for cell in record.iter().skip(1) {
                let cell = cell.trim();
                if cell.is_empty() {
                    row.push(None);
                } else {
                    let value: f64 = cell
                        .parse()
                        .with_context(|| format!("bad production cell for year {year}"))?;
                    row.push(Some(value));
                }
            }
            rows.insert(year, years.len());
            years.push(year);
            cells.push(row);
        }

        Ok(Self {
            countries,
            columns,
            years,
            rows,
            cells,
        })
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.rows.contains_key(&year)
    }

    pub fn has_country(&self, country: &str) -> bool {
        self.columns.contains_key(country)
    }

    /// Cell lookup aligned by row year and column label
    pub fn value(&self, year: i32, country: &str) -> Option<f64> {
        let row = *self.rows.get(&year)?;
        let col = *self.columns.get(country)?;
        self.cells[row][col]
    }

    /// All present (year, production) points for one country, in year order
    pub fn series(&self, country: &str) -> Vec<(i32, f64)> {
        let Some(&col) = self.columns.get(country) else {
            return Vec::new();
        };
        self.years
            .iter()
            .zip(&self.cells)
            .filter_map(|(&year, row)| row[col].map(|v| (year, v)))
            .collect()
    }

    /// Reshape to long form restricted to the given countries; absent
    /// cells are omitted (they render as line gaps)
    pub fn melt(&self, countries: &[String]) -> Vec<ProductionRecord> {
        let mut out = Vec::new();
        for country in countries {
            let Some(&col) = self.columns.get(country) else {
                continue;
            };
            for (&year, row) in self.years.iter().zip(&self.cells) {
                if let Some(production) = row[col] {
                    out.push(ProductionRecord {
                        country: country.clone(),
                        year,
                        production,
                    });
                }
            }
        }
        out
    }
}

/// Country polygons extracted from the world boundary file. All rings are
/// kept (holes cancel in the even-odd fill).
pub struct CountryShape {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

fn ring_coords(ring: &[Vec<f64>]) -> Vec<(f64, f64)> {
    ring.iter().map(|c| (c[0], c[1])).collect()
}

pub fn shapes_from_geojson(geojson: &GeoJson) -> Vec<CountryShape> {
    let GeoJson::FeatureCollection(fc) = geojson else {
        warn!("world boundary file is not a feature collection");
        return Vec::new();
    };

    let mut shapes = Vec::new();
    for feature in &fc.features {
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("SOVEREIGNT"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let Some(name) = name else {
            warn!("skipping feature without SOVEREIGNT name");
            continue;
        };

        let mut rings = Vec::new();
        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Polygon(poly)) => {
                for ring in poly {
                    rings.push(ring_coords(ring));
                }
            }
            Some(Value::MultiPolygon(polys)) => {
                for poly in polys {
                    for ring in poly {
                        rings.push(ring_coords(ring));
                    }
                }
            }
            _ => {
                warn!(country = %name, "skipping feature without polygon geometry");
                continue;
            }
        }

        shapes.push(CountryShape { name, rings });
    }
    shapes
}

/// Everything the dashboard renders from, loaded once at startup
pub struct DashboardData {
    pub cumulative: CumulativeTable,
    pub production: ProductionTable,
    pub shapes: Vec<CountryShape>,
}

impl DashboardData {
    /// Load the two tables and the boundary geometry from `dir`.
    /// Any missing or malformed file is fatal; the dashboard has no
    /// function without its data.
    pub fn load(dir: &Path) -> Result<Self> {
        let map_path = dir.join(MAP_DATA_FILE);
        let file = fs::File::open(&map_path)
            .with_context(|| format!("opening {}", map_path.display()))?;
        let cumulative = CumulativeTable::from_reader(file)
            .with_context(|| format!("parsing {}", map_path.display()))?;

        let line_path = dir.join(LINE_DATA_FILE);
        let file = fs::File::open(&line_path)
            .with_context(|| format!("opening {}", line_path.display()))?;
        let production = ProductionTable::from_reader(file)
            .with_context(|| format!("parsing {}", line_path.display()))?;

        let geo_path = dir.join(WORLD_GEOJSON_FILE);
        let content = fs::read_to_string(&geo_path)
            .with_context(|| format!("reading {}", geo_path.display()))?;
        let geojson: GeoJson = content
            .parse()
            .with_context(|| format!("parsing {}", geo_path.display()))?;
        let shapes = shapes_from_geojson(&geojson);

        info!(
            countries = cumulative.len(),
            years = production.years().len(),
            regions = shapes.len(),
            "dashboard data loaded"
        );
        Ok(Self {
            cumulative,
            production,
            shapes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE: &str = "\
Year,China,Russia,United States
1999,10.5,20.0,30.0
2000,11.0,19.5,31.5
2001,,19.0,32.0
";

    fn table() -> ProductionTable {
        ProductionTable::from_reader(WIDE.as_bytes()).unwrap()
    }

    #[test]
    fn test_value_is_label_aligned() {
        let t = table();
        assert_eq!(t.value(2000, "Russia"), Some(19.5));
        assert_eq!(t.value(2000, "China"), Some(11.0));
        assert_eq!(t.value(2001, "China"), None);
        assert_eq!(t.value(1900, "China"), None);
        assert_eq!(t.value(2000, "Atlantis"), None);
    }

    #[test]
    fn test_series_skips_missing_cells() {
        let t = table();
        assert_eq!(t.series("China"), vec![(1999, 10.5), (2000, 11.0)]);
        assert_eq!(t.series("Russia").len(), 3);
        assert!(t.series("Atlantis").is_empty());
    }

    #[test]
    fn test_melt_round_trip() {
        let t = table();
        let selected = vec!["China".to_string(), "United States".to_string()];
        let long = t.melt(&selected);
        // Wide to long and back reproduces the source cells exactly
        for rec in &long {
            assert_eq!(t.value(rec.year, &rec.country), Some(rec.production));
        }
        // 2 China cells + 3 United States cells; the absent China cell is omitted
        assert_eq!(long.len(), 5);
    }

    #[test]
    fn test_rejects_missing_year_header() {
        let bad = "Country,China\n1999,1.0\n";
        assert!(ProductionTable::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_unparseable_cell() {
        let bad = "Year,China\n1999,not-a-number\n";
        assert!(ProductionTable::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_cumulative_table() {
        let csv = "Country,Cumulative production\nUnited States,1468.0\nRussia,900.2\n";
        let t = CumulativeTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(t.get("Russia"), Some(900.2));
        assert_eq!(t.get("Atlantis"), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_shapes_from_geojson() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"SOVEREIGNT": "Testland"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                    }
                }
            ]
        }"#;
        let geojson: GeoJson = raw.parse().unwrap();
        let shapes = shapes_from_geojson(&geojson);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].name, "Testland");
        assert_eq!(shapes[0].rings.len(), 1);
    }
}
