use rayon::prelude::*;
use tracing::info;

use crate::braille::ColorCanvas;
use crate::data::{CountryShape, CumulativeTable};
use crate::map::color::{production_colormap, Rgb, StepColormap};
use crate::map::geometry::{draw_line, draw_thick_line, point_in_rings, polygon_spans, Span};
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;

/// A country region joined with its cumulative production value
pub struct Region {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
    pub bbox: (f64, f64, f64, f64),
    /// Zero when the production table has no row for this name; a missing
    /// join match is indistinguishable from true zero production.
    pub cumulative: f64,
}

/// Rasterized geometry for one region, ready to blit
struct RegionRaster {
    idx: usize,
    spans: Vec<Span>,
    segments: Vec<(i32, i32, i32, i32)>,
}

/// Choropleth world map: joined regions, bucket colors, spatial index for
/// hover hit-testing, name search.
pub struct Choropleth {
    regions: Vec<Region>,
    grid: FeatureGrid,
    scale: StepColormap,
}

fn shape_bbox(rings: &[Vec<(f64, f64)>]) -> (f64, f64, f64, f64) {
    let mut bbox = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for ring in rings {
        for &(lon, lat) in ring {
            bbox.0 = bbox.0.min(lon);
            bbox.1 = bbox.1.min(lat);
            bbox.2 = bbox.2.max(lon);
            bbox.3 = bbox.3.max(lat);
        }
    }
    bbox
}

impl Choropleth {
    /// Left-join geometry to the cumulative table on exact name match.
    /// Unmatched regions are retained with zero production.
    pub fn build(shapes: Vec<CountryShape>, table: &CumulativeTable) -> Self {
        let mut unmatched = 0usize;
        let regions: Vec<Region> = shapes
            .into_iter()
            .map(|shape| {
                let cumulative = match table.get(&shape.name) {
                    Some(v) => v,
                    None => {
                        unmatched += 1;
                        0.0
                    }
                };
                let bbox = shape_bbox(&shape.rings);
                Region {
                    name: shape.name,
                    rings: shape.rings,
                    bbox,
                    cumulative,
                }
            })
            .collect();

        if unmatched > 0 {
            info!(unmatched, "regions without a production row render as zero");
        }

        let grid = FeatureGrid::build(regions.iter().map(|r| r.bbox), 5.0);
        Self {
            regions,
            grid,
            scale: production_colormap(),
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn scale(&self) -> &StepColormap {
        &self.scale
    }

    /// Bucket fill color for one region
    pub fn fill_color(&self, region: &Region) -> Rgb {
        self.scale.color_at(region.cumulative)
    }

    /// Rasterize all regions into a fill canvas and a border canvas.
    /// Regions named in `emphasis` get the thick highlight border.
    /// Span and segment computation fans out across regions; canvas
    /// writes stay on the caller's thread.
    pub fn render(
        &self,
        viewport: &Viewport,
        fill: &mut ColorCanvas,
        borders: &mut ColorCanvas,
        emphasis: &[&str],
    ) {
        let width = viewport.width as i32;
        let height = viewport.height as i32;

        let rasters: Vec<RegionRaster> = self
            .regions
            .par_iter()
            .enumerate()
            .filter_map(|(idx, region)| {
                let (px0, py1) = viewport.project(region.bbox.0, region.bbox.1);
                let (px1, py0) = viewport.project(region.bbox.2, region.bbox.3);
                if !viewport.line_might_be_visible((px0, py0), (px1, py1)) {
                    return None;
                }

                let projected: Vec<Vec<(i32, i32)>> = region
                    .rings
                    .iter()
                    .map(|ring| ring.iter().map(|&(lon, lat)| viewport.project(lon, lat)).collect())
                    .collect();

                let mut segments = Vec::new();
                for ring in &projected {
                    if ring.len() < 2 {
                        continue;
                    }
                    let mut prev: Option<(i32, i32)> = None;
                    for &(px, py) in ring {
                        if let Some((prev_x, prev_y)) = prev {
                            // Long jumps are antimeridian wraps, not edges
                            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
                            if dist < viewport.width
                                && viewport.line_might_be_visible((prev_x, prev_y), (px, py))
                            {
                                segments.push((prev_x, prev_y, px, py));
                            }
                        }
                        prev = Some((px, py));
                    }
                }

                let spans = polygon_spans(&projected, width, height);
                if spans.is_empty() && segments.is_empty() {
                    return None;
                }
                Some(RegionRaster { idx, spans, segments })
            })
            .collect();

        for raster in &rasters {
            let region = &self.regions[raster.idx];
            let color = self.fill_color(region).into();
            for &(y, x0, x1) in &raster.spans {
                fill.fill_span(y, x0, x1, color);
            }
        }

        for raster in &rasters {
            let region = &self.regions[raster.idx];
            let emphasized = emphasis.iter().any(|name| *name == region.name);
            for &(x0, y0, x1, y1) in &raster.segments {
                if emphasized {
                    draw_thick_line(borders, x0, y0, x1, y1, ratatui::style::Color::White);
                } else {
                    draw_line(borders, x0, y0, x1, y1, ratatui::style::Color::Black);
                }
            }
        }
    }

    /// Which region contains the given geographic point
    pub fn hit_test(&self, lon: f64, lat: f64) -> Option<&Region> {
        self.grid
            .query_point(lon, lat)
            .iter()
            .map(|&idx| &self.regions[idx])
            .find(|region| point_in_rings(lon, lat, &region.rings))
    }

    /// Case-insensitive name search: prefix matches win over substring
    /// matches
    pub fn locate(&self, query: &str) -> Option<&Region> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.regions
            .iter()
            .find(|r| r.name.to_lowercase().starts_with(&query))
            .or_else(|| {
                self.regions
                    .iter()
                    .find(|r| r.name.to_lowercase().contains(&query))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CumulativeTable;

    fn square(name: &str, x: f64, y: f64, size: f64) -> CountryShape {
        CountryShape {
            name: name.to_string(),
            rings: vec![vec![
                (x, y),
                (x + size, y),
                (x + size, y + size),
                (x, y + size),
            ]],
        }
    }

    fn fixture() -> Choropleth {
        let csv = "Country,Cumulative production\nTestland,120.0\nGasland,1468.0\n";
        let table = CumulativeTable::from_reader(csv.as_bytes()).unwrap();
        let shapes = vec![
            square("Testland", 0.0, 0.0, 10.0),
            square("Gasland", 40.0, 10.0, 10.0),
            square("Emptyland", -60.0, -20.0, 10.0),
        ];
        Choropleth::build(shapes, &table)
    }

    #[test]
    fn test_join_fills_missing_with_zero() {
        let map = fixture();
        let empty = map.regions().iter().find(|r| r.name == "Emptyland").unwrap();
        assert_eq!(empty.cumulative, 0.0);
        for region in map.regions() {
            assert!(region.cumulative >= 0.0);
        }
    }

    #[test]
    fn test_join_keeps_all_geometry_rows() {
        let map = fixture();
        assert_eq!(map.regions().len(), 3);
    }

    #[test]
    fn test_matched_region_keeps_value() {
        let map = fixture();
        let matched = map.regions().iter().find(|r| r.name == "Gasland").unwrap();
        assert_eq!(matched.cumulative, 1468.0);
    }

    #[test]
    fn test_hit_test() {
        let map = fixture();
        assert_eq!(map.hit_test(5.0, 5.0).map(|r| r.name.as_str()), Some("Testland"));
        assert_eq!(map.hit_test(45.0, 15.0).map(|r| r.name.as_str()), Some("Gasland"));
        assert!(map.hit_test(100.0, 50.0).is_none());
    }

    #[test]
    fn test_locate_is_case_insensitive() {
        let map = fixture();
        assert_eq!(map.locate("gasl").map(|r| r.name.as_str()), Some("Gasland"));
        assert_eq!(map.locate("EMPTY").map(|r| r.name.as_str()), Some("Emptyland"));
        assert!(map.locate("nowhere").is_none());
        assert!(map.locate("  ").is_none());
    }

    #[test]
    fn test_render_fills_matched_region() {
        let map = fixture();
        let viewport = Viewport::world(160, 80);
        let mut fill = ColorCanvas::new(80, 20);
        let mut borders = ColorCanvas::new(80, 20);
        map.render(&viewport, &mut fill, &mut borders, &[]);
        assert!(fill.cells().count() > 0);
        assert!(borders.cells().count() > 0);
    }
}
