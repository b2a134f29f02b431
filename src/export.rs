//! Self-contained HTML rendition of the choropleth: inline SVG regions
//! with hover styling and tooltips, a legend, a search box, and the
//! title block. Overwrites the same well-known file on every run.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::map::Choropleth;

pub const MAP_ARTIFACT_FILE: &str = "gas_production_map.html";
pub const MAP_TITLE: &str = "Cumulative natural gas production by country, 1900-2022";
pub const MAP_SUBTITLE: &str = "Units are exajoules.";
/// Viewing height the artifact is embedded at
pub const EMBED_HEIGHT_PX: u32 = 800;

const SVG_WIDTH: f64 = 1000.0;
const SVG_HEIGHT: f64 = 500.0;

/// Equirectangular plate carrée: the artifact is a static overview, so
/// the flat projection is enough
fn project(lon: f64, lat: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0 * SVG_WIDTH;
    let y = (90.0 - lat) / 180.0 * SVG_HEIGHT;
    (x, y)
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn svg_path_data(rings: &[Vec<(f64, f64)>]) -> String {
    let mut d = String::new();
    for ring in rings {
        for (i, &(lon, lat)) in ring.iter().enumerate() {
            let (x, y) = project(lon, lat);
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{cmd}{x:.1},{y:.1} ");
        }
        d.push_str("Z ");
    }
    d
}

pub fn render_map_html(map: &Choropleth) -> String {
    let mut html = String::with_capacity(256 * 1024);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<style>\n");
    html.push_str("body { font-family: sans-serif; margin: 12px; }\n");
    let _ = write!(
        html,
        ".map-frame {{ height: {EMBED_HEIGHT_PX}px; position: relative; }}\n"
    );
    html.push_str(".region { stroke: black; stroke-width: 0.5; fill-opacity: 0.9; fill-rule: evenodd; }\n");
    html.push_str(".region:hover { stroke-width: 2; fill-opacity: 0.7; }\n");
    html.push_str(".region.found { stroke: #ffffff; stroke-width: 2; }\n");
    html.push_str(".legend { position: absolute; right: 8px; top: 8px; background: rgba(255,255,255,0.85); padding: 6px 10px; font-size: 12px; }\n");
    html.push_str(".legend .swatch { display: inline-block; width: 14px; height: 10px; margin-right: 6px; }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    // Title block
    let _ = write!(
        html,
        "<h3 align=\"left\" style=\"font-size:20px; font-weight:bold;\">{MAP_TITLE}</h3>\n"
    );
    let _ = write!(
        html,
        "<p align=\"left\" style=\"font-size:12px; color:gray;\">{MAP_SUBTITLE}</p>\n"
    );

    html.push_str(
        "<input id=\"region-search\" type=\"text\" placeholder=\"Search for a country...\">\n",
    );

    html.push_str("<div class=\"map-frame\">\n");
    let _ = write!(
        html,
        "<svg viewBox=\"0 0 {SVG_WIDTH} {SVG_HEIGHT}\" width=\"100%\">\n"
    );
    for region in map.regions() {
        let name = escape_xml(&region.name);
        let fill = map.fill_color(region).hex();
        let d = svg_path_data(&region.rings);
        let _ = write!(
            html,
            "<path class=\"region\" data-name=\"{name}\" fill=\"{fill}\" d=\"{d}\">\
             <title>Country: {name}\nCumulative production (EJ): {:.2}</title></path>\n",
            region.cumulative
        );
    }
    html.push_str("</svg>\n");

    // Legend
    html.push_str("<div class=\"legend\">\n");
    let _ = write!(html, "<b>{}</b><br>\n", map.scale().caption);
    let stops = map.scale().stops();
    for (i, &(threshold, color)) in stops.iter().enumerate() {
        let label = match stops.get(i + 1) {
            Some(&(next, _)) => format!("{threshold:.0} &ndash; {next:.0}"),
            None => format!("&ge; {threshold:.0}"),
        };
        let _ = write!(
            html,
            "<div><span class=\"swatch\" style=\"background:{}\"></span>{label}</div>\n",
            color.hex()
        );
    }
    html.push_str("</div>\n</div>\n");

    // Search box wiring: matching regions get the emphasized border
    html.push_str(
        "<script>\n\
         const search = document.getElementById('region-search');\n\
         const regions = document.querySelectorAll('path.region');\n\
         search.addEventListener('input', () => {\n\
           const q = search.value.trim().toLowerCase();\n\
           regions.forEach(p => {\n\
             const hit = q.length > 0 && p.dataset.name.toLowerCase().includes(q);\n\
             p.classList.toggle('found', hit);\n\
           });\n\
         });\n\
         </script>\n",
    );

    html.push_str("</body>\n</html>\n");
    html
}

/// Write the artifact, replacing whatever a previous run left behind
pub fn write_map_artifact(map: &Choropleth, path: &Path) -> Result<()> {
    let html = render_map_html(map);
    fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "map artifact written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CountryShape, CumulativeTable};

    fn fixture() -> Choropleth {
        let csv = "Country,Cumulative production\nA & Land,120.0\nGasland,1468.0\n";
        let table = CumulativeTable::from_reader(csv.as_bytes()).unwrap();
        let shapes = vec![
            CountryShape {
                name: "A & Land".to_string(),
                rings: vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]],
            },
            CountryShape {
                name: "Gasland".to_string(),
                rings: vec![vec![(40.0, 10.0), (50.0, 10.0), (50.0, 20.0)]],
            },
        ];
        Choropleth::build(shapes, &table)
    }

    #[test]
    fn test_one_path_per_region() {
        let html = render_map_html(&fixture());
        assert_eq!(html.matches("<path").count(), 2);
    }

    #[test]
    fn test_contains_title_and_caption() {
        let html = render_map_html(&fixture());
        assert!(html.contains(MAP_TITLE));
        assert!(html.contains(MAP_SUBTITLE));
        assert!(html.contains("Cumulative production (EJ)"));
        assert!(html.contains("Search for a country"));
    }

    #[test]
    fn test_region_names_are_escaped() {
        let html = render_map_html(&fixture());
        assert!(html.contains("A &amp; Land"));
        assert!(!html.contains("data-name=\"A & Land\""));
    }

    #[test]
    fn test_matched_region_gets_last_stop_color() {
        let html = render_map_html(&fixture());
        assert!(html.contains("fill=\"#4B0000\""));
    }

    #[test]
    fn test_embed_height_present() {
        let html = render_map_html(&fixture());
        assert!(html.contains("height: 800px"));
    }
}
