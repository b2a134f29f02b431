use ratatui::style::Color;

use crate::braille::ColorCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut ColorCanvas, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y, color);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a thicker line (highlighted region borders)
pub fn draw_thick_line(canvas: &mut ColorCanvas, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    draw_line(canvas, x0, y0, x1, y1, color);
    draw_line(canvas, x0 + 1, y0, x1 + 1, y1, color);
    draw_line(canvas, x0, y0 + 1, x1, y1 + 1, color);
}

/// Horizontal pixel run on one scanline: (y, x_start, x_end) inclusive
pub type Span = (i32, i32, i32);

/// Even-odd scanline fill over a set of projected polygon rings.
/// Hole rings cancel naturally. Spans are clipped to [0, height).
pub fn polygon_spans(rings: &[Vec<(i32, i32)>], width: i32, height: i32) -> Vec<Span> {
    let mut min_y = i32::MAX;
    let mut max_y = i32::MIN;
    for ring in rings {
        for &(_, y) in ring {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y > max_y {
        return Vec::new();
    }
    min_y = min_y.max(0);
    max_y = max_y.min(height - 1);

    let mut spans = Vec::new();
    let mut crossings: Vec<f64> = Vec::new();

    for y in min_y..=max_y {
        crossings.clear();
        let scan = y as f64 + 0.5;

        for ring in rings {
            if ring.len() < 2 {
                continue;
            }
            for i in 0..ring.len() {
                let (x0, y0) = ring[i];
                let (x1, y1) = ring[(i + 1) % ring.len()];
                let (y0, y1) = (y0 as f64, y1 as f64);
                // Half-open edge rule avoids double counting at vertices
                if (y0 <= scan && scan < y1) || (y1 <= scan && scan < y0) {
                    let t = (scan - y0) / (y1 - y0);
                    crossings.push(x0 as f64 + t * (x1 as f64 - x0 as f64));
                }
            }
        }

        crossings.sort_unstable_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let x0 = pair[0].ceil() as i32;
            let x1 = pair[1].floor() as i32;
            if x1 < 0 || x0 >= width {
                continue;
            }
            let x0 = x0.max(0);
            let x1 = x1.min(width - 1);
            if x0 <= x1 {
                spans.push((y, x0, x1));
            }
        }
    }

    spans
}

/// Even-odd point-in-polygon test over lon/lat rings
pub fn point_in_rings(lon: f64, lat: f64, rings: &[Vec<(f64, f64)>]) -> bool {
    let mut inside = false;
    for ring in rings {
        if ring.len() < 3 {
            continue;
        }
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if (yi > lat) != (yj > lat) {
                let x_cross = xj + (lat - yj) / (yi - yj) * (xi - xj);
                if lon < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
    }
    inside
}
