use std::f64::consts::PI;

/// Visible map area: Web-Mercator center, zoom and canvas size in
/// braille pixels
#[derive(Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Whole-world framing, slightly north of the equator
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 1.0, width, height)
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion

        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        // Clamp latitude
        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(100.0);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(0.5);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor while keeping the point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom * factor).clamp(0.5, 100.0);

        // Pan so the anchor point projects back to the same pixel
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Center and zoom onto a lon/lat bounding box (used by search locate).
    /// Zoom is chosen so the box fits with some margin, capped to avoid
    /// diving into a tiny island polygon.
    pub fn focus_on(&mut self, bbox: (f64, f64, f64, f64)) {
        let (min_lon, min_lat, max_lon, max_lat) = bbox;
        self.center_lon = (min_lon + max_lon) / 2.0;
        self.center_lat = ((min_lat + max_lat) / 2.0).clamp(-85.0, 85.0);

        let lon_extent = (max_lon - min_lon).max(1.0);
        let lat_extent = (max_lat - min_lat).max(1.0);
        // Degrees of longitude visible at zoom z is 360 / z; latitude spans
        // roughly half the pixels at the same scale.
        let zoom_x = 360.0 / (lon_extent * 1.5);
        let zoom_y = 360.0 / (lat_extent * 3.0);
        self.zoom = zoom_x.min(zoom_y).clamp(1.0, 20.0);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.zoom * self.width as f64;

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_lat_rad = self.center_lat * PI / 180.0;
        let center_y = (1.0 - (center_lat_rad.tan() + 1.0 / center_lat_rad.cos()).ln() / PI) / 2.0;

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        let lon = x * 360.0 - 180.0;
        let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
        let lat = lat_rad * 180.0 / PI;

        (lon, lat)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        // Web Mercator projection
        let x = (lon + 180.0) / 360.0;
        let lat_rad = lat * PI / 180.0;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_lat_rad = self.center_lat * PI / 180.0;
        let center_y = (1.0 - (center_lat_rad.tan() + 1.0 / center_lat_rad.cos()).ln() / PI) / 2.0;

        let scale = self.zoom * self.width as f64;

        let px = ((x - center_x) * scale + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0) as i32;

        (px, py)
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let (x, y) = vp.project(0.0, 0.0);
        assert_eq!(x, 50);
        assert_eq!(y, 50);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn test_roundtrip_through_projection() {
        let vp = Viewport::new(10.0, 30.0, 3.0, 200, 120);
        let (px, py) = vp.project(2.35, 48.85);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon - 2.35).abs() < 1.0);
        assert!((lat - 48.85).abs() < 1.0);
    }

    #[test]
    fn test_focus_on_centers_bbox() {
        let mut vp = Viewport::world(200, 100);
        vp.focus_on((-10.0, 40.0, 10.0, 60.0));
        assert!((vp.center_lon - 0.0).abs() < 1e-9);
        assert!((vp.center_lat - 50.0).abs() < 1e-9);
        assert!(vp.zoom > 1.0);
    }
}
