use std::collections::HashMap;

/// Spatial index over region bounding boxes using conservative
/// approximation: each region is indexed into every grid cell its bbox
/// overlaps, guaranteeing no false negatives while allowing false
/// positives (eliminated by the point-in-polygon check downstream).
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from region bounding boxes (min_lon, min_lat, max_lon, max_lat)
    pub fn build(bboxes: impl Iterator<Item = (f64, f64, f64, f64)>, cell_size: f64) -> Self {
        let mut grid = Self {
            cells: HashMap::new(),
            cell_size,
        };
        for (idx, (min_lon, min_lat, max_lon, max_lat)) in bboxes.enumerate() {
            let min_cell = grid.to_cell(min_lon, min_lat);
            let max_cell = grid.to_cell(max_lon, max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Candidate region indices whose bbox cell contains the point
    pub fn query_point(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_point_hits_overlapping_bbox() {
        let bboxes = vec![
            (0.0, 0.0, 10.0, 10.0),
            (40.0, 40.0, 50.0, 50.0),
        ];
        let grid = FeatureGrid::build(bboxes.into_iter(), 10.0);
        assert!(grid.query_point(5.0, 5.0).contains(&0));
        assert!(!grid.query_point(5.0, 5.0).contains(&1));
        assert!(grid.query_point(45.0, 45.0).contains(&1));
    }

    #[test]
    fn test_query_point_outside_everything() {
        let grid = FeatureGrid::build(vec![(0.0, 0.0, 1.0, 1.0)].into_iter(), 5.0);
        assert!(grid.query_point(-100.0, -60.0).is_empty());
    }
}
