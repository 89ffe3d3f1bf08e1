//! Granularity-driven point thinning.
//!
//! Collapses points that fall in the same cell of a metre-scale grid,
//! keeping the first point seen per cell. Thinning de-noises closely
//! spaced samples without biasing later extremum queries toward any
//! particular survivor, so a coarse enough grid can hide a route's true
//! extremum behind an earlier cell-mate.

use std::collections::HashSet;

use log::debug;

use crate::geo_utils::meters_to_degrees;
use crate::GpsPoint;

/// Grid coordinate
type CellCoord = (i32, i32);

/// Sparse occupancy grid over a local equirectangular projection.
///
/// The projection is anchored at the reference latitude: one degree of
/// latitude is treated as a fixed 111,320 m everywhere, and longitude is
/// scaled by cos(reference latitude). Anchoring at the first point keeps
/// the bucket layout stable when a thinned sequence is thinned again.
struct PointGrid {
    lat_step_deg: f64,
    lng_step_deg: f64,
    ref_lat: f64,
    occupied: HashSet<CellCoord>,
}

impl PointGrid {
    fn new(cell_size_meters: f64, ref_lat: f64) -> Self {
        Self {
            lat_step_deg: meters_to_degrees(cell_size_meters, 0.0),
            lng_step_deg: meters_to_degrees(cell_size_meters, ref_lat),
            ref_lat,
            occupied: HashSet::new(),
        }
    }

    /// Convert a point to its grid cell coordinates.
    fn cell_key(&self, point: &GpsPoint) -> CellCoord {
        let row = ((point.latitude() - self.ref_lat) / self.lat_step_deg).floor() as i32;
        let col = (point.longitude() / self.lng_step_deg).floor() as i32;
        (row, col)
    }

    /// Claim the cell under `point`. Returns `true` if the point is the
    /// cell's first occupant.
    fn claim(&mut self, point: &GpsPoint) -> bool {
        let key = self.cell_key(point);
        self.occupied.insert(key)
    }
}

/// Thin an ordered point sequence on a grid of `cell_size_meters`.
///
/// Single forward pass: the first point landing in each cell survives,
/// later cell-mates are dropped. Relative order of survivors is the
/// original document order. The caller validates `cell_size_meters`
/// before this runs.
pub(crate) fn thin_points(points: Vec<GpsPoint>, cell_size_meters: f64) -> Vec<GpsPoint> {
    let Some(first) = points.first() else {
        return points;
    };

    let mut grid = PointGrid::new(cell_size_meters, first.latitude());
    let total = points.len();
    let kept: Vec<GpsPoint> = points.into_iter().filter(|p| grid.claim(p)).collect();

    debug!(
        "grid thinning at {}m kept {} of {} points",
        cell_size_meters,
        kept.len(),
        total
    );

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> GpsPoint {
        GpsPoint::try_new(lat, lng, 0.0).unwrap()
    }

    fn lats(points: &[GpsPoint]) -> Vec<f64> {
        points.iter().map(|p| p.latitude()).collect()
    }

    #[test]
    fn test_empty_sequence_passes_through() {
        let thinned = thin_points(vec![], 100.0);
        assert!(thinned.is_empty());
    }

    #[test]
    fn test_single_point_unaffected_by_any_granularity() {
        for cell in [0.001, 100.0, 1_000_000.0] {
            let thinned = thin_points(vec![pt(52.91, -1.18)], cell);
            assert_eq!(thinned.len(), 1);
            assert_eq!(thinned[0].latitude(), 52.91);
        }
    }

    #[test]
    fn test_first_seen_wins_within_a_cell() {
        // ~50m apart, both inside a 10km cell
        let points = vec![pt(53.0, -2.0), pt(53.0004, -2.0), pt(53.0008, -2.0)];
        let thinned = thin_points(points, 10_000.0);
        assert_eq!(lats(&thinned), vec![53.0]);
    }

    #[test]
    fn test_distant_points_all_survive() {
        // ~111km apart, far larger than a 100m cell
        let points = vec![pt(51.0, 0.0), pt(52.0, 0.0), pt(53.0, 0.0)];
        let thinned = thin_points(points, 100.0);
        assert_eq!(thinned.len(), 3);
    }

    #[test]
    fn test_survivors_keep_document_order() {
        let points = vec![
            pt(51.0, 0.0),
            pt(53.0, 0.0),
            pt(51.0001, 0.0), // cell-mate of the first at 1km
            pt(52.0, 0.0),
        ];
        let thinned = thin_points(points, 1_000.0);
        assert_eq!(lats(&thinned), vec![51.0, 53.0, 52.0]);
    }

    #[test]
    fn test_coarse_grid_hides_extremum_fine_grid_recovers_it() {
        // The second point is the true maximum but shares a 1,000km cell
        // with the first, so coarse thinning reports the cell's first
        // occupant instead.
        let points = vec![
            pt(53.112691, -2.0),
            pt(57.129264, -2.0),
            pt(52.0, -1.5),
            pt(51.0, -1.0),
        ];

        let coarse = thin_points(points.clone(), 1_000_000.0);
        let coarse_max = coarse
            .iter()
            .map(|p| p.latitude())
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(coarse_max, 53.112691);
        assert!(coarse_max < 57.129264);

        let fine = thin_points(points, 10_000.0);
        let fine_max = fine
            .iter()
            .map(|p| p.latitude())
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(fine_max, 57.129264);
    }

    #[test]
    fn test_survivor_count_monotone_in_cell_size() {
        let points = vec![
            pt(53.112691, -2.0),
            pt(57.129264, -2.0),
            pt(52.0, -1.5),
            pt(51.0, -1.0),
        ];

        let mut previous = usize::MAX;
        for cell in [10_000.0, 100_000.0, 1_000_000.0] {
            let count = thin_points(points.clone(), cell).len();
            assert!(count <= previous, "count grew at cell size {cell}");
            previous = count;
        }
    }

    #[test]
    fn test_thinning_is_idempotent() {
        let points = vec![
            pt(53.0, -2.0),
            pt(53.0004, -2.0),
            pt(53.2, -2.1),
            pt(54.0, -2.5),
        ];

        let once = thin_points(points, 10_000.0);
        let twice = thin_points(once.clone(), 10_000.0);

        assert_eq!(lats(&once), lats(&twice));
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn test_exact_duplicates_collapse_at_any_granularity() {
        let points = vec![pt(52.91, -1.18), pt(52.91, -1.18)];
        let thinned = thin_points(points, 0.001);
        assert_eq!(thinned.len(), 1);
    }
}
