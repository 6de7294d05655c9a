// Reference track polyline with arc-length parameterization

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::RaceTraceError;

/// A point of the reference lap with its cumulative arc length.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
    /// Meters along the reference lap from its first point
    pub s: f64,
}

/// Ordered reference lap. `s` never decreases and `length` is the `s` of the
/// last point.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackPolyline {
    points: Vec<TrackPoint>,
    length: f64,
}

impl TrackPolyline {
    /// Builds the polyline from reference-lap coordinates in sampling order.
    ///
    /// Repeated coordinates add no length but are kept. Fewer than two points,
    /// or points that never move, leave no distance coordinate to work with
    /// and are rejected.
    pub fn from_coordinates<I>(coordinates: I) -> Result<Self, RaceTraceError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points: Vec<TrackPoint> = Vec::new();
        let mut s_acc = 0.0;

        for (x, y) in coordinates {
            if let Some(prev) = points.last() {
                s_acc += (x - prev.x).hypot(y - prev.y);
            }
            points.push(TrackPoint { x, y, s: s_acc });
        }

        if points.len() < 2 || !(s_acc > 0.0) {
            debug!(
                "Cannot build track from {} points spanning {}m",
                points.len(),
                s_acc
            );
            return Err(RaceTraceError::EmptyPolyline);
        }

        info!(
            "Built track polyline: {} points, {:.2}m",
            points.len(),
            s_acc
        );
        Ok(Self {
            points,
            length: s_acc,
        })
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_arc_length_accumulates() {
        let track =
            TrackPolyline::from_coordinates(vec![(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)]).unwrap();

        let s: Vec<f64> = track.points().iter().map(|p| p.s).collect();
        assert_eq!(s, vec![0.0, 5.0, 11.0]);
        assert_eq!(track.length(), 11.0);
        assert_eq!(track.len(), 3);
    }

    #[test]
    fn test_repeated_point_kept_with_zero_length() {
        let track =
            TrackPolyline::from_coordinates(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (2.0, 0.0)])
                .unwrap();

        assert_eq!(track.len(), 4);
        assert_eq!(track.points()[1].s, track.points()[2].s);
        assert_eq!(track.length(), 2.0);
    }

    #[test]
    fn test_too_few_points_rejected() {
        assert!(matches!(
            TrackPolyline::from_coordinates(Vec::new()),
            Err(RaceTraceError::EmptyPolyline)
        ));
        assert!(matches!(
            TrackPolyline::from_coordinates(vec![(1.0, 1.0)]),
            Err(RaceTraceError::EmptyPolyline)
        ));
        assert!(matches!(
            TrackPolyline::from_coordinates(vec![(1.0, 1.0), (1.0, 1.0)]),
            Err(RaceTraceError::EmptyPolyline)
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_arc_length_non_decreasing(
            coords in prop::collection::vec((-5000.0f64..5000.0, -5000.0f64..5000.0), 2..200),
        ) {
            prop_assume!(coords.windows(2).any(|w| w[0] != w[1]));
            let track = TrackPolyline::from_coordinates(coords.clone()).unwrap();

            prop_assert_eq!(track.len(), coords.len());
            prop_assert_eq!(track.points()[0].s, 0.0);
            for pair in track.points().windows(2) {
                prop_assert!(pair[1].s >= pair[0].s);
            }
            let last = track.points().last().unwrap();
            prop_assert_eq!(last.s, track.length());
        }
    }
}
