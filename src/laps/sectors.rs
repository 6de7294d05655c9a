use serde::{Deserialize, Serialize};

use crate::session::RawLapRecord;

/// Best time per sector in seconds, `None` when no valid time was seen.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct SectorBest {
    pub s1: Option<f64>,
    pub s2: Option<f64>,
    pub s3: Option<f64>,
}

/// Running minimum of sector times. Missing, zero, negative and non-finite
/// times are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct SectorBestTracker {
    best: [Option<f64>; 3],
}

fn min_valid(current: Option<f64>, candidate: Option<f64>) -> Option<f64> {
    match candidate.filter(|t| t.is_finite() && *t > 0.0) {
        Some(candidate) => Some(current.map_or(candidate, |c| c.min(candidate))),
        None => current,
    }
}

impl SectorBestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, sectors: [Option<f64>; 3]) {
        for (best, candidate) in self.best.iter_mut().zip(sectors) {
            *best = min_valid(*best, candidate);
        }
    }

    pub fn observe_lap(&mut self, lap: &RawLapRecord) {
        self.observe(lap.sector_times());
    }

    /// Folds another tracker's bests into this one.
    pub fn merge(&mut self, other: &SectorBest) {
        self.observe([other.s1, other.s2, other.s3]);
    }

    pub fn best(&self) -> SectorBest {
        let [s1, s2, s3] = self.best;
        SectorBest { s1, s2, s3 }
    }
}

impl<'a> FromIterator<&'a RawLapRecord> for SectorBestTracker {
    fn from_iter<I: IntoIterator<Item = &'a RawLapRecord>>(laps: I) -> Self {
        let mut tracker = Self::new();
        for lap in laps {
            tracker.observe_lap(lap);
        }
        tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_ignores_missing() {
        let mut tracker = SectorBestTracker::new();
        tracker.observe([Some(31.2), None, None]);
        tracker.observe([Some(30.9), None, None]);
        assert_eq!(tracker.best().s1, Some(30.9));
    }

    #[test]
    fn test_all_missing_stays_absent() {
        let mut tracker = SectorBestTracker::new();
        tracker.observe([None, None, None]);
        tracker.observe([None, Some(0.0), Some(f64::INFINITY)]);
        assert_eq!(tracker.best(), SectorBest::default());

        let json = serde_json::to_string(&tracker.best()).unwrap();
        assert_eq!(json, r#"{"s1":null,"s2":null,"s3":null}"#);
    }

    #[test]
    fn test_from_laps_and_merge() {
        let laps = vec![
            RawLapRecord {
                lap_number: 1,
                sector1_time: Some(31.2),
                sector2_time: Some(40.0),
                ..Default::default()
            },
            RawLapRecord {
                lap_number: 2,
                sector1_time: None,
                sector2_time: Some(39.5),
                sector3_time: Some(22.1),
                ..Default::default()
            },
        ];
        let driver: SectorBestTracker = laps.iter().collect();
        assert_eq!(
            driver.best(),
            SectorBest {
                s1: Some(31.2),
                s2: Some(39.5),
                s3: Some(22.1)
            }
        );

        let mut global = SectorBestTracker::new();
        global.observe([Some(30.9), None, Some(23.0)]);
        global.merge(&driver.best());
        assert_eq!(
            global.best(),
            SectorBest {
                s1: Some(30.9),
                s2: Some(39.5),
                s3: Some(22.1)
            }
        );
    }
}
