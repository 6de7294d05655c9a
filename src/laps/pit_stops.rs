use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::{DEFAULT_PIT_DEBOUNCE_S, DEFAULT_PIT_EXIT_OFFSET_S, StitchPolicy},
    session::RawLapRecord,
};

/// A pit stop in seconds since race start, `enter <= exit`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PitStopEvent {
    pub lap: u32,
    pub enter: f64,
    pub exit: f64,
}

/// Finds pit stops from the pit-in and pit-out timestamps of a driver's laps.
#[derive(Clone, Copy, Debug)]
pub struct PitStopDetector {
    /// Pit-ins closer than this to the last accepted one are duplicates
    pub debounce_s: f64,
    /// Minimum pit lane transit, used when the pit-out time is missing
    pub exit_offset_s: f64,
    pub policy: StitchPolicy,
}

impl Default for PitStopDetector {
    fn default() -> Self {
        Self {
            debounce_s: DEFAULT_PIT_DEBOUNCE_S,
            exit_offset_s: DEFAULT_PIT_EXIT_OFFSET_S,
            policy: StitchPolicy::default(),
        }
    }
}

impl PitStopDetector {
    pub fn detect(&self, laps: &[RawLapRecord], race_start: f64) -> Vec<PitStopEvent> {
        let mut events: Vec<PitStopEvent> = Vec::new();

        for lap in laps {
            let Some(pit_in) = lap.pit_in_time.filter(|t| t.is_finite()) else {
                continue;
            };
            let enter = pit_in - race_start;

            if let Some(last) = events.last() {
                if (enter - last.enter).abs() < self.debounce_s {
                    debug!(
                        "Lap {}: pit-in at {:.3}s within {}s of previous at {:.3}s, ignored",
                        lap.lap_number, enter, self.debounce_s, last.enter
                    );
                    continue;
                }
            }

            let exit = match lap.pit_out_time.filter(|t| t.is_finite()) {
                Some(pit_out) if pit_out - race_start >= enter => pit_out - race_start,
                Some(pit_out) => {
                    debug!(
                        "Lap {}: pit-out {:.3}s precedes pit-in {:.3}s, estimating exit",
                        lap.lap_number,
                        pit_out - race_start,
                        enter
                    );
                    enter + self.exit_offset_s
                }
                None => enter + self.exit_offset_s,
            };

            events.push(PitStopEvent {
                lap: self.policy.lap_index(lap.lap_number),
                enter,
                exit,
            });
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(lap_number: u32, pit_in: Option<f64>, pit_out: Option<f64>) -> RawLapRecord {
        RawLapRecord {
            lap_number,
            pit_in_time: pit_in,
            pit_out_time: pit_out,
            ..Default::default()
        }
    }

    #[test]
    fn test_debounce_within_window() {
        let detector = PitStopDetector::default();
        let laps = vec![lap(10, Some(1100.0), None), lap(11, Some(1110.0), None)];
        let events = detector.detect(&laps, 100.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].enter, 1000.0);
    }

    #[test]
    fn test_debounce_outside_window() {
        let detector = PitStopDetector::default();
        let laps = vec![lap(10, Some(1100.0), None), lap(11, Some(1140.0), None)];
        let events = detector.detect(&laps, 100.0);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_missing_pit_out_is_estimated() {
        let detector = PitStopDetector::default();
        let events = detector.detect(&[lap(20, Some(120.0), None)], 0.0);
        assert_eq!(
            events,
            vec![PitStopEvent {
                lap: 20,
                enter: 120.0,
                exit: 145.0
            }]
        );
    }

    #[test]
    fn test_recorded_pit_out_used() {
        let detector = PitStopDetector::default();
        let events = detector.detect(&[lap(20, Some(1120.0), Some(1141.5))], 1000.0);
        assert_eq!(events[0].enter, 120.0);
        assert_eq!(events[0].exit, 141.5);
    }

    #[test]
    fn test_pit_out_before_pit_in_is_estimated() {
        let detector = PitStopDetector {
            exit_offset_s: 22.0,
            ..Default::default()
        };
        let events = detector.detect(&[lap(20, Some(120.0), Some(100.0))], 0.0);
        assert_eq!(events[0].exit, 142.0);
        assert!(events[0].enter <= events[0].exit);
    }

    #[test]
    fn test_lap_index_follows_policy() {
        let detector = PitStopDetector {
            policy: StitchPolicy::LapMultiplied,
            ..Default::default()
        };
        let events = detector.detect(&[lap(20, Some(120.0), None)], 0.0);
        assert_eq!(events[0].lap, 19);
    }

    #[test]
    fn test_laps_without_pit_in_ignored() {
        let detector = PitStopDetector::default();
        let laps = vec![lap(1, None, Some(50.0)), lap(2, None, None)];
        assert!(detector.detect(&laps, 0.0).is_empty());
    }

    #[test]
    fn test_pit_stop_detected_without_lap_start() {
        let mut pit_lap = lap(18, Some(1900.0), Some(1922.0));
        pit_lap.lap_start_time = None;
        let events = PitStopDetector::default().detect(&[pit_lap], 100.0);
        assert_eq!(
            events,
            vec![PitStopEvent {
                lap: 18,
                enter: 1800.0,
                exit: 1822.0,
            }]
        );
    }
}
