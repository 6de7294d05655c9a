// Per-driver timelines over race time and race distance

pub mod merger;
pub mod stitcher;

use itertools::Itertools;
use log::warn;

pub use merger::{merge_positions, merge_telemetry};
pub use stitcher::RaceDistanceStitcher;

/// Sample of the position-only timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionSample {
    /// Seconds since race start
    pub t: f64,
    /// Race distance in meters
    pub s: f64,
    /// Lap index, see [`crate::config::StitchPolicy::lap_index`]
    pub lap: u32,
}

/// Sample of the full telemetry timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetrySample {
    pub t: f64,
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub rpm: f64,
    pub gear: Option<f64>,
    pub throttle: Option<f64>,
    pub brake: Option<f64>,
    pub drs: Option<f64>,
}

pub trait TimelineSample {
    fn t(&self) -> f64;
    fn s(&self) -> f64;
    fn set_s(&mut self, s: f64);
}

impl TimelineSample for PositionSample {
    fn t(&self) -> f64 {
        self.t
    }
    fn s(&self) -> f64 {
        self.s
    }
    fn set_s(&mut self, s: f64) {
        self.s = s;
    }
}

impl TimelineSample for TelemetrySample {
    fn t(&self) -> f64 {
        self.t
    }
    fn s(&self) -> f64 {
        self.s
    }
    fn set_s(&mut self, s: f64) {
        self.s = s;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DriverTimeline {
    Positions(Vec<PositionSample>),
    Telemetry(Vec<TelemetrySample>),
}

impl DriverTimeline {
    pub fn sample_count(&self) -> usize {
        match self {
            Self::Positions(samples) => samples.len(),
            Self::Telemetry(samples) => samples.len(),
        }
    }
}

/// Stable sort by race time.
pub fn sort_by_time<S: TimelineSample>(samples: &mut [S]) {
    samples.sort_by(|a, b| a.t().total_cmp(&b.t()));
}

/// Checks that race distance never decreases. Each violation is logged and
/// clamped to the previous distance. Returns the number of violations.
pub fn enforce_monotonic<S: TimelineSample>(samples: &mut [S], driver: &str) -> usize {
    let mut violations = 0;
    let mut prev_s = match samples.first() {
        Some(first) => first.s(),
        None => return 0,
    };
    for sample in samples.iter_mut().skip(1) {
        if sample.s() < prev_s {
            warn!(
                "Race distance decreased for driver {}: t={:.3} prev_s={:.3} s={:.3}",
                driver,
                sample.t(),
                prev_s,
                sample.s()
            );
            sample.set_s(prev_s);
            violations += 1;
        }
        prev_s = sample.s();
    }
    violations
}

pub fn is_monotonic<S: TimelineSample>(samples: &[S]) -> bool {
    samples.iter().tuple_windows().all(|(a, b)| b.s() >= a.s())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64, s: f64) -> PositionSample {
        PositionSample { t, s, lap: 1 }
    }

    #[test]
    fn test_enforce_monotonic_clamps_and_counts() {
        let mut samples = vec![
            sample(0.0, 10.0),
            sample(1.0, 12.0),
            sample(2.0, 11.5),
            sample(3.0, 11.0),
            sample(4.0, 15.0),
        ];
        assert!(!is_monotonic(&samples));

        let violations = enforce_monotonic(&mut samples, "VER");
        assert_eq!(violations, 2);
        assert_eq!(
            samples.iter().map(|p| p.s).collect::<Vec<_>>(),
            vec![10.0, 12.0, 12.0, 12.0, 15.0]
        );
        assert!(is_monotonic(&samples));
    }

    #[test]
    fn test_enforce_monotonic_empty() {
        let mut samples: Vec<PositionSample> = Vec::new();
        assert_eq!(enforce_monotonic(&mut samples, "VER"), 0);
    }

    #[test]
    fn test_sort_by_time_is_stable() {
        let mut samples = vec![sample(2.0, 1.0), sample(1.0, 2.0), sample(1.0, 3.0)];
        sort_by_time(&mut samples);
        assert_eq!(
            samples.iter().map(|p| (p.t, p.s)).collect::<Vec<_>>(),
            vec![(1.0, 2.0), (1.0, 3.0), (2.0, 1.0)]
        );
    }
}
