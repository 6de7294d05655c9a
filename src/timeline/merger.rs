// Assembles per-driver timelines from raw per-lap rows

use log::debug;

use super::{
    PositionSample, RaceDistanceStitcher, TelemetrySample, enforce_monotonic, sort_by_time,
};
use crate::{config::StitchPolicy, session::RawLapRecord, track::TrackProjector};

/// Telemetry timeline of one driver.
///
/// Rows missing time, position, speed or RPM are dropped, as is any row that
/// does not move race time forward. Race distance is seeded by projecting the
/// first sample and then integrated along the travelled path.
pub fn merge_telemetry(
    driver: &str,
    laps: &[RawLapRecord],
    race_start: f64,
    projector: &dyn TrackProjector,
    policy: StitchPolicy,
) -> Vec<TelemetrySample> {
    let mut samples: Vec<(TelemetrySample, u32)> = Vec::new();
    let mut last_t: Option<f64> = None;
    let mut dropped = 0usize;

    for lap in laps {
        let Some(lap_start) = lap.lap_start_time.filter(|t| t.is_finite()) else {
            continue;
        };
        for (row, fix) in lap
            .telemetry
            .iter()
            .filter_map(|row| row.fix().map(|fix| (row, fix)))
        {
            let t = lap_start + fix.relative_time - race_start;
            if last_t.is_some_and(|last| t <= last) {
                dropped += 1;
                continue;
            }
            last_t = Some(t);
            samples.push((
                TelemetrySample {
                    t,
                    s: 0.0,
                    x: fix.x,
                    y: fix.y,
                    speed: fix.speed,
                    rpm: fix.rpm,
                    gear: row.gear,
                    throttle: row.throttle,
                    brake: row.brake,
                    drs: row.drs,
                },
                lap.lap_number,
            ));
        }
    }
    if dropped > 0 {
        debug!("Driver {}: dropped {} out-of-order telemetry rows", driver, dropped);
    }

    samples.sort_by(|a, b| a.0.t.total_cmp(&b.0.t));

    let mut stitcher = RaceDistanceStitcher::new(policy, projector.track().length());
    let mut timeline: Vec<TelemetrySample> = Vec::with_capacity(samples.len());
    for (mut sample, lap_number) in samples {
        sample.s = match timeline.last() {
            None => stitcher.stitch(projector.project(sample.x, sample.y), lap_number),
            Some(prev) => prev.s + (sample.x - prev.x).hypot(sample.y - prev.y),
        };
        timeline.push(sample);
    }
    timeline
}

/// Position-only timeline of one driver. Every row is projected and stitched
/// in recording order, then the timeline is ordered by race time.
pub fn merge_positions(
    driver: &str,
    laps: &[RawLapRecord],
    race_start: f64,
    projector: &dyn TrackProjector,
    policy: StitchPolicy,
) -> Vec<PositionSample> {
    let mut stitcher = RaceDistanceStitcher::new(policy, projector.track().length());
    let mut timeline: Vec<PositionSample> = Vec::new();

    for lap in laps {
        let Some(lap_start) = lap.lap_start_time.filter(|t| t.is_finite()) else {
            continue;
        };
        for fix in lap.position.iter().filter_map(|row| row.fix()) {
            let projected = projector.project(fix.x, fix.y);
            timeline.push(PositionSample {
                t: lap_start + fix.relative_time - race_start,
                s: stitcher.stitch(projected, lap.lap_number),
                lap: stitcher.policy().lap_index(lap.lap_number),
            });
        }
    }

    sort_by_time(&mut timeline);
    let violations = enforce_monotonic(&mut timeline, driver);
    if violations > 0 {
        debug!(
            "Driver {}: clamped {} decreasing distance samples",
            driver, violations
        );
    }
    timeline
}
