// Composes track geometry, timelines and lap analysis into the race record

use std::collections::BTreeMap;

use log::{debug, info, warn};
use rayon::prelude::*;

use super::{
    record::{
        DriverRecord, LapSummary, OutputPrecision, RaceRecord, TimelineRecord, TrackRecord,
        pit_stop_record, sector_best_record,
    },
    team_colors::team_color,
};
use crate::{
    RaceTraceError,
    config::{RaceConfig, TimelineSource},
    laps::{PitStopDetector, SectorBest, SectorBestTracker},
    session::{DriverLaps, Session},
    timeline::{DriverTimeline, merge_positions, merge_telemetry},
    track::{TrackPolyline, TrackProjector, build_projector, build_track, select_reference_lap},
};

/// Why a driver is left out of the race record.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    NoLaps,
    InsufficientSamples { samples: usize },
}

/// Outcome of one driver's pipeline. Sector bests are kept for skipped
/// drivers too, they still count towards the session bests.
#[derive(Clone, Debug)]
pub struct DriverOutcome {
    pub driver_id: String,
    pub best_sectors: SectorBest,
    pub record: Result<DriverRecord, SkipReason>,
}

/// Read-only state shared by every driver's pipeline.
struct RaceContext<'a> {
    config: &'a RaceConfig,
    race_start: f64,
    projector: &'a dyn TrackProjector,
    pit_detector: PitStopDetector,
    precision: OutputPrecision,
}

pub struct RaceDataAssembler {
    config: RaceConfig,
}

impl RaceDataAssembler {
    pub fn new(config: RaceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Reference track geometry for the session.
    pub fn track(&self, session: &Session) -> Result<TrackPolyline, RaceTraceError> {
        let reference = select_reference_lap(session, self.config.reference_lap.as_ref())?;
        build_track(reference)
    }

    pub fn track_record(&self, session: &Session) -> Result<TrackRecord, RaceTraceError> {
        let track = self.track(session)?;
        Ok(TrackRecord::new(
            &track,
            OutputPrecision::new(self.config.round_output),
        ))
    }

    pub fn assemble(&self, session: &Session) -> Result<RaceRecord, RaceTraceError> {
        self.config.validate()?;

        let race_start = session.race_start().ok_or(RaceTraceError::NoRaceStart)?;
        info!("Race start time: {:.3}s", race_start);

        let track = self.track(session)?;
        let projector = build_projector(&track, self.config.projector);
        let ctx = RaceContext {
            config: &self.config,
            race_start,
            projector: projector.as_ref(),
            pit_detector: PitStopDetector {
                debounce_s: self.config.pit_debounce_s,
                exit_offset_s: self.config.pit_exit_offset_s,
                policy: self.config.stitch_policy,
            },
            precision: OutputPrecision::new(self.config.round_output),
        };

        let outcomes: Vec<DriverOutcome> = if self.config.parallel {
            session
                .drivers
                .par_iter()
                .map(|driver| process_driver(driver, &ctx))
                .collect()
        } else {
            session
                .drivers
                .iter()
                .map(|driver| process_driver(driver, &ctx))
                .collect()
        };

        let mut global_bests = SectorBestTracker::new();
        let mut drivers = BTreeMap::new();
        for outcome in outcomes {
            global_bests.merge(&outcome.best_sectors);
            match outcome.record {
                Ok(record) => {
                    drivers.insert(outcome.driver_id, record);
                }
                Err(reason) => {
                    warn!("Skipping driver {}: {:?}", outcome.driver_id, reason);
                }
            }
        }

        let best_sectors = global_bests.best();
        info!(
            "Assembled {} of {} drivers, best sectors: {:?}",
            drivers.len(),
            session.drivers.len(),
            best_sectors
        );

        Ok(RaceRecord {
            track: TrackRecord::new(&track, ctx.precision),
            drivers,
            best_sectors: sector_best_record(&best_sectors, ctx.precision),
        })
    }
}

fn driver_timeline(driver: &DriverLaps, ctx: &RaceContext) -> DriverTimeline {
    let use_telemetry = match ctx.config.timeline_source {
        TimelineSource::Auto => driver.has_telemetry(),
        TimelineSource::Positions => false,
        TimelineSource::Telemetry => true,
    };
    let driver_id = &driver.info.driver_id;
    let policy = ctx.config.stitch_policy;

    if use_telemetry {
        DriverTimeline::Telemetry(merge_telemetry(
            driver_id,
            &driver.laps,
            ctx.race_start,
            ctx.projector,
            policy,
        ))
    } else {
        DriverTimeline::Positions(merge_positions(
            driver_id,
            &driver.laps,
            ctx.race_start,
            ctx.projector,
            policy,
        ))
    }
}

fn process_driver(driver: &DriverLaps, ctx: &RaceContext) -> DriverOutcome {
    let driver_id = driver.info.driver_id.clone();
    let bests: SectorBestTracker = driver.laps.iter().collect();
    let best_sectors = bests.best();

    if driver.laps.is_empty() {
        return DriverOutcome {
            driver_id,
            best_sectors,
            record: Err(SkipReason::NoLaps),
        };
    }

    let timeline = driver_timeline(driver, ctx);
    if timeline.sample_count() < 2 {
        return DriverOutcome {
            driver_id,
            best_sectors,
            record: Err(SkipReason::InsufficientSamples {
                samples: timeline.sample_count(),
            }),
        };
    }

    let pit_stops = ctx.pit_detector.detect(&driver.laps, ctx.race_start);
    let team = driver.team();
    debug!(
        "{}: {} samples, {} laps, {} pit stops",
        driver.info.code,
        timeline.sample_count(),
        driver.laps.len(),
        pit_stops.len()
    );

    let record = DriverRecord {
        driver_code: driver.info.code.clone(),
        team_color: team_color(&team).to_string(),
        team,
        timeline: TimelineRecord::new(&timeline, ctx.precision),
        pit_stops: pit_stops
            .iter()
            .map(|event| pit_stop_record(event, ctx.precision))
            .collect(),
        laps: driver
            .laps
            .iter()
            .map(|lap| LapSummary::new(lap, ctx.race_start, ctx.precision))
            .collect(),
        best_sectors: sector_best_record(&best_sectors, ctx.precision),
    };

    DriverOutcome {
        driver_id,
        best_sectors,
        record: Ok(record),
    }
}
