// Serialized race output

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    laps::{PitStopEvent, SectorBest},
    session::RawLapRecord,
    timeline::{DriverTimeline, PositionSample, TelemetrySample},
    track::TrackPolyline,
};

/// Decimal places kept for times and distances in the output.
#[derive(Clone, Copy, Debug)]
pub struct OutputPrecision {
    enabled: bool,
}

impl OutputPrecision {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn round(&self, value: f64, decimals: i32) -> f64 {
        if !self.enabled {
            return value;
        }
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    }

    pub fn time(&self, value: f64) -> f64 {
        self.round(value, 3)
    }

    pub fn distance(&self, value: f64) -> f64 {
        self.round(value, 1)
    }

    fn opt_time(&self, value: Option<f64>) -> Option<f64> {
        value.map(|v| self.time(v))
    }
}

/// Channels are written as whole numbers, truncated like the source data's
/// integer channels.
fn channel(value: f64) -> i64 {
    value as i64
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RaceRecord {
    pub track: TrackRecord,
    pub drivers: BTreeMap<String, DriverRecord>,
    pub best_sectors: SectorBest,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TrackPointRecord {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrackRecord {
    pub points: Vec<TrackPointRecord>,
    pub length: f64,
}

impl TrackRecord {
    pub fn new(track: &TrackPolyline, precision: OutputPrecision) -> Self {
        Self {
            points: track
                .points()
                .iter()
                .map(|p| TrackPointRecord {
                    x: precision.distance(p.x),
                    y: precision.distance(p.y),
                })
                .collect(),
            length: precision.distance(track.length()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PositionRecord {
    pub t: f64,
    pub s: f64,
    pub lap: u32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TelemetryRecord {
    pub t: f64,
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub speed: i64,
    pub rpm: i64,
    pub gear: Option<i64>,
    pub throttle: Option<i64>,
    pub brake: Option<i64>,
    pub drs: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum TimelineRecord {
    Positions(Vec<PositionRecord>),
    Telemetry(Vec<TelemetryRecord>),
}

impl TimelineRecord {
    pub fn new(timeline: &DriverTimeline, precision: OutputPrecision) -> Self {
        match timeline {
            DriverTimeline::Positions(samples) => Self::Positions(
                samples
                    .iter()
                    .map(|p: &PositionSample| PositionRecord {
                        t: precision.time(p.t),
                        s: precision.distance(p.s),
                        lap: p.lap,
                    })
                    .collect(),
            ),
            DriverTimeline::Telemetry(samples) => Self::Telemetry(
                samples
                    .iter()
                    .map(|p: &TelemetrySample| TelemetryRecord {
                        t: precision.time(p.t),
                        s: precision.distance(p.s),
                        x: precision.distance(p.x),
                        y: precision.distance(p.y),
                        speed: channel(p.speed),
                        rpm: channel(p.rpm),
                        gear: p.gear.map(channel),
                        throttle: p.throttle.map(channel),
                        brake: p.brake.map(channel),
                        drs: p.drs.map(channel),
                    })
                    .collect(),
            ),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LapSummary {
    pub lap: u32,
    pub start_time: Option<f64>,
    pub s1: Option<f64>,
    pub s2: Option<f64>,
    pub s3: Option<f64>,
}

impl LapSummary {
    pub fn new(lap: &RawLapRecord, race_start: f64, precision: OutputPrecision) -> Self {
        Self {
            lap: lap.lap_number,
            start_time: lap
                .lap_start_time
                .filter(|t| t.is_finite())
                .map(|t| precision.time(t - race_start)),
            s1: precision.opt_time(lap.sector1_time),
            s2: precision.opt_time(lap.sector2_time),
            s3: precision.opt_time(lap.sector3_time),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    pub driver_code: String,
    pub team: String,
    pub team_color: String,
    #[serde(flatten)]
    pub timeline: TimelineRecord,
    pub pit_stops: Vec<PitStopEvent>,
    pub laps: Vec<LapSummary>,
    pub best_sectors: SectorBest,
}

pub fn pit_stop_record(event: &PitStopEvent, precision: OutputPrecision) -> PitStopEvent {
    PitStopEvent {
        lap: event.lap,
        enter: precision.time(event.enter),
        exit: precision.time(event.exit),
    }
}

pub fn sector_best_record(best: &SectorBest, precision: OutputPrecision) -> SectorBest {
    SectorBest {
        s1: precision.opt_time(best.s1),
        s2: precision.opt_time(best.s2),
        s3: precision.opt_time(best.s3),
    }
}
