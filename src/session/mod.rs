// Raw session data as supplied by the timing-data provider

pub mod loader;

use serde::{Deserialize, Serialize};

pub use loader::load_session_jsonl;

/// One line of a session file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SessionRecord {
    Session(SessionInfo),
    Driver(DriverInfo),
    Lap(Box<RawLapRecord>),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    pub season: Option<u32>,
    pub event: Option<String>,
    pub session_type: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DriverInfo {
    pub driver_id: String,
    /// Abbreviated driver code, e.g. "VER"
    pub code: String,
    pub team: String,
}

/// Position row of a lap. Times are seconds since the lap started.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawPositionSample {
    pub relative_time: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Merged car data and position row of a lap.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawTelemetrySample {
    pub relative_time: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub speed: Option<f64>,
    pub rpm: Option<f64>,
    pub gear: Option<f64>,
    pub throttle: Option<f64>,
    pub brake: Option<f64>,
    pub drs: Option<f64>,
}

/// A position row with every required field present.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionFix {
    pub relative_time: f64,
    pub x: f64,
    pub y: f64,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl RawPositionSample {
    pub fn fix(&self) -> Option<PositionFix> {
        Some(PositionFix {
            relative_time: finite(self.relative_time)?,
            x: finite(self.x)?,
            y: finite(self.y)?,
        })
    }

    /// Coordinates alone, for track geometry where time does not matter.
    pub fn xy(&self) -> Option<(f64, f64)> {
        Some((finite(self.x)?, finite(self.y)?))
    }
}

/// The required fields of a telemetry row. Gear, throttle, brake and DRS stay
/// optional on the raw row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetryFix {
    pub relative_time: f64,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub rpm: f64,
}

impl RawTelemetrySample {
    /// Time, position, speed and RPM must all be present for the row to be used.
    pub fn fix(&self) -> Option<TelemetryFix> {
        Some(TelemetryFix {
            relative_time: finite(self.relative_time)?,
            x: finite(self.x)?,
            y: finite(self.y)?,
            speed: finite(self.speed)?,
            rpm: finite(self.rpm)?,
        })
    }
}

/// Lap-level fields for one driver and lap. Timestamps are seconds on the
/// session clock, durations are seconds.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawLapRecord {
    pub driver_id: String,
    pub lap_number: u32,
    pub lap_time: Option<f64>,
    pub lap_start_time: Option<f64>,
    pub sector1_time: Option<f64>,
    pub sector2_time: Option<f64>,
    pub sector3_time: Option<f64>,
    pub pit_in_time: Option<f64>,
    pub pit_out_time: Option<f64>,
    pub team: Option<String>,
    pub position: Vec<RawPositionSample>,
    pub telemetry: Vec<RawTelemetrySample>,
}

/// What kind of samples a lap can contribute to a timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleCapability {
    None,
    Position,
    FullTelemetry,
}

impl RawLapRecord {
    pub fn capability(&self) -> SampleCapability {
        if !self.telemetry.is_empty() {
            SampleCapability::FullTelemetry
        } else if !self.position.is_empty() {
            SampleCapability::Position
        } else {
            SampleCapability::None
        }
    }

    pub fn sector_times(&self) -> [Option<f64>; 3] {
        [self.sector1_time, self.sector2_time, self.sector3_time]
    }

    /// Recorded lap time, or the sum of the three sectors when it is missing.
    pub fn effective_lap_time(&self) -> Option<f64> {
        if let Some(lap_time) = finite(self.lap_time).filter(|t| *t > 0.0) {
            return Some(lap_time);
        }
        let [s1, s2, s3] = self.sector_times();
        Some(finite(s1)? + finite(s2)? + finite(s3)?).filter(|t| *t > 0.0)
    }

    pub fn valid_position_count(&self) -> usize {
        self.position.iter().filter(|p| p.xy().is_some()).count()
    }
}

/// A driver and their laps, ordered by lap number.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverLaps {
    pub info: DriverInfo,
    pub laps: Vec<RawLapRecord>,
}

impl DriverLaps {
    /// Team name from the driver entry, falling back to the first lap that has one.
    pub fn team(&self) -> String {
        if !self.info.team.is_empty() {
            return self.info.team.clone();
        }
        self.laps
            .iter()
            .find_map(|lap| lap.team.clone())
            .unwrap_or_default()
    }

    pub fn has_telemetry(&self) -> bool {
        self.laps
            .iter()
            .any(|lap| lap.capability() == SampleCapability::FullTelemetry)
    }
}

/// A completed session with every driver's laps in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub info: SessionInfo,
    pub drivers: Vec<DriverLaps>,
}

impl Session {
    /// Earliest valid lap start across all drivers.
    pub fn race_start(&self) -> Option<f64> {
        self.drivers
            .iter()
            .flat_map(|d| d.laps.iter())
            .filter_map(|lap| finite(lap.lap_start_time))
            .reduce(f64::min)
    }

    pub fn driver(&self, driver_id: &str) -> Option<&DriverLaps> {
        self.drivers.iter().find(|d| d.info.driver_id == driver_id)
    }

    /// Fastest lap with enough position data to build a track from.
    pub fn fastest_lap(&self) -> Option<&RawLapRecord> {
        self.drivers
            .iter()
            .flat_map(|d| d.laps.iter())
            .filter(|lap| lap.valid_position_count() >= 2)
            .filter_map(|lap| lap.effective_lap_time().map(|t| (t, lap)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, lap)| lap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(driver: &str, lap_number: u32, lap_time: Option<f64>) -> RawLapRecord {
        RawLapRecord {
            driver_id: driver.to_string(),
            lap_number,
            lap_time,
            position: vec![
                RawPositionSample {
                    relative_time: Some(0.0),
                    x: Some(0.0),
                    y: Some(0.0),
                },
                RawPositionSample {
                    relative_time: Some(1.0),
                    x: Some(10.0),
                    y: Some(0.0),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_telemetry_usable_requires_core_fields() {
        let mut sample = RawTelemetrySample {
            relative_time: Some(1.0),
            x: Some(1.0),
            y: Some(2.0),
            speed: Some(200.0),
            rpm: Some(11000.0),
            ..Default::default()
        };
        let fix = sample.fix().unwrap();
        assert_eq!(fix.speed, 200.0);
        assert_eq!(fix.rpm, 11000.0);

        sample.rpm = None;
        assert_eq!(sample.fix(), None);

        sample.rpm = Some(f64::NAN);
        assert_eq!(sample.fix(), None);
    }

    #[test]
    fn test_effective_lap_time_falls_back_to_sectors() {
        let mut record = lap("1", 1, None);
        assert_eq!(record.effective_lap_time(), None);

        record.sector1_time = Some(30.0);
        record.sector2_time = Some(40.0);
        record.sector3_time = Some(20.0);
        assert_eq!(record.effective_lap_time(), Some(90.0));

        record.lap_time = Some(89.5);
        assert_eq!(record.effective_lap_time(), Some(89.5));
    }

    #[test]
    fn test_capability() {
        let mut record = lap("1", 1, None);
        assert_eq!(record.capability(), SampleCapability::Position);
        record.telemetry.push(RawTelemetrySample::default());
        assert_eq!(record.capability(), SampleCapability::FullTelemetry);
        record.telemetry.clear();
        record.position.clear();
        assert_eq!(record.capability(), SampleCapability::None);
    }

    #[test]
    fn test_race_start_and_fastest_lap() {
        let mut slow = lap("1", 2, Some(92.0));
        slow.lap_start_time = Some(120.0);
        let mut fast = lap("16", 3, Some(90.1));
        fast.lap_start_time = Some(100.5);
        let mut no_positions = lap("16", 4, Some(85.0));
        no_positions.position.clear();

        let session = Session {
            info: SessionInfo::default(),
            drivers: vec![
                DriverLaps {
                    info: DriverInfo {
                        driver_id: "1".to_string(),
                        code: "VER".to_string(),
                        team: "Red Bull Racing".to_string(),
                    },
                    laps: vec![slow],
                },
                DriverLaps {
                    info: DriverInfo {
                        driver_id: "16".to_string(),
                        code: "LEC".to_string(),
                        team: "Ferrari".to_string(),
                    },
                    laps: vec![fast, no_positions],
                },
            ],
        };

        assert_eq!(session.race_start(), Some(100.5));
        let fastest = session.fastest_lap().unwrap();
        assert_eq!(fastest.driver_id, "16");
        assert_eq!(fastest.lap_number, 3);
    }
}
