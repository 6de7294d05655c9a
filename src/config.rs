use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::RaceTraceError;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "racetrace";

pub const DEFAULT_PIT_DEBOUNCE_S: f64 = 30.0;
pub const DEFAULT_PIT_EXIT_OFFSET_S: f64 = 25.0;
pub const DEFAULT_GRID_CELL_SIZE: f64 = 100.0;

/// How lap-relative arc lengths become race distance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StitchPolicy {
    /// Unwrap consecutive projections across the start/finish line, clamping
    /// any backwards step.
    #[default]
    ContinuousUnwrap,
    /// `(lap_number - 1) * track_length + projection`.
    LapMultiplied,
}

impl StitchPolicy {
    /// Lap index written to samples and pit stops. Continuous runs use the
    /// 1-based lap number, lap-multiplied runs use the 0-based multiplier.
    pub fn lap_index(&self, lap_number: u32) -> u32 {
        match self {
            Self::ContinuousUnwrap => lap_number,
            Self::LapMultiplied => lap_number.saturating_sub(1),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub enum ProjectorKind {
    #[default]
    Linear,
    Grid { cell_size: f64 },
}

/// Which raw rows feed a driver's timeline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineSource {
    /// Full telemetry when the driver has any, position data otherwise.
    #[default]
    Auto,
    Positions,
    Telemetry,
}

/// Explicit reference lap used to build the track geometry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLap {
    pub driver: String,
    pub lap: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RaceConfig {
    pub stitch_policy: StitchPolicy,
    pub projector: ProjectorKind,
    pub timeline_source: TimelineSource,
    /// A pit-in closer than this to the last accepted one is dropped.
    pub pit_debounce_s: f64,
    /// Pit exit estimate used when the pit-out time is missing.
    pub pit_exit_offset_s: f64,
    pub parallel: bool,
    pub round_output: bool,
    pub pretty: bool,
    pub reference_lap: Option<ReferenceLap>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            stitch_policy: StitchPolicy::default(),
            projector: ProjectorKind::default(),
            timeline_source: TimelineSource::default(),
            pit_debounce_s: DEFAULT_PIT_DEBOUNCE_S,
            pit_exit_offset_s: DEFAULT_PIT_EXIT_OFFSET_S,
            parallel: false,
            round_output: true,
            pretty: false,
            reference_lap: None,
        }
    }
}

impl RaceConfig {
    pub fn default_path() -> Result<PathBuf, RaceTraceError> {
        Ok(dirs::config_dir()
            .ok_or(RaceTraceError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Config from the user's config directory, if one was saved there.
    pub fn from_local_file() -> Result<Option<Self>, RaceTraceError> {
        let config_path = Self::default_path()?;
        if config_path.exists() {
            Self::from_file(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, RaceTraceError> {
        debug!("Loading config from {:?}", path);
        let file =
            std::fs::File::open(path).map_err(|e| RaceTraceError::ConfigIOError { source: e })?;
        let config: RaceConfig = serde_json::from_reader(file)
            .map_err(|e| RaceTraceError::ConfigSerializeError { source: e })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), RaceTraceError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RaceTraceError::ConfigIOError { source: e })?;
            }
        }

        let file =
            std::fs::File::create(path).map_err(|e| RaceTraceError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| RaceTraceError::ConfigSerializeError { source: e })
    }

    pub fn validate(&self) -> Result<(), RaceTraceError> {
        if !(self.pit_debounce_s >= 0.0) {
            return Err(RaceTraceError::InvalidUserInput {
                field: "pit_debounce_s".to_string(),
                reason: format!("must be a non-negative number, got {}", self.pit_debounce_s),
            });
        }
        if !(self.pit_exit_offset_s >= 0.0) {
            return Err(RaceTraceError::InvalidUserInput {
                field: "pit_exit_offset_s".to_string(),
                reason: format!(
                    "must be a non-negative number, got {}",
                    self.pit_exit_offset_s
                ),
            });
        }
        if let ProjectorKind::Grid { cell_size } = self.projector {
            if !(cell_size > 0.0) || !cell_size.is_finite() {
                return Err(RaceTraceError::InvalidUserInput {
                    field: "projector.cell_size".to_string(),
                    reason: format!("must be a positive number, got {}", cell_size),
                });
            }
        }
        Ok(())
    }
}
