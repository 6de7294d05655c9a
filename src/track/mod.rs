// Reference track geometry and projection onto it

pub mod geometry;
pub mod projector;

use log::info;

pub use geometry::{TrackPoint, TrackPolyline};
pub use projector::{GridProjector, LinearProjector, TrackProjector, build_projector};

use crate::{
    RaceTraceError,
    config::ReferenceLap,
    session::{RawLapRecord, Session},
};

/// Picks the reference lap: the configured one if given, else the fastest lap
/// with usable position data.
pub fn select_reference_lap<'s>(
    session: &'s Session,
    reference: Option<&ReferenceLap>,
) -> Result<&'s RawLapRecord, RaceTraceError> {
    let lap = match reference {
        Some(reference) => session
            .driver(&reference.driver)
            .and_then(|d| d.laps.iter().find(|l| l.lap_number == reference.lap))
            .ok_or_else(|| RaceTraceError::InvalidUserInput {
                field: "reference_lap".to_string(),
                reason: format!(
                    "lap {} of driver {} not found in session",
                    reference.lap, reference.driver
                ),
            })?,
        None => session.fastest_lap().ok_or(RaceTraceError::NoReferenceLap)?,
    };
    info!(
        "Reference lap: driver {} lap {} ({:?}s)",
        lap.driver_id,
        lap.lap_number,
        lap.effective_lap_time()
    );
    Ok(lap)
}

/// Builds the track polyline from a reference lap's position rows, dropping
/// rows without coordinates.
pub fn build_track(reference: &RawLapRecord) -> Result<TrackPolyline, RaceTraceError> {
    let coordinates: Vec<(f64, f64)> = reference.position.iter().filter_map(|p| p.xy()).collect();
    let samples = coordinates.len();
    TrackPolyline::from_coordinates(coordinates).map_err(|_| {
        RaceTraceError::ReferenceLapDataGap {
            driver: reference.driver_id.clone(),
            lap: reference.lap_number,
            samples,
        }
    })
}
