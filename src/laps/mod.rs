// Lap-level analysis: pit stops and best sectors

pub mod pit_stops;
pub mod sectors;

pub use pit_stops::{PitStopDetector, PitStopEvent};
pub use sectors::{SectorBest, SectorBestTracker};
