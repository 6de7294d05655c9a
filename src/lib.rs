// Library interface for racetrace
// This allows integration tests and benchmarks to access internal modules

pub mod config;
pub mod errors;
pub mod laps;
pub mod race;
pub mod session;
pub mod timeline;
pub mod track;
pub mod writer;

// Re-export commonly used types
pub use config::{RaceConfig, StitchPolicy};
pub use errors::RaceTraceError;
pub use race::{RaceDataAssembler, RaceRecord};
pub use session::{Session, load_session_jsonl};
pub use track::{TrackPolyline, TrackProjector};
