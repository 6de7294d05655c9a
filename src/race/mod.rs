// Race-level assembly and output records

pub mod assembler;
pub mod record;
pub mod team_colors;

pub use assembler::{DriverOutcome, RaceDataAssembler, SkipReason};
pub use record::{DriverRecord, LapSummary, RaceRecord, TimelineRecord, TrackRecord};
pub use team_colors::team_color;
