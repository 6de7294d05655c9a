// Error types for racetrace

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum RaceTraceError {
    // Track geometry errors
    #[snafu(display(
        "Reference lap {lap} of driver {driver} has {samples} usable position samples, at least 2 are required"
    ))]
    ReferenceLapDataGap {
        driver: String,
        lap: u32,
        samples: usize,
    },
    #[snafu(display("No lap in the session qualifies as a reference lap"))]
    NoReferenceLap,
    #[snafu(display("Track polyline is empty"))]
    EmptyPolyline,

    // Session errors
    #[snafu(display("No valid lap start time found, cannot establish race start"))]
    NoRaceStart,
    #[snafu(display("Error loading session file"))]
    SessionLoadError { source: io::Error },
    #[snafu(display("Invalid session file: {path}"))]
    InvalidSessionFile { path: String },

    // Output errors
    #[snafu(display("Error writing race file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing race record"))]
    OutputSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application config directory"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error (de)serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },
}
