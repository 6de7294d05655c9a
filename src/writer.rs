use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;
use serde::Serialize;

use crate::{RaceTraceError, race::RaceRecord};

/// Writes a race record, or any part of one, as a single JSON document.
pub fn write_json<T: Serialize>(
    file: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), RaceTraceError> {
    let output_file = File::create(file).map_err(|e| RaceTraceError::WriterError { source: e })?;
    let mut output_writer = BufWriter::new(output_file);

    let serialized = if pretty {
        serde_json::to_writer_pretty(&mut output_writer, value)
    } else {
        serde_json::to_writer(&mut output_writer, value)
    };
    serialized.map_err(|e| RaceTraceError::OutputSerializeError { source: e })?;

    output_writer
        .flush()
        .map_err(|e| RaceTraceError::WriterError { source: e })?;
    info!("Race data saved to {:?}", file);
    Ok(())
}

/// Writes the assembled race document.
pub fn write_race_record(
    file: &Path,
    race: &RaceRecord,
    pretty: bool,
) -> Result<(), RaceTraceError> {
    info!(
        "Writing {} drivers, track length {}m",
        race.drivers.len(),
        race.track.length
    );
    write_json(file, race, pretty)
}
