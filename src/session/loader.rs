use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

use super::{DriverInfo, DriverLaps, Session, SessionRecord};
use crate::RaceTraceError;

pub fn load_session_jsonl(source_file: &Path) -> Result<Session, RaceTraceError> {
    let records = serde_jsonlines::json_lines(source_file)
        .map_err(|e| RaceTraceError::SessionLoadError { source: e })?
        .collect::<Result<Vec<SessionRecord>, std::io::Error>>()
        .map_err(|e| RaceTraceError::SessionLoadError { source: e })?;

    let session = group_records(records);
    if session.drivers.iter().all(|d| d.laps.is_empty()) {
        return Err(RaceTraceError::InvalidSessionFile {
            path: format!("{:?}", source_file),
        });
    }

    info!(
        "Loaded {:?}: {} drivers, {} laps",
        source_file,
        session.drivers.len(),
        session.drivers.iter().map(|d| d.laps.len()).sum::<usize>()
    );
    Ok(session)
}

/// Groups session records per driver, keeping driver declaration order and
/// ordering each driver's laps by lap number.
pub fn group_records(records: Vec<SessionRecord>) -> Session {
    let mut session = Session::default();
    let mut driver_index: HashMap<String, usize> = HashMap::new();

    for record in records {
        match record {
            SessionRecord::Session(info) => {
                debug!("Session header: {:?}", info);
                session.info = info;
            }
            SessionRecord::Driver(info) => match driver_index.get(&info.driver_id) {
                Some(&idx) => {
                    warn!("Driver {} declared twice, keeping the latest entry", info.driver_id);
                    session.drivers[idx].info = info;
                }
                None => {
                    driver_index.insert(info.driver_id.clone(), session.drivers.len());
                    session.drivers.push(DriverLaps {
                        info,
                        laps: Vec::new(),
                    });
                }
            },
            SessionRecord::Lap(lap) => {
                let idx = *driver_index
                    .entry(lap.driver_id.clone())
                    .or_insert_with(|| {
                        debug!("Lap for undeclared driver {}", lap.driver_id);
                        session.drivers.push(DriverLaps {
                            info: DriverInfo {
                                driver_id: lap.driver_id.clone(),
                                code: lap.driver_id.clone(),
                                team: lap.team.clone().unwrap_or_default(),
                            },
                            laps: Vec::new(),
                        });
                        session.drivers.len() - 1
                    });
                session.drivers[idx].laps.push(*lap);
            }
        }
    }

    for driver in session.drivers.iter_mut() {
        driver.laps.sort_by_key(|lap| lap.lap_number);
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_groups_laps_per_driver() {
        let mut session_file = NamedTempFile::new().unwrap();
        writeln!(
            session_file,
            r#"{{"Session":{{"season":2023,"event":"Silverstone","session_type":"R"}}}}"#
        )
        .unwrap();
        writeln!(
            session_file,
            r#"{{"Driver":{{"driver_id":"1","code":"VER","team":"Red Bull Racing"}}}}"#
        )
        .unwrap();
        writeln!(
            session_file,
            r#"{{"Lap":{{"driver_id":"1","lap_number":2,"lap_start_time":190.0,"position":[{{"relative_time":0.0,"x":1.0,"y":2.0}}]}}}}"#
        )
        .unwrap();
        writeln!(
            session_file,
            r#"{{"Lap":{{"driver_id":"1","lap_number":1,"lap_start_time":100.0,"sector1_time":null}}}}"#
        )
        .unwrap();
        writeln!(
            session_file,
            r#"{{"Lap":{{"driver_id":"44","lap_number":1,"team":"Mercedes"}}}}"#
        )
        .unwrap();
        session_file.flush().unwrap();

        let session = load_session_jsonl(session_file.path()).unwrap();
        assert_eq!(session.info.event.as_deref(), Some("Silverstone"));
        assert_eq!(session.drivers.len(), 2);

        let ver = session.driver("1").unwrap();
        assert_eq!(ver.info.code, "VER");
        assert_eq!(
            ver.laps.iter().map(|l| l.lap_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(ver.laps[1].position.len(), 1);

        let ham = session.driver("44").unwrap();
        assert_eq!(ham.info.code, "44");
        assert_eq!(ham.team(), "Mercedes");
    }

    #[test]
    fn test_load_without_laps_is_invalid() {
        let mut session_file = NamedTempFile::new().unwrap();
        writeln!(
            session_file,
            r#"{{"Driver":{{"driver_id":"1","code":"VER","team":"Red Bull Racing"}}}}"#
        )
        .unwrap();
        session_file.flush().unwrap();

        match load_session_jsonl(session_file.path()) {
            Err(RaceTraceError::InvalidSessionFile { .. }) => {}
            other => panic!("Expected InvalidSessionFile, got {:?}", other),
        }
    }

    #[test]
    fn test_load_malformed_line_fails() {
        let mut session_file = NamedTempFile::new().unwrap();
        writeln!(session_file, "not json").unwrap();
        session_file.flush().unwrap();

        assert!(matches!(
            load_session_jsonl(session_file.path()),
            Err(RaceTraceError::SessionLoadError { .. })
        ));
    }
}
