//! Reader for the colliders obstacle file.
//!
//! ```text
//! lat0 37.792480, lon0 -122.397450
//! posX,posY,posZ,halfSizeX,halfSizeY,halfSizeZ
//! -310.2389,-439.2315,85.5,5,5,85.5
//! ```
//!
//! The first line declares the map's home position, the second names the columns and
//! every following line is one obstacle box (center north/east/altitude, half sizes).

use crate::error::ColliderError;
use crate::models::{GeodeticPosition, ObstacleRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Static obstacle data for one map, read once per mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleMap {
    pub home: GeodeticPosition,
    pub obstacles: Vec<ObstacleRecord>,
}

pub fn load_colliders(path: impl AsRef<Path>) -> Result<ObstacleMap, ColliderError> {
    let file = File::open(path.as_ref())?;
    let map = parse_colliders(BufReader::new(file))?;
    tracing::info!(
        path = %path.as_ref().display(),
        obstacles = map.obstacles.len(),
        lat0 = map.home.latitude,
        lon0 = map.home.longitude,
        "Loaded obstacle map"
    );
    Ok(map)
}

pub fn parse_colliders<R: BufRead>(reader: R) -> Result<ObstacleMap, ColliderError> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(ColliderError::MissingHome),
    };
    let home = parse_home(&header)?;

    // Column names.
    if let Some(line) = lines.next() {
        line?;
    }

    let mut obstacles = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line?;
        let line_no = idx + 3;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        obstacles.push(parse_record(trimmed, line_no)?);
    }

    Ok(ObstacleMap { home, obstacles })
}

fn parse_home(header: &str) -> Result<GeodeticPosition, ColliderError> {
    let mut latitude = None;
    let mut longitude = None;

    for part in header.split(',') {
        let mut tokens = part.split_whitespace();
        let (Some(key), Some(value)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        let value: f64 = value.parse().map_err(|_| ColliderError::Parse {
            line: 1,
            reason: format!("invalid {key} value `{value}`"),
        })?;
        match key {
            "lat0" => latitude = Some(value),
            "lon0" => longitude = Some(value),
            _ => {}
        }
    }

    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(GeodeticPosition::new(latitude, longitude, 0.0)),
        _ => Err(ColliderError::MissingHome),
    }
}

fn parse_record(line: &str, line_no: usize) -> Result<ObstacleRecord, ColliderError> {
    let values = line
        .split(',')
        .map(|field| field.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ColliderError::Parse {
            line: line_no,
            reason: err.to_string(),
        })?;

    let &[north, east, altitude, half_north, half_east, half_altitude] = values.as_slice() else {
        return Err(ColliderError::Parse {
            line: line_no,
            reason: format!("expected 6 columns, found {}", values.len()),
        });
    };

    Ok(ObstacleRecord {
        north,
        east,
        altitude,
        half_north,
        half_east,
        half_altitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "lat0 37.792480, lon0 -122.397450\n\
posX,posY,posZ,halfSizeX,halfSizeY,halfSizeZ\n\
-310.2389,-439.2315,85.5,5,5,85.5\n\
\n\
-300.2389,-439.2315,85.5,5,5,85.5\n";

    #[test]
    fn parses_home_and_records() {
        let map = parse_colliders(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(map.home, GeodeticPosition::new(37.792480, -122.397450, 0.0));
        assert_eq!(map.obstacles.len(), 2);
        assert_eq!(map.obstacles[0].north, -310.2389);
        assert_eq!(map.obstacles[1].half_altitude, 85.5);
    }

    #[test]
    fn missing_header_is_reported() {
        let err = parse_colliders(Cursor::new("")).unwrap_err();
        assert!(matches!(err, ColliderError::MissingHome));

        let err = parse_colliders(Cursor::new("posX,posY\n1,2,3,4,5,6\n")).unwrap_err();
        assert!(matches!(err, ColliderError::MissingHome));
    }

    #[test]
    fn short_row_reports_line_number() {
        let data = "lat0 1.0, lon0 2.0\nheader\n1,2,3,4,5,6\n1,2,3\n";
        let err = parse_colliders(Cursor::new(data)).unwrap_err();
        match err {
            ColliderError::Parse { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let data = "lat0 1.0, lon0 2.0\nheader\n1,2,x,4,5,6\n";
        assert!(matches!(
            parse_colliders(Cursor::new(data)),
            Err(ColliderError::Parse { line: 3, .. })
        ));
    }
}
