//! The warehouse catalog: two staging tables, four dimensions, one fact.
//!
//! Staging mirrors the raw JSON records with no constraints; the star schema
//! is populated from staging by the transform rules. All definitions live
//! here so the DDL and the event jsonpaths mapping share one source of truth.

use super::{Column, ColumnType, TableDef};
use serde_json::{Value, json};

pub const STAGING_EVENTS: &str = "staging_events";
pub const STAGING_SONGS: &str = "staging_songs";
pub const SONGPLAYS: &str = "songplays";
pub const USERS: &str = "users";
pub const SONGS: &str = "songs";
pub const ARTISTS: &str = "artists";
pub const TIME: &str = "time";

/// Event staging columns paired with the JSON field each is loaded from.
///
/// The bulk load maps fields to columns positionally via a jsonpaths
/// document, so this order is load-bearing: `staging_events()` and
/// `events_jsonpaths()` must agree, and they both derive from this table.
const EVENT_FIELDS: [(&str, &str, ColumnType); 18] = [
    ("artist", "$.artist", ColumnType::Text),
    ("auth", "$.auth", ColumnType::Text),
    ("first_name", "$.firstName", ColumnType::Text),
    ("gender", "$.gender", ColumnType::Text),
    ("item_in_session", "$.itemInSession", ColumnType::Text),
    ("last_name", "$.lastName", ColumnType::Text),
    ("length", "$.length", ColumnType::Double),
    ("level", "$.level", ColumnType::Text),
    ("location", "$.location", ColumnType::Text),
    ("method", "$.method", ColumnType::Text),
    ("page", "$.page", ColumnType::Text),
    ("registration", "$.registration", ColumnType::BigInt),
    ("session_id", "$.sessionId", ColumnType::BigInt),
    ("song", "$.song", ColumnType::Text),
    ("status", "$.status", ColumnType::Int),
    ("ts", "$.ts", ColumnType::BigInt),
    ("user_agent", "$.userAgent", ColumnType::Text),
    ("user_id", "$.userId", ColumnType::Int),
];

/// Raw user-activity events. Duplicates expected; no constraints.
pub fn staging_events() -> TableDef {
    let columns = EVENT_FIELDS
        .iter()
        .map(|&(name, _, ty)| Column::new(name, ty))
        .collect();
    TableDef::new(STAGING_EVENTS, columns)
}

/// The jsonpaths mapping document for the event staging load.
///
/// One `$.field` entry per staging column, in column order. Song records
/// use automatic field inference instead, so their staging column names
/// match the JSON keys directly.
pub fn events_jsonpaths() -> Value {
    let paths: Vec<&str> = EVENT_FIELDS.iter().map(|&(_, path, _)| path).collect();
    json!({ "jsonpaths": paths })
}

/// Raw song-catalog entries. Column names match the JSON keys so the load
/// can infer the field mapping.
pub fn staging_songs() -> TableDef {
    TableDef::new(
        STAGING_SONGS,
        vec![
            Column::new("artist_id", ColumnType::Text),
            Column::new("artist_name", ColumnType::Text),
            Column::new("artist_latitude", ColumnType::Double),
            Column::new("artist_location", ColumnType::Text),
            Column::new("artist_longitude", ColumnType::Double),
            Column::new("duration", ColumnType::Double),
            Column::new("num_songs", ColumnType::Int),
            Column::new("song_id", ColumnType::Text),
            Column::new("title", ColumnType::Text),
            Column::new("year", ColumnType::Int),
        ],
    )
}

/// The fact table. `songplay_id` is declared but left unpopulated by the
/// transform; start_time/user_id/session_id identify a play.
pub fn songplays() -> TableDef {
    TableDef::new(
        SONGPLAYS,
        vec![
            Column::new("songplay_id", ColumnType::BigInt),
            Column::new("start_time", ColumnType::Timestamp),
            Column::new("user_id", ColumnType::Int),
            Column::new("level", ColumnType::Text),
            Column::new("song_id", ColumnType::Text),
            Column::new("artist_id", ColumnType::Text),
            Column::new("session_id", ColumnType::BigInt),
            Column::new("location", ColumnType::Text),
            Column::new("user_agent", ColumnType::Text),
        ],
    )
}

/// User dimension, unique by user_id after the transform's dedup.
pub fn users() -> TableDef {
    TableDef::new(
        USERS,
        vec![
            Column::new("user_id", ColumnType::Int),
            Column::new("first_name", ColumnType::Text),
            Column::new("last_name", ColumnType::Text),
            Column::new("gender", ColumnType::Text),
            Column::new("level", ColumnType::Text),
        ],
    )
}

/// Song dimension.
pub fn songs() -> TableDef {
    TableDef::new(
        SONGS,
        vec![
            Column::new("song_id", ColumnType::Text),
            Column::new("title", ColumnType::Text),
            Column::new("artist_id", ColumnType::Text),
            Column::new("year", ColumnType::Int),
            Column::new("duration", ColumnType::Double),
        ],
    )
}

/// Artist dimension, unique by artist_id after the transform's dedup.
pub fn artists() -> TableDef {
    TableDef::new(
        ARTISTS,
        vec![
            Column::new("artist_id", ColumnType::Text),
            Column::new("name", ColumnType::Text),
            Column::new("location", ColumnType::Text),
            Column::new("latitude", ColumnType::Double),
            Column::new("longitude", ColumnType::Double),
        ],
    )
}

/// Time dimension, one row per distinct start_time.
pub fn time() -> TableDef {
    TableDef::new(
        TIME,
        vec![
            Column::new("start_time", ColumnType::Timestamp),
            Column::new("hour", ColumnType::Int),
            Column::new("day", ColumnType::Int),
            Column::new("week", ColumnType::Int),
            Column::new("month", ColumnType::Int),
            Column::new("year", ColumnType::Int),
            Column::new("weekday", ColumnType::Int),
        ],
    )
}

/// All seven tables, staging first. Drops and creates both walk this list;
/// order within it carries no dependency, since nothing declares foreign
/// keys.
pub fn all_tables() -> Vec<TableDef> {
    vec![
        staging_events(),
        staging_songs(),
        songplays(),
        users(),
        songs(),
        artists(),
        time(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_seven_tables() {
        let names: Vec<&str> = all_tables().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                STAGING_EVENTS,
                STAGING_SONGS,
                SONGPLAYS,
                USERS,
                SONGS,
                ARTISTS,
                TIME
            ]
        );
    }

    #[test]
    fn test_jsonpaths_align_with_staging_columns() {
        let table = staging_events();
        let doc = events_jsonpaths();
        let paths = doc["jsonpaths"].as_array().unwrap();

        assert_eq!(paths.len(), table.columns().len());
        // Spot-check that positional pairs line up.
        assert_eq!(table.columns()[0].name, "artist");
        assert_eq!(paths[0], "$.artist");
        let session = table
            .columns()
            .iter()
            .position(|c| c.name == "session_id")
            .unwrap();
        assert_eq!(paths[session], "$.sessionId");
        assert_eq!(*paths.last().unwrap(), "$.userId");
    }

    #[test]
    fn test_sixty_four_bit_columns() {
        let wide = |table: TableDef, column: &str| {
            table
                .columns()
                .iter()
                .find(|c| c.name == column)
                .unwrap()
                .ty
        };
        assert_eq!(wide(staging_events(), "session_id"), ColumnType::BigInt);
        assert_eq!(wide(staging_events(), "registration"), ColumnType::BigInt);
        assert_eq!(wide(staging_events(), "ts"), ColumnType::BigInt);
        assert_eq!(wide(songplays(), "songplay_id"), ColumnType::BigInt);
        // user_id stays 32-bit everywhere.
        assert_eq!(wide(staging_events(), "user_id"), ColumnType::Int);
        assert_eq!(wide(users(), "user_id"), ColumnType::Int);
    }

    #[test]
    fn test_time_decomposition_columns() {
        let names: Vec<&str> = time().columns().iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["start_time", "hour", "day", "week", "month", "year", "weekday"]
        );
    }

    #[test]
    fn test_staging_songs_matches_json_keys() {
        // Auto inference requires column names identical to the JSON keys.
        let names: Vec<&str> = staging_songs().columns().iter().map(|c| c.name).collect();
        assert!(names.contains(&"artist_name"));
        assert!(names.contains(&"num_songs"));
        assert!(names.contains(&"song_id"));
    }
}
