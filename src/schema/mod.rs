//! Schema registry for the star-schema warehouse
//!
//! Declares the staging, dimension, and fact table definitions and renders
//! them as idempotent DDL. No data operations happen here.

mod catalog;
mod table;

pub use catalog::{
    ARTISTS, SONGPLAYS, SONGS, STAGING_EVENTS, STAGING_SONGS, TIME, USERS, all_tables, artists,
    events_jsonpaths, songplays, songs, staging_events, staging_songs, time, users,
};
pub use table::{Column, ColumnType, TableDef};
