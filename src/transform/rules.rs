//! The five staging-to-star transform rules
//!
//! Each rule is a pure insert-select against one target table, reading only
//! from staging. They share no state and write to disjoint tables, so the
//! sequencer is free to issue them concurrently.

use crate::schema;

/// One transformation rule, mapping staging data to one target table.
///
/// The SQL encodes the pipeline's entire cleaning policy: null-filtering on
/// the dimension keys, deterministic dedup where staging repeats a key, and
/// the equi-join that derives fact rows. Everything else passes through
/// unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformRule {
    Users,
    Songs,
    Artists,
    Time,
    Songplays,
}

impl TransformRule {
    /// All five rules. Order here is presentation only; execution order is
    /// the sequencer's business.
    pub const ALL: [TransformRule; 5] = [
        TransformRule::Users,
        TransformRule::Songs,
        TransformRule::Artists,
        TransformRule::Time,
        TransformRule::Songplays,
    ];

    /// The table this rule writes to.
    pub fn target_table(&self) -> &'static str {
        match self {
            Self::Users => schema::USERS,
            Self::Songs => schema::SONGS,
            Self::Artists => schema::ARTISTS,
            Self::Time => schema::TIME,
            Self::Songplays => schema::SONGPLAYS,
        }
    }

    /// The insert-select statement for this rule.
    pub fn sql(&self) -> &'static str {
        match self {
            // One row per user_id; on duplicates the latest event wins.
            Self::Users => {
                "INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT user_id, first_name, last_name, gender, level
FROM (
    SELECT user_id, first_name, last_name, gender, level,
           ROW_NUMBER() OVER (PARTITION BY user_id ORDER BY ts DESC) AS event_rank
    FROM staging_events
    WHERE user_id IS NOT NULL
) ranked
WHERE event_rank = 1;"
            }
            // Pass-through of catalog rows with a usable artist reference.
            Self::Songs => {
                "INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT song_id, title, artist_id, year, duration
FROM staging_songs
WHERE artist_id IS NOT NULL;"
            }
            // One row per artist_id; on duplicates the lowest song_id wins.
            Self::Artists => {
                "INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT artist_id, artist_name, artist_location, artist_latitude, artist_longitude
FROM (
    SELECT artist_id, artist_name, artist_location, artist_latitude, artist_longitude,
           ROW_NUMBER() OVER (PARTITION BY artist_id ORDER BY song_id) AS song_rank
    FROM staging_songs
    WHERE artist_id IS NOT NULL
) ranked
WHERE song_rank = 1;"
            }
            // Calendar decomposition of each distinct event timestamp,
            // interpreted as UTC epoch seconds. Must agree with
            // `TimeParts::from_epoch_seconds`.
            Self::Time => {
                "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT DISTINCT
    TIMESTAMP 'epoch' + ts * INTERVAL '1 second' AS start_time,
    EXTRACT(hour FROM start_time),
    EXTRACT(day FROM start_time),
    EXTRACT(week FROM start_time),
    EXTRACT(month FROM start_time),
    EXTRACT(year FROM start_time),
    EXTRACT(weekday FROM start_time)
FROM staging_events
WHERE ts IS NOT NULL;"
            }
            // Equi-join on (song title, artist name), not a foreign-key
            // lookup: events with no catalog match produce no fact row.
            Self::Songplays => {
                "INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT DISTINCT
    TIMESTAMP 'epoch' + se.ts * INTERVAL '1 second' AS start_time,
    se.user_id,
    se.level,
    ss.song_id,
    ss.artist_id,
    se.session_id,
    se.location,
    se.user_agent
FROM staging_events se
JOIN staging_songs ss
  ON se.song = ss.title
 AND se.artist = ss.artist_name
WHERE se.page = 'NextSong';"
            }
        }
    }
}

impl std::fmt::Display for TransformRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.target_table())
    }
}
