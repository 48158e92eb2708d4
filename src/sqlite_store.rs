use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::config::app_cache_dir;
use crate::outcome::StatRecord;
use crate::store::{MprHistoryEntry, RatingStore};

const DB_FILE: &str = "ratings.sqlite";

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

/// SQLite-backed rating store. Owns its connection, so writes are serialized.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        tracing::debug!(path = %path.display(), "opened rating store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS stats (
            player TEXT NOT NULL,
            match_id INTEGER NOT NULL,
            goals INTEGER NOT NULL,
            assists INTEGER NOT NULL,
            big_chance_conversions INTEGER NOT NULL,
            dribbles INTEGER NOT NULL,
            recorded_at TEXT NOT NULL,
            PRIMARY KEY (player, match_id)
        );

        CREATE TABLE IF NOT EXISTS mpr_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            player TEXT NOT NULL,
            match_label TEXT NOT NULL,
            match_id INTEGER NULL,
            role TEXT NOT NULL,
            mpr REAL NOT NULL,
            recorded_at TEXT NOT NULL,
            aqc REAL NOT NULL,
            his REAL NOT NULL,
            ec REAL NOT NULL,
            tii REAL NOT NULL,
            ibi REAL NOT NULL,
            sci REAL NOT NULL,
            om REAL NOT NULL,
            pi REAL NULL
        );
        CREATE INDEX IF NOT EXISTS idx_history_player ON mpr_history(player);
        CREATE INDEX IF NOT EXISTS idx_history_recorded_at ON mpr_history(recorded_at);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

impl RatingStore for SqliteStore {
    fn record_stats(&self, stats: &StatRecord) -> Result<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO stats (
                    player, match_id, goals, assists, big_chance_conversions, dribbles, recorded_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(player, match_id) DO UPDATE SET
                    goals = excluded.goals,
                    assists = excluded.assists,
                    big_chance_conversions = excluded.big_chance_conversions,
                    dribbles = excluded.dribbles,
                    recorded_at = excluded.recorded_at
                "#,
                params![
                    stats.player,
                    stats.match_id,
                    stats.goals as i64,
                    stats.assists as i64,
                    stats.big_chance_conversions as i64,
                    stats.dribbles as i64,
                    timestamp_text(stats.timestamp),
                ],
            )
            .context("upsert stat record")?;
        Ok(())
    }

    fn stats_for(&self, player: &str, match_id: i64) -> Result<Option<StatRecord>> {
        let raw = self
            .conn
            .query_row(
                r#"
                SELECT player, match_id, goals, assists, big_chance_conversions, dribbles, recorded_at
                FROM stats
                WHERE player = ?1 AND match_id = ?2
                "#,
                params![player, match_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()
            .context("query stat record")?;

        let Some((player, match_id, goals, assists, bcc, dribbles, recorded_at)) = raw else {
            return Ok(None);
        };
        Ok(Some(StatRecord {
            player,
            match_id,
            goals: count(goals),
            assists: count(assists),
            big_chance_conversions: count(bcc),
            dribbles: count(dribbles),
            timestamp: parse_timestamp(&recorded_at)?,
        }))
    }

    fn append_history(&self, entry: &MprHistoryEntry) -> Result<i64> {
        self.conn
            .execute(
                r#"
                INSERT INTO mpr_history (
                    player, match_label, match_id, role, mpr, recorded_at,
                    aqc, his, ec, tii, ibi, sci, om, pi
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6,
                    ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14
                )
                "#,
                params![
                    entry.player,
                    entry.match_label,
                    entry.match_id,
                    entry.role,
                    entry.mpr,
                    timestamp_text(entry.timestamp),
                    entry.aqc,
                    entry.his,
                    entry.ec,
                    entry.tii,
                    entry.ibi,
                    entry.sci,
                    entry.om,
                    entry.pi,
                ],
            )
            .context("insert mpr history entry")?;
        Ok(self.conn.last_insert_rowid())
    }

    fn history_for(
        &self,
        player: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<MprHistoryEntry>> {
        let since = since.map(timestamp_text);
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT
                    id, player, match_label, match_id, role, mpr, recorded_at,
                    aqc, his, ec, tii, ibi, sci, om, pi
                FROM mpr_history
                WHERE player = ?1
                  AND (?2 IS NULL OR recorded_at >= ?2)
                ORDER BY recorded_at ASC, id ASC
                "#,
            )
            .context("prepare history query")?;

        let rows = stmt
            .query_map(params![player, since], history_row)
            .context("query history")?;

        let mut out = Vec::new();
        for row in rows {
            let (mut entry, recorded_at) = row.context("decode history row")?;
            entry.timestamp = parse_timestamp(&recorded_at)?;
            out.push(entry);
        }
        Ok(out)
    }

    fn players(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT player FROM mpr_history ORDER BY player ASC")
            .context("prepare players query")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("query players")?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode player row")?);
        }
        Ok(out)
    }
}

fn history_row(row: &Row<'_>) -> rusqlite::Result<(MprHistoryEntry, String)> {
    let recorded_at: String = row.get(6)?;
    let entry = MprHistoryEntry {
        id: Some(row.get(0)?),
        player: row.get(1)?,
        match_label: row.get(2)?,
        match_id: row.get(3)?,
        role: row.get(4)?,
        mpr: row.get(5)?,
        timestamp: DateTime::<Utc>::MIN_UTC,
        aqc: row.get(7)?,
        his: row.get(8)?,
        ec: row.get(9)?,
        tii: row.get(10)?,
        ibi: row.get(11)?,
        sci: row.get(12)?,
        om: row.get(13)?,
        pi: row.get(14)?,
    };
    Ok((entry, recorded_at))
}

// Fixed-width UTC text so lexical order in SQL matches time order.
fn timestamp_text(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|err| anyhow!("bad stored timestamp '{raw}': {err}"))
}

fn count(raw: i64) -> u32 {
    u32::try_from(raw).unwrap_or(0)
}
