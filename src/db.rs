use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use serde::Serialize;
use tracing::warn;

use crate::models::Work;

pub fn connect(db_path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS movies (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            title  TEXT UNIQUE NOT NULL,
            year   INTEGER,
            rating REAL
        );

        CREATE TABLE IF NOT EXISTS series (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            title    TEXT UNIQUE NOT NULL,
            year     INTEGER,
            seasons  INTEGER,
            episodes INTEGER
        );
        ",
    )?;
    Ok(())
}

// ── Saving ──

/// Outcome of one save pass over a catalog.
pub struct SaveStats {
    pub movies: usize,
    pub series: usize,
    pub duplicates: usize,
}

/// Insert each catalog item in its own transaction. A duplicate title rolls
/// back only that item; prior and subsequent items still land.
pub fn save_catalog(conn: &Connection, catalog: &[Work]) -> Result<SaveStats> {
    let pb = ProgressBar::new(catalog.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len}")?
            .progress_chars("=> "),
    );

    let mut stats = SaveStats {
        movies: 0,
        series: 0,
        duplicates: 0,
    };

    for item in catalog {
        let tx = conn.unchecked_transaction()?;
        let inserted = match item {
            Work::Movie(m) => tx.execute(
                "INSERT INTO movies (title, year, rating) VALUES (?1, ?2, ?3)",
                rusqlite::params![m.title, m.year, m.rating],
            ),
            Work::Series(s) => tx.execute(
                "INSERT INTO series (title, year, seasons, episodes) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![s.title, s.year, s.seasons, s.episodes],
            ),
        };

        match inserted {
            Ok(_) => {
                tx.commit()?;
                match item {
                    Work::Movie(_) => stats.movies += 1,
                    Work::Series(_) => stats.series += 1,
                }
            }
            Err(e) if is_unique_violation(&e) => {
                tx.rollback()?;
                stats.duplicates += 1;
                warn!("Duplicate title ignored: \"{}\"", item.title());
            }
            Err(e) => return Err(e.into()),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(stats)
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ── Loading ──

/// Row of the `movies` relation, fields in storage column order.
#[derive(Debug, Clone, Serialize)]
pub struct MovieRow {
    pub id: i64,
    pub title: String,
    pub year: i64,
    pub rating: f64,
}

/// Row of the `series` relation, fields in storage column order.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesRow {
    pub id: i64,
    pub title: String,
    pub year: i64,
    pub seasons: i64,
    pub episodes: i64,
}

pub fn load_movies(conn: &Connection) -> Result<Vec<MovieRow>> {
    let mut stmt = conn.prepare("SELECT id, title, year, rating FROM movies ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MovieRow {
                id: row.get(0)?,
                title: row.get(1)?,
                year: row.get(2)?,
                rating: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load_series(conn: &Connection) -> Result<Vec<SeriesRow>> {
    let mut stmt =
        conn.prepare("SELECT id, title, year, seasons, episodes FROM series ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SeriesRow {
                id: row.get(0)?,
                title: row.get(1)?,
                year: row.get(2)?,
                seasons: row.get(3)?,
                episodes: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct StoreStats {
    pub movies: usize,
    pub series: usize,
}

pub fn get_stats(conn: &Connection) -> Result<StoreStats> {
    let movies: usize = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
    let series: usize = conn.query_row("SELECT COUNT(*) FROM series", [], |r| r.get(0))?;
    Ok(StoreStats { movies, series })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Movie, Series};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn movie(title: &str, year: i64, rating: f64) -> Work {
        Work::Movie(Movie {
            title: title.to_string(),
            year,
            rating,
        })
    }

    fn series(title: &str, year: i64, seasons: i64, episodes: i64) -> Work {
        Work::Series(Series {
            title: title.to_string(),
            year,
            seasons,
            episodes,
        })
    }

    #[test]
    fn schema_creation_is_idempotent() {
        let conn = test_conn();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.movies, 0);
        assert_eq!(stats.series, 0);
    }

    #[test]
    fn duplicate_title_keeps_first_row_and_rest_of_batch() {
        let conn = test_conn();
        let catalog = vec![
            movie("Matrix", 1999, 8.7),
            movie("Matrix", 2003, 7.2),
            movie("Pulp Fiction", 1994, 8.9),
            series("Breaking Bad", 2008, 5, 62),
        ];

        let stats = save_catalog(&conn, &catalog).unwrap();
        assert_eq!(stats.movies, 2);
        assert_eq!(stats.series, 1);
        assert_eq!(stats.duplicates, 1);

        let rows = load_movies(&conn).unwrap();
        assert_eq!(rows.len(), 2);
        // First insert wins; the duplicate is rejected, not overwritten.
        assert_eq!(rows[0].title, "Matrix");
        assert_eq!(rows[0].year, 1999);
        assert_eq!(rows[1].title, "Pulp Fiction");
    }

    #[test]
    fn duplicates_across_runs_are_rejected() {
        let conn = test_conn();
        let catalog = vec![movie("Matrix", 1999, 8.7), series("Breaking Bad", 2008, 5, 62)];

        save_catalog(&conn, &catalog).unwrap();
        let second = save_catalog(&conn, &catalog).unwrap();
        assert_eq!(second.movies, 0);
        assert_eq!(second.series, 0);
        assert_eq!(second.duplicates, 2);

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.movies, 1);
        assert_eq!(stats.series, 1);
    }

    #[test]
    fn loads_preserve_insertion_order() {
        let conn = test_conn();
        let catalog = vec![
            movie("Zodíaco", 2007, 7.7),
            movie("Amadeus", 1984, 8.4),
            movie("Chinatown", 1974, 8.1),
        ];
        save_catalog(&conn, &catalog).unwrap();

        let rows = load_movies(&conn).unwrap();
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Zodíaco", "Amadeus", "Chinatown"]);
        assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn series_round_trip() {
        let conn = test_conn();
        save_catalog(&conn, &[series("Better Call Saul", 2015, 6, 63)]).unwrap();

        let rows = load_series(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Better Call Saul");
        assert_eq!(rows[0].year, 2015);
        assert_eq!(rows[0].seasons, 6);
        assert_eq!(rows[0].episodes, 63);
    }
}
