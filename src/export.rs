use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use crate::db::{MovieRow, SeriesRow};

const MOVIE_COLUMNS: [&str; 4] = ["id", "title", "year", "rating"];
const SERIES_COLUMNS: [&str; 5] = ["id", "title", "year", "seasons", "episodes"];

/// Write the four artifacts into `out_dir` (created if absent). Each write is
/// independent: a failure is reported with filename and cause, and the
/// remaining artifacts are still written.
pub fn export_tables(movies: &[MovieRow], series: &[SeriesRow], out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let movie_rows: Vec<Vec<String>> = movies.iter().map(movie_fields).collect();
    let series_rows: Vec<Vec<String>> = series.iter().map(series_fields).collect();

    write_artifact(
        &out_dir.join("movies.csv"),
        &csv_document(&MOVIE_COLUMNS, &movie_rows),
    );
    write_artifact(
        &out_dir.join("series.csv"),
        &csv_document(&SERIES_COLUMNS, &series_rows),
    );
    write_artifact(&out_dir.join("movies.json"), &json_document(movies)?);
    write_artifact(&out_dir.join("series.json"), &json_document(series)?);

    Ok(())
}

fn movie_fields(m: &MovieRow) -> Vec<String> {
    vec![
        m.id.to_string(),
        m.title.clone(),
        m.year.to_string(),
        m.rating.to_string(),
    ]
}

fn series_fields(s: &SeriesRow) -> Vec<String> {
    vec![
        s.id.to_string(),
        s.title.clone(),
        s.year.to_string(),
        s.seasons.to_string(),
        s.episodes.to_string(),
    ]
}

fn write_artifact(path: &Path, contents: &str) {
    match fs::write(path, contents) {
        Ok(()) => println!("Exported {}", path.display()),
        Err(e) => warn!("Failed to export {}: {}", path.display(), e),
    }
}

// ── CSV ──

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_row(out: &mut String, row: &[String]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Comma-delimited document with a header row; fields quoted only when needed.
fn csv_document(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    push_row(&mut out, &header);
    for row in rows {
        push_row(&mut out, row);
    }
    out
}

// ── JSON ──

/// Array-of-objects with 4-space indentation. serde_json leaves non-ASCII
/// characters unescaped.
fn json_document<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    rows.serialize(&mut ser)
        .context("Failed to serialize rows to JSON")?;
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tmp_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("imdb_catalog_{}", name));
        let _ = fs::remove_dir_all(&p);
        p
    }

    fn sample_movies() -> Vec<MovieRow> {
        vec![
            MovieRow {
                id: 1,
                title: "O Poderoso Chefão".to_string(),
                year: 1972,
                rating: 9.2,
            },
            MovieRow {
                id: 2,
                title: "Il Buono, il Brutto, il Cattivo".to_string(),
                year: 1966,
                rating: 8.8,
            },
        ]
    }

    fn sample_series() -> Vec<SeriesRow> {
        vec![SeriesRow {
            id: 1,
            title: "Breaking Bad".to_string(),
            year: 2008,
            seasons: 5,
            episodes: 62,
        }]
    }

    #[test]
    fn writes_all_four_artifacts() {
        let dir = tmp_dir("all_four");
        export_tables(&sample_movies(), &sample_series(), &dir).unwrap();

        for name in ["movies.csv", "series.csv", "movies.json", "series.json"] {
            assert!(dir.join(name).is_file(), "{} missing", name);
        }

        let csv = fs::read_to_string(dir.join("series.csv")).unwrap();
        assert_eq!(csv, "id,title,year,seasons,episodes\n1,Breaking Bad,2008,5,62\n");
    }

    #[test]
    fn csv_quotes_only_fields_that_need_it() {
        let rows = vec![vec![
            "1".to_string(),
            "Il Buono, il Brutto, il Cattivo".to_string(),
            "1966".to_string(),
        ]];
        let doc = csv_document(&["id", "title", "year"], &rows);
        assert_eq!(
            doc,
            "id,title,year\n1,\"Il Buono, il Brutto, il Cattivo\",1966\n"
        );
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        let rows = vec![vec!["1".to_string(), "O \"Chefe\"".to_string()]];
        let doc = csv_document(&["id", "title"], &rows);
        assert_eq!(doc, "id,title\n1,\"O \"\"Chefe\"\"\"\n");
    }

    #[test]
    fn json_uses_four_space_indent_and_keeps_non_ascii() {
        let doc = json_document(&sample_movies()).unwrap();
        assert!(doc.starts_with("[\n    {\n        \"id\": 1,"));
        assert!(doc.contains("O Poderoso Chefão"));
        assert!(!doc.contains("\\u"));
    }

    #[test]
    fn reexport_is_byte_identical() {
        let dir = tmp_dir("idempotent");
        let movies = sample_movies();
        let series = sample_series();

        export_tables(&movies, &series, &dir).unwrap();
        let first: Vec<Vec<u8>> = ["movies.csv", "series.csv", "movies.json", "series.json"]
            .iter()
            .map(|n| fs::read(dir.join(n)).unwrap())
            .collect();

        export_tables(&movies, &series, &dir).unwrap();
        for (i, name) in ["movies.csv", "series.csv", "movies.json", "series.json"]
            .iter()
            .enumerate()
        {
            assert_eq!(fs::read(dir.join(name)).unwrap(), first[i], "{} changed", name);
        }
    }

    #[test]
    #[cfg(unix)]
    fn one_failed_artifact_does_not_block_the_rest() {
        let dir = tmp_dir("partial_failure");
        fs::create_dir_all(&dir).unwrap();
        // A directory squatting on the target filename makes that one write fail.
        fs::create_dir_all(dir.join("movies.csv")).unwrap();

        export_tables(&sample_movies(), &sample_series(), &dir).unwrap();

        assert!(dir.join("series.csv").is_file());
        assert!(dir.join("movies.json").is_file());
        assert!(dir.join("series.json").is_file());
    }
}
