use std::fmt;

use crate::scraper::RankedTitle;

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub title: String,
    pub year: i64,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub title: String,
    pub year: i64,
    pub seasons: i64,
    pub episodes: i64,
}

/// A catalog entry is exactly one of the two kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Work {
    Movie(Movie),
    Series(Series),
}

impl Work {
    pub fn title(&self) -> &str {
        match self {
            Work::Movie(m) => &m.title,
            Work::Series(s) => &s.title,
        }
    }

    pub fn year(&self) -> i64 {
        match self {
            Work::Movie(m) => m.year,
            Work::Series(s) => s.year,
        }
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({}) - Rating: {}", self.title, self.year, self.rating)
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" ({}) - Seasons: {}, Episodes: {}",
            self.title, self.year, self.seasons, self.episodes
        )
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Work::Movie(m) => m.fmt(f),
            Work::Series(s) => s.fmt(f),
        }
    }
}

/// Build the in-memory catalog: one Movie per extracted record in page order,
/// then the two fixed Series entries.
pub fn build_catalog(records: &[RankedTitle]) -> Vec<Work> {
    let mut catalog: Vec<Work> = records
        .iter()
        .map(|r| {
            Work::Movie(Movie {
                title: r.title.clone(),
                year: r.year,
                rating: r.rating,
            })
        })
        .collect();

    catalog.push(Work::Series(Series {
        title: "Breaking Bad".to_string(),
        year: 2008,
        seasons: 5,
        episodes: 62,
    }));
    catalog.push(Work::Series(Series {
        title: "Better Call Saul".to_string(),
        year: 2015,
        seasons: 6,
        episodes: 63,
    }));

    catalog
}
