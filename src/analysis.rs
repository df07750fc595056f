use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::db::MovieRow;

/// Textual rating tier. The labels are part of the report contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    ObraPrima,
    Excelente,
    Bom,
    Mediano,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::ObraPrima => "Obra-prima",
            Category::Excelente => "Excelente",
            Category::Bom => "Bom",
            Category::Mediano => "Mediano",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a rating into its tier. Lower bounds are inclusive; anything
/// below 7.0, negatives included, is Mediano.
pub fn category_of(rating: f64) -> Category {
    if rating >= 9.0 {
        Category::ObraPrima
    } else if rating >= 8.0 {
        Category::Excelente
    } else if rating >= 7.0 {
        Category::Bom
    } else {
        Category::Mediano
    }
}

/// A loaded movie row plus its derived category column. Computed in memory
/// at analysis time, never persisted.
#[derive(Debug, Clone)]
pub struct CategorizedMovie {
    pub id: i64,
    pub title: String,
    pub year: i64,
    pub rating: f64,
    pub category: Category,
}

pub fn annotate(movies: &[MovieRow]) -> Vec<CategorizedMovie> {
    movies
        .iter()
        .map(|m| CategorizedMovie {
            id: m.id,
            title: m.title.clone(),
            year: m.year,
            rating: m.rating,
            category: category_of(m.rating),
        })
        .collect()
}

/// Category × year count pivot: one row per category (ascending lexical label
/// order), one column per distinct year (ascending), absent cells zero.
pub struct CategorySummary {
    pub years: Vec<i64>,
    pub rows: Vec<(&'static str, Vec<usize>)>,
}

pub fn summarize(movies: &[CategorizedMovie]) -> CategorySummary {
    let mut counts: BTreeMap<&'static str, BTreeMap<i64, usize>> = BTreeMap::new();
    let mut years: BTreeSet<i64> = BTreeSet::new();

    for m in movies {
        years.insert(m.year);
        *counts
            .entry(m.category.label())
            .or_default()
            .entry(m.year)
            .or_insert(0) += 1;
    }

    let years: Vec<i64> = years.into_iter().collect();
    let rows = counts
        .into_iter()
        .map(|(label, by_year)| {
            let cells = years
                .iter()
                .map(|y| by_year.get(y).copied().unwrap_or(0))
                .collect();
            (label, cells)
        })
        .collect();

    CategorySummary { years, rows }
}

/// Movies rated strictly above `threshold`, best first.
pub fn top_rated(movies: &[MovieRow], threshold: f64) -> Vec<&MovieRow> {
    let mut best: Vec<&MovieRow> = movies.iter().filter(|m| m.rating > threshold).collect();
    best.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    best
}
