use std::sync::LazyLock;

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::info;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

static LIST_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.ipc-metadata-list").unwrap());
static ITEM_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.ipc-metadata-list-summary-item").unwrap());
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3.ipc-title__text").unwrap());
static YEAR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.cli-title-metadata-item").unwrap());
static RATING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.ipc-rating-star--rating").unwrap());

/// One entry of the ranked listing, in page order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTitle {
    pub title: String,
    pub year: i64,
    pub rating: f64,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("ranked list container not found in page")]
    ListNotFound,
    #[error("item {index}: missing {field}")]
    MissingField { index: usize, field: &'static str },
    #[error("item {index}: cannot parse {field} from {value:?}")]
    InvalidField {
        index: usize,
        field: &'static str,
        value: String,
    },
}

/// Fetch the ranked listing page once and extract up to `cap` titles.
pub async fn fetch_ranked_titles(url: &str, cap: usize) -> Result<Vec<RankedTitle>> {
    info!("Fetching ranked listing: {}", url);
    let client = reqwest::Client::new();
    let html = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
        .context("Failed to fetch ranked listing page")?;

    let titles = parse_ranked_titles(&html, cap)?;
    info!("Extracted {} titles (cap {})", titles.len(), cap);
    Ok(titles)
}

/// Extract `{title, year, rating}` records from the listing markup.
///
/// The year comes from the first metadata span of each item (later spans hold
/// runtime and certification). Ratings with a decimal comma are normalized
/// before parsing. Any missing or unparseable field aborts extraction.
pub fn parse_ranked_titles(html: &str, cap: usize) -> Result<Vec<RankedTitle>, ExtractionError> {
    let document = Html::parse_document(html);

    let list = document
        .select(&LIST_SEL)
        .next()
        .ok_or(ExtractionError::ListNotFound)?;

    let mut titles = Vec::new();
    for (index, item) in list.select(&ITEM_SEL).take(cap).enumerate() {
        let title = select_text(item, &TITLE_SEL).ok_or(ExtractionError::MissingField {
            index,
            field: "title",
        })?;

        let year_text = select_text(item, &YEAR_SEL).ok_or(ExtractionError::MissingField {
            index,
            field: "year",
        })?;
        let year = year_text
            .parse::<i64>()
            .map_err(|_| ExtractionError::InvalidField {
                index,
                field: "year",
                value: year_text.clone(),
            })?;

        let rating_text = select_text(item, &RATING_SEL).ok_or(ExtractionError::MissingField {
            index,
            field: "rating",
        })?;
        let rating = rating_text
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| ExtractionError::InvalidField {
                index,
                field: "rating",
                value: rating_text.clone(),
            })?;

        titles.push(RankedTitle {
            title,
            year,
            rating,
        });
    }

    Ok(titles)
}

/// Text of the first element matching `selector` under `scope`, trimmed.
fn select_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    let text = scope
        .select(selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}
