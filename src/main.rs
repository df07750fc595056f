mod analysis;
mod config;
mod db;
mod export;
mod models;
mod scraper;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "imdb_catalog", about = "Ranked-listing scraper and catalog pipeline")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: scrape, persist, analyze, export
    Run {
        /// Override the configured extraction cap
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Reload the store and print the analysis report
    Summary,
    /// Reload the store and write the CSV/JSON artifacts
    Export,
    /// Show stored row counts
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    let result = match cli.command {
        Commands::Run { limit } => run_pipeline(&cfg, limit).await,
        Commands::Summary => {
            let conn = db::connect(&cfg.db_path)?;
            db::init_schema(&conn)?;
            let movies = db::load_movies(&conn)?;
            if movies.is_empty() {
                println!("No stored movies. Run 'run' first.");
                return Ok(());
            }
            print_analysis(&movies);
            Ok(())
        }
        Commands::Export => {
            let conn = db::connect(&cfg.db_path)?;
            db::init_schema(&conn)?;
            let movies = db::load_movies(&conn)?;
            let series = db::load_series(&conn)?;
            export::export_tables(&movies, &series, Path::new(&cfg.output_dir))
        }
        Commands::Stats => {
            let conn = db::connect(&cfg.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Movies: {}", s.movies);
            println!("Series: {}", s.series);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_pipeline(cfg: &config::Config, limit: Option<usize>) -> anyhow::Result<()> {
    let cap = limit.unwrap_or(cfg.n_filmes);

    let records = scraper::fetch_ranked_titles(&cfg.imdb_url, cap).await?;
    println!("Scraped {} titles from {}", records.len(), cfg.imdb_url);

    println!("\n--- Top of the ranking ---");
    for (i, r) in records.iter().take(10).enumerate() {
        println!("{:>3}) \"{}\"", i + 1, r.title);
    }

    let catalog = models::build_catalog(&records);
    println!("\n--- Catalog ({} items) ---", catalog.len());
    for item in &catalog {
        println!("{}", item);
    }

    let conn = db::connect(&cfg.db_path)?;
    db::init_schema(&conn)?;
    println!("\nSaving catalog to {}...", cfg.db_path);
    let stats = db::save_catalog(&conn, &catalog)?;
    println!(
        "Saved {} movies and {} series ({} duplicate titles ignored).",
        stats.movies, stats.series, stats.duplicates
    );

    let movies = db::load_movies(&conn)?;
    let series = db::load_series(&conn)?;

    println!("\n--- Stored movies (first 5 of {}) ---", movies.len());
    for m in movies.iter().take(5) {
        println!(
            "{:>4} | {:<44} | {} | {:.1}",
            m.id,
            truncate(&m.title, 44),
            m.year,
            m.rating
        );
    }

    println!("\n--- Stored series (first 5 of {}) ---", series.len());
    for s in series.iter().take(5) {
        println!(
            "{:>4} | {:<44} | {} | {} seasons, {} episodes",
            s.id,
            truncate(&s.title, 44),
            s.year,
            s.seasons,
            s.episodes
        );
    }

    println!();
    export::export_tables(&movies, &series, Path::new(&cfg.output_dir))?;

    print_analysis(&movies);
    Ok(())
}

fn print_analysis(movies: &[db::MovieRow]) {
    let best = analysis::top_rated(movies, 9.0);
    println!("\n--- Movies rated above 9.0 ---");
    if best.is_empty() {
        println!("(none)");
    }
    for m in best.iter().take(5) {
        println!("\"{}\" ({}) - {:.1}", m.title, m.year, m.rating);
    }

    let categorized = analysis::annotate(movies);
    println!("\n--- Categories (first 10) ---");
    for m in categorized.iter().take(10) {
        println!(
            "{:<44} | {:.1} | {}",
            truncate(&m.title, 44),
            m.rating,
            m.category
        );
    }

    let summary = analysis::summarize(&categorized);
    println!("\n--- Movie count by category and year ---");
    print_summary(&summary);
}

fn print_summary(summary: &analysis::CategorySummary) {
    print!("{:<12}", "category");
    for y in &summary.years {
        print!(" {:>6}", y);
    }
    println!();

    for (label, cells) in &summary.rows {
        print!("{:<12}", label);
        for c in cells {
            print!(" {:>6}", c);
        }
        println!();
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
