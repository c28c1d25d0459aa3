use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use newswire::{config, feed, Category, Registry};

#[derive(Parser, Debug)]
#[command(name = "newswire", about = "Aggregate a fixed set of RSS/Atom feeds into one ranked list")]
struct Args {
    /// TOML file overriding the built-in source registry
    #[arg(long, value_name = "FILE")]
    sources: Option<PathBuf>,

    /// Only show items from one category (tech, dev, ai, general)
    #[arg(long)]
    category: Option<Category>,

    /// Maximum number of items to print
    #[arg(long, default_value_t = 50)]
    limit: usize,

    /// Emit the full result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let registry = match &args.sources {
        Some(path) => config::load_registry(path)
            .with_context(|| format!("Failed to load sources file: {}", path.display()))?,
        None => Registry::default(),
    };

    let client = feed::build_client().context("Failed to build HTTP client")?;
    let mut result = feed::fetch_all_news(&client, &registry).await;

    if let Some(category) = args.category {
        result.items.retain(|item| item.category == category);
    }
    result.items.truncate(args.limit);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    // Partial failures are warnings, never a non-zero exit: whatever
    // items were recovered still get rendered
    for error in &result.errors {
        eprintln!("warning: {}: {}", error.source, error.message);
    }

    if result.items.is_empty() {
        println!("No items within the configured age window.");
        return Ok(());
    }

    for item in &result.items {
        println!(
            "{}  [{}] ({}) {}",
            item.published_at.format("%Y-%m-%d %H:%M"),
            item.source,
            item.category,
            item.title
        );
        if !item.summary.is_empty() {
            println!("    {}", item.summary);
        }
        println!("    {}", item.url);
    }

    Ok(())
}
