//! Store statistics overview.
//!
//! Quick summary of what's ingested: record counts, per-source breakdown,
//! and database size. Used by `docrag stats` to confirm that ingestion
//! runs landed as expected.

use anyhow::Result;

use crate::config::Config;
use crate::store::sqlite::SqliteStore;
use crate::store::VectorStore;

/// Run the stats command: query the store and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::open(&config.store).await?;

    let total = store.count().await?;
    let by_source = store.source_breakdown().await?;

    let db_size = std::fs::metadata(&config.store.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("docrag — store stats");
    println!("====================");
    println!();
    println!("  Database:  {}", config.store.path.display());
    println!("  Size:      {}", format_bytes(db_size));
    println!();
    println!("  Records:   {}", total);

    if !by_source.is_empty() {
        println!();
        println!("  By source:");
        for (source, n) in &by_source {
            println!("    {:<40} {}", source, n);
        }
    }

    store.close().await;
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_scales() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
