//! `resilink dlq list` – show dead-lettered requests, oldest first.

use anyhow::Result;
use resilink_core::dlq::DeadLetterQueue;

pub async fn run_list(dlq: &DeadLetterQueue, integration: Option<&str>) -> Result<()> {
    let entries = dlq.list_entries(integration).await?;
    if entries.is_empty() {
        println!("No dead-letter entries.");
        return Ok(());
    }
    println!(
        "{:<36} {:<14} {:<7} {:<7} {}",
        "ID", "INTEGRATION", "METHOD", "TRIES", "URL"
    );
    for e in entries {
        println!(
            "{:<36} {:<14} {:<7} {:<7} {}",
            e.id, e.integration_name, e.method, e.retry_count, e.url
        );
        println!("    {}", e.error_description);
    }
    Ok(())
}
