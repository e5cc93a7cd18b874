//! `resilink dlq remove <id>`

use anyhow::Result;
use resilink_core::dlq::DeadLetterQueue;

pub async fn run_remove(dlq: &DeadLetterQueue, id: &str) -> Result<()> {
    match dlq.remove_entry(id).await? {
        Some(entry) => println!("Removed {} ({} {})", entry.id, entry.method, entry.url),
        None => anyhow::bail!("no dead-letter entry with id {id}"),
    }
    Ok(())
}
