//! `resilink dlq show <id>` – print one entry as JSON.

use anyhow::Result;
use resilink_core::dlq::DeadLetterQueue;

pub async fn run_show(dlq: &DeadLetterQueue, id: &str) -> Result<()> {
    match dlq.get_entry(id).await? {
        Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
        None => anyhow::bail!("no dead-letter entry with id {id}"),
    }
    Ok(())
}
