//! `resilink dlq clear`

use anyhow::Result;
use resilink_core::dlq::DeadLetterQueue;

pub async fn run_clear(dlq: &DeadLetterQueue) -> Result<()> {
    let n = dlq.clear().await?;
    println!("Cleared {n} dead-letter entries");
    Ok(())
}
