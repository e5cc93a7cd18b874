//! `resilink dlq replay <id>` – send a dead-lettered request again.
//!
//! The entry leaves the queue only once the replay succeeds; a failed or
//! cancelled replay leaves it exactly as it was.

use anyhow::Result;
use resilink_core::config::ResilienceConfig;
use resilink_core::dlq::DeadLetterQueue;

use super::{build_client, print_response, with_ctrl_c};

pub async fn run_replay(cfg: &ResilienceConfig, dlq: &DeadLetterQueue, id: &str) -> Result<()> {
    let Some(entry) = dlq.get_entry(id).await? else {
        anyhow::bail!("no dead-letter entry with id {id}");
    };
    let client = build_client(cfg, dlq, &entry.integration_name)?;

    let result = with_ctrl_c(|cancel| {
        let client = &client;
        let entry = &entry;
        async move { client.replay_with_cancel(entry, &cancel).await }
    })
    .await;
    match result {
        Ok(resp) => {
            print_response(&resp);
            Ok(())
        }
        Err(err) => {
            eprintln!("Replay failed; entry {} kept in the queue", entry.id);
            Err(err.into())
        }
    }
}
