//! CLI command handlers, one per file.

mod clear;
mod list;
mod remove;
mod replay;
mod request;
mod show;

use std::future::Future;

use anyhow::Result;
use resilink_core::config::ResilienceConfig;
use resilink_core::dlq::DeadLetterQueue;
use resilink_core::request::Response;
use resilink_core::transport::CurlTransport;
use resilink_core::ResilientClient;
use tokio_util::sync::CancellationToken;

pub use clear::run_clear;
pub use list::run_list;
pub use remove::run_remove;
pub use replay::run_replay;
pub use request::{parse_header_arg, run_request, RequestArgs};
pub use show::run_show;

/// Client for `integration` using the config file's settings and the shared queue.
fn build_client(
    cfg: &ResilienceConfig,
    dlq: &DeadLetterQueue,
    integration: &str,
) -> Result<ResilientClient> {
    let client_cfg = cfg.client_config(integration)?;
    let client = ResilientClient::builder(client_cfg)
        .transport(std::sync::Arc::new(CurlTransport::new(
            cfg.transport.to_options(),
        )))
        .dlq(dlq.clone())
        .build()?;
    Ok(client)
}

/// Run `op` with a token that is cancelled on Ctrl-C.
async fn with_ctrl_c<F, Fut, T>(op: F) -> T
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = T>,
{
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    let result = op(cancel).await;
    watcher.abort();
    result
}

fn print_response(resp: &Response) {
    println!("HTTP {}", resp.status);
    let body = resp.text();
    if !body.is_empty() {
        println!("{body}");
    }
}
