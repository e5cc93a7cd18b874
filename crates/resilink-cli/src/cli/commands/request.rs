//! `resilink request <integration> <url>` – send one request through the harness.

use anyhow::{Context, Result};
use resilink_core::config::ResilienceConfig;
use resilink_core::dlq::DeadLetterQueue;
use resilink_core::request::RequestDescriptor;

use super::{build_client, print_response, with_ctrl_c};

#[derive(Debug, Clone)]
pub struct RequestArgs {
    pub integration: String,
    pub url: String,
    pub method: String,
    pub headers: Vec<String>,
    pub data: Option<String>,
}

/// Split a `-H 'Name: value'` argument.
pub fn parse_header_arg(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("header must look like 'Name: value', got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("header name is empty in {raw:?}");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl RequestArgs {
    pub fn to_descriptor(&self) -> Result<RequestDescriptor> {
        let mut request = RequestDescriptor::new(&self.url).method(&self.method);
        for raw in &self.headers {
            let (name, value) = parse_header_arg(raw)?;
            request = request.header(name, value);
        }
        if let Some(body) = &self.data {
            request = request.body(body);
        }
        request.parsed_url()?;
        Ok(request)
    }
}

pub async fn run_request(
    cfg: &ResilienceConfig,
    dlq: &DeadLetterQueue,
    args: RequestArgs,
) -> Result<()> {
    let request = args.to_descriptor()?;
    let client = build_client(cfg, dlq, &args.integration)?;
    let resp = with_ctrl_c(|cancel| async move {
        client.request_with_cancel(request, &cancel).await
    })
    .await?;
    print_response(&resp);
    Ok(())
}
