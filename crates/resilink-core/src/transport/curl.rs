//! libcurl transport. Each attempt runs on a blocking thread; the abort flag is
//! polled from curl's progress callback.

use std::str;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use curl::easy::{Easy, List};

use super::parse::parse_header_lines;
use super::{Transport, TransportOptions};
use crate::failure::{TransportError, TransportErrorKind};
use crate::request::{RequestDescriptor, Response};

#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    options: TransportOptions,
}

impl CurlTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }
}

#[async_trait]
impl Transport for CurlTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        abort: Arc<AtomicBool>,
    ) -> Result<Response, TransportError> {
        let request = request.clone();
        let options = self.options;
        tokio::task::spawn_blocking(move || perform(&request, &options, &abort))
            .await
            .map_err(|e| TransportError::new(TransportErrorKind::Other, format!("curl worker: {e}")))?
    }
}

/// Map a curl error onto the transport failure kinds.
pub(crate) fn classify_curl_error(e: &curl::Error) -> TransportErrorKind {
    if e.is_aborted_by_callback() {
        return TransportErrorKind::Aborted;
    }
    if e.is_operation_timedout() {
        return TransportErrorKind::Timeout;
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return TransportErrorKind::Dns;
    }
    if e.is_couldnt_connect() {
        return TransportErrorKind::Connect;
    }
    if e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return TransportErrorKind::Reset;
    }
    TransportErrorKind::Other
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        TransportError::new(classify_curl_error(&e), e.description())
    }
}

fn perform(
    request: &RequestDescriptor,
    options: &TransportOptions,
    abort: &AtomicBool,
) -> Result<Response, TransportError> {
    if abort.load(Ordering::SeqCst) {
        return Err(TransportError::new(
            TransportErrorKind::Aborted,
            "aborted before send",
        ));
    }

    let mut easy = Easy::new();
    easy.url(&request.url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(options.connect_timeout)?;
    easy.timeout(options.request_timeout)?;

    let method = request.method.as_str();
    match (&request.body, method) {
        (Some(body), _) => {
            easy.post_fields_copy(body.as_bytes())?;
            if method != "POST" {
                easy.custom_request(method)?;
            }
        }
        (None, "GET") => easy.get(true)?,
        (None, "HEAD") => easy.nobody(true)?,
        (None, other) => easy.custom_request(other)?,
    }

    let mut list = List::new();
    for (k, v) in &request.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !request.headers.is_empty() {
        easy.http_headers(list)?;
    }
    easy.progress(true)?;

    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        // Returning false aborts the transfer.
        transfer.progress_function(|_, _, _, _| !abort.load(Ordering::SeqCst))?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    let status = u16::try_from(status).map_err(|_| {
        TransportError::new(
            TransportErrorKind::Other,
            format!("invalid response status {status}"),
        )
    })?;

    Ok(Response {
        status,
        headers: parse_header_lines(&header_lines),
        body,
    })
}
