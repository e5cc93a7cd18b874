//! Parse raw response header lines collected by curl.

/// Turn header lines into `(name, value)` pairs.
///
/// With redirects followed, curl reports the headers of every hop; only the
/// final response's block is kept (each `HTTP/` status line starts a new one).
pub(crate) fn parse_header_lines(lines: &[String]) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            headers.clear();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            headers.push((name.to_string(), value.trim().to_string()));
        }
    }
    headers
}
