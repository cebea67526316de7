use anyhow::Result;
use reqwest::Response;

/// Upper bound on how much of a failure body is read for classification.
pub const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Read at most `max_bytes` of a failure body, lossily decoded as UTF-8.
///
/// Bytes past the limit are dropped rather than rejected: a cut-off
/// envelope fails to parse and the status table classifies the error
/// instead.
pub async fn read_error_body(mut resp: Response, max_bytes: usize) -> Result<String> {
    let hint = resp
        .content_length()
        .map_or(0, |len| usize::try_from(len).unwrap_or(max_bytes).min(max_bytes));
    let mut buf = Vec::with_capacity(hint);
    while let Some(chunk) = resp.chunk().await? {
        let room = max_bytes - buf.len();
        if chunk.len() >= room {
            buf.extend_from_slice(&chunk[..room]);
            break;
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
