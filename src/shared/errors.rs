const BODY_EXCERPT_CHARS: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to reach {url}: {message}")]
    Connectivity { url: String, message: String },
    #[error("{url} returned {status} {reason}{}", body_suffix(.body))]
    Service {
        url: String,
        status: u16,
        reason: String,
        body: String,
    },
    #[error("failed to prepare request for {url}: {message}")]
    Request { url: String, message: String },
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("failed to read upload file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ClientError::Connectivity { .. })
    }
}

fn body_suffix(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let excerpt: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    if excerpt.len() < trimmed.len() {
        format!(": {excerpt}...")
    } else {
        format!(": {excerpt}")
    }
}
