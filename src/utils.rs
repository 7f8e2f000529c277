use std::path::{Path, PathBuf};

use anyhow::Error;
use inquire::InquireError;
use thiserror::Error as ThisError;
use tracing::debug;

/// Raised when the user backs out of a prompt; the run ends without changes.
#[derive(Debug, ThisError)]
#[error("Operation cancelled by user")]
pub struct Cancelled;

pub fn handle_inquire_error(err: InquireError, context: &str) -> Error {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            Error::new(Cancelled)
        }
        _ => Error::msg(format!("{}: {}", context, err)),
    }
}

/// Lowercase, collapse every run of characters outside `[a-z0-9]` into one `-`,
/// and trim separators from both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    slug
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

pub fn url_host(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str()
        && let Some(rest) = s.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        let expanded = home.join(rest);
        debug!(original = %s, expanded = %expanded.display(), "expanding ~ to home directory");
        return expanded;
    }
    path.to_path_buf()
}
