use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use reqwest::{blocking::Client, header::USER_AGENT};
use tracing::{debug, info, instrument, warn};

use crate::{configuration::IconSettings, webapp::error::WebAppError};

/// Where the icon for a web app should come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    Url(String),
    /// Resolve the site's favicon through the configured lookup service.
    Favicon,
    None,
}

pub fn icon_path(icons_dir: &Path, slug: &str) -> PathBuf {
    icons_dir.join(format!("{}_webapp.png", slug))
}

pub fn favicon_url(service: &str, host: &str) -> String {
    service.replace("{domain}", host)
}

/// Streams `url` into `dest`, replacing any previous file. A partial file is
/// removed on failure.
#[instrument(skip(settings))]
pub fn download_icon(
    url: &str,
    dest: &Path,
    settings: &IconSettings,
) -> Result<PathBuf, WebAppError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| WebAppError::filesystem("create icon directory", parent, e))?;
    }

    let client = Client::builder()
        .timeout(settings.timeout())
        .build()
        .map_err(|e| WebAppError::NetworkFailure(e.to_string()))?;

    let mut response = client
        .get(url)
        .header(USER_AGENT, settings.user_agent.as_str())
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(|e| WebAppError::NetworkFailure(e.to_string()))?;

    debug!(status = %response.status(), "icon response received");

    let mut file =
        File::create(dest).map_err(|e| WebAppError::filesystem("create icon file", dest, e))?;

    if let Err(e) = response.copy_to(&mut file) {
        drop(file);
        fs::remove_file(dest).ok();
        return Err(WebAppError::NetworkFailure(e.to_string()));
    }

    info!(path = %dest.display(), "icon saved");
    Ok(dest.to_path_buf())
}

/// Installs the icon for `slug`. Every failure degrades to `None`; a message
/// is printed unless `silent`.
#[instrument(skip(icons_dir, settings))]
pub fn acquire_icon(
    source: &IconSource,
    slug: &str,
    host: &str,
    icons_dir: &Path,
    settings: &IconSettings,
    silent: bool,
) -> Option<PathBuf> {
    let url = match source {
        IconSource::Url(url) => url.clone(),
        IconSource::Favicon => favicon_url(&settings.favicon_service, host),
        IconSource::None => return None,
    };

    let dest = icon_path(icons_dir, slug);

    if !silent {
        println!("⬇️  Downloading icon from {}...", url);
    }

    match download_icon(&url, &dest, settings) {
        Ok(path) => {
            if !silent {
                println!("🖼️  Icon saved to {}", path.display());
            }
            Some(path)
        }
        Err(error) => {
            warn!(%url, %error, "icon download failed; continuing without icon");
            if !silent {
                println!("⚠️  Failed to download icon: {}", error);
            }
            None
        }
    }
}
