use std::{ffi::OsString, path::PathBuf};

use anyhow::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::{
    configuration::{IconSettings, Layout},
    utils::{normalize_url, slugify},
    webapp::{
        browser::{
            BrowserChoice, detect_browsers, first_or_fallback, parse_browser_choice,
            resolve_command,
        },
        error::WebAppError,
        icon::{IconSource, acquire_icon},
        launcher::write_launcher,
        prompt::{Field, Prompt, resolve_field},
        structs::{BrowserCandidate, WebAppSpec},
    },
};

/// Typed at the icon prompt to request the site's favicon.
const AUTO_ICON_ANSWER: &str = "auto";

/// What the command line supplied for a new web app.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub browser: Option<String>,
    /// Fetch the favicon when no icon URL is given.
    pub auto_icon: bool,
    /// Suppress icon progress and failure messages.
    pub silent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { spec: WebAppSpec, launcher: PathBuf },
    /// The user declined to continue; nothing was written.
    Aborted,
}

/// Everything `create_webapp` reads from its surroundings.
pub struct CreateContext<'a> {
    pub layout: &'a Layout,
    pub icon_settings: &'a IconSettings,
    pub search_path: Option<&'a OsString>,
}

struct CollectedInputs {
    name: String,
    /// Serialized from the parsed URL, so percent-encoded and free of
    /// whitespace control characters.
    url: String,
    host: String,
}

fn parse_app_url(input: &str) -> Result<(String, String), WebAppError> {
    let normalized = normalize_url(input);
    let parsed = Url::parse(&normalized).map_err(|e| WebAppError::InvalidUrl {
        url: normalized.clone(),
        reason: e.to_string(),
    })?;
    let host = parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| WebAppError::InvalidUrl {
            url: normalized.clone(),
            reason: "no host".to_string(),
        })?;

    Ok((parsed.to_string(), host))
}

fn collect_inputs(
    request: &CreateRequest,
    prompt: &mut dyn Prompt,
) -> Result<CollectedInputs, Error> {
    let mut name = None;
    let mut url = None;

    for field in Field::REQUIRED {
        let provided = match field {
            Field::Name => request.name.as_deref(),
            _ => request.url.as_deref(),
        };

        // stop at the first missing required field
        let value = resolve_field(field, provided, prompt)?
            .ok_or(WebAppError::MissingRequiredInput { field: field.key() })?;

        match field {
            Field::Name => name = Some(value),
            _ => url = Some(value),
        }
    }

    let name = name.ok_or(WebAppError::MissingRequiredInput { field: "name" })?;
    if slugify(&name).is_empty() {
        return Err(WebAppError::MissingRequiredInput { field: "name" }.into());
    }
    if name.chars().any(char::is_control) {
        return Err(WebAppError::InvalidInput {
            field: "name",
            reason: "contains control characters".to_string(),
        }
        .into());
    }

    let url = url.ok_or(WebAppError::MissingRequiredInput { field: "url" })?;
    let (url, host) = parse_app_url(&url)?;

    Ok(CollectedInputs { name, url, host })
}

fn resolve_icon_source(
    request: &CreateRequest,
    prompt: &mut dyn Prompt,
) -> Result<IconSource, Error> {
    let answer = if request.icon.is_none() && request.auto_icon {
        None
    } else {
        resolve_field(Field::IconUrl, request.icon.as_deref(), prompt)?
    };

    Ok(match answer {
        Some(a) if a.eq_ignore_ascii_case(AUTO_ICON_ANSWER) => IconSource::Favicon,
        Some(a) => IconSource::Url(a),
        None if request.auto_icon => IconSource::Favicon,
        None => IconSource::None,
    })
}

/// Warns when `candidate` is not on `PATH`; returns whether to go on.
fn confirm_available(
    candidate: &BrowserCandidate,
    search_path: Option<&OsString>,
    prompt: &mut dyn Prompt,
) -> Result<bool, Error> {
    if resolve_command(&candidate.command, search_path).is_some() {
        return Ok(true);
    }

    warn!(command = %candidate.command, "browser not found on PATH");
    println!(
        "⚠️  '{}' ({}) was not found in your PATH.",
        candidate.display_name, candidate.command
    );

    if prompt.is_interactive() {
        prompt.confirm("Do you want to continue anyway?")
    } else {
        Ok(true)
    }
}

fn select_browser(
    detected: &[BrowserCandidate],
    search_path: Option<&OsString>,
    prompt: &mut dyn Prompt,
) -> Result<Option<BrowserCandidate>, Error> {
    println!("\nSelect a browser to launch the web app:");
    for (i, candidate) in detected.iter().enumerate() {
        println!("{}. {}", i + 1, candidate);
    }
    println!("{}. Custom command", detected.len() + 1);

    loop {
        let line = prompt.browser_selection(detected.len() + 1)?;
        match parse_browser_choice(&line, detected) {
            Some(BrowserChoice::Detected(candidate)) => return Ok(Some(candidate)),
            Some(BrowserChoice::Custom) => match prompt.custom_browser()? {
                Some(command) => {
                    let candidate = BrowserCandidate::custom(&command);
                    if confirm_available(&candidate, search_path, prompt)? {
                        return Ok(Some(candidate));
                    }
                    return Ok(None);
                }
                None => println!("A command is required for a custom browser."),
            },
            None => {
                let err = WebAppError::InvalidSelection(line.trim().to_string());
                debug!(%err, "re-prompting for browser");
                println!("{}. Please try again.", err);
            }
        }
    }
}

fn resolve_browser(
    request: &CreateRequest,
    search_path: Option<&OsString>,
    prompt: &mut dyn Prompt,
) -> Result<Option<BrowserCandidate>, Error> {
    if let Some(command) = request.browser.as_deref().filter(|c| !c.trim().is_empty()) {
        let candidate = BrowserCandidate::custom(command);
        debug!(?candidate, "using browser from command line");
        let go_on = confirm_available(&candidate, search_path, prompt)?;
        return Ok(go_on.then_some(candidate));
    }

    let detected = detect_browsers(search_path);

    if prompt.is_interactive() {
        select_browser(&detected, search_path, prompt)
    } else {
        let candidate = first_or_fallback(&detected);
        if detected.is_empty() {
            warn!(command = %candidate.command, "no known browser found; using fallback");
        }
        Ok(Some(candidate))
    }
}

/// CollectInputs → ResolveBrowser → ResolveIcon → WriteLauncher.
#[instrument(skip_all)]
pub fn create_webapp(
    request: &CreateRequest,
    context: &CreateContext<'_>,
    prompt: &mut dyn Prompt,
) -> Result<CreateOutcome, Error> {
    let inputs = collect_inputs(request, prompt)?;
    info!(name = %inputs.name, url = %inputs.url, "collected web app inputs");

    let Some(browser) = resolve_browser(request, context.search_path, prompt)? else {
        info!("user declined to continue without the browser installed");
        return Ok(CreateOutcome::Aborted);
    };
    info!(command = %browser.command, family = ?browser.family, "resolved browser");

    let icon_source = resolve_icon_source(request, prompt)?;
    let icon_path = acquire_icon(
        &icon_source,
        &slugify(&inputs.name),
        &inputs.host,
        &context.layout.icons_dir,
        context.icon_settings,
        request.silent,
    );

    let spec = WebAppSpec {
        name: inputs.name,
        url: inputs.url,
        browser,
        icon_path,
    };

    let launcher = write_launcher(
        &spec,
        &context.layout.applications_dir,
        &context.icon_settings.fallback_icon,
    )?;

    Ok(CreateOutcome::Created { spec, launcher })
}
