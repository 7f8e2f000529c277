use std::{
    env,
    ffi::OsString,
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

use crate::webapp::structs::{BrowserCandidate, KnownBrowser};

/// Used when nothing on `PATH` matches. Not verified to exist.
pub const FALLBACK_BROWSER: KnownBrowser = KnownBrowser::GoogleChrome;

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Resolves a bare command against `search_path`; commands containing a `/`
/// are checked as-is.
pub fn resolve_command(command: &str, search_path: Option<&OsString>) -> Option<PathBuf> {
    let command = command.trim();
    if command.is_empty() {
        return None;
    }

    if command.contains('/') {
        let path = PathBuf::from(command);
        return is_executable(&path).then_some(path);
    }

    let search_path = search_path?;
    env::split_paths(search_path)
        .map(|dir| dir.join(command))
        .find(|candidate| is_executable(candidate))
}

/// Known browsers present on `search_path`, in preference order.
#[instrument(skip(search_path))]
pub fn detect_browsers(search_path: Option<&OsString>) -> Vec<BrowserCandidate> {
    let detected: Vec<BrowserCandidate> = KnownBrowser::iter()
        .filter(|browser| {
            let found = resolve_command(browser.command(), search_path);
            debug!(command = browser.command(), found = ?found, "looked up browser");
            found.is_some()
        })
        .map(|browser| browser.candidate())
        .collect();

    info!(count = detected.len(), "detected installed browsers");
    detected
}

pub fn first_or_fallback(detected: &[BrowserCandidate]) -> BrowserCandidate {
    detected
        .first()
        .cloned()
        .unwrap_or_else(|| FALLBACK_BROWSER.candidate())
}

/// Outcome of one line typed at the browser menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserChoice {
    Detected(BrowserCandidate),
    Custom,
}

/// Accepts `1..=detected.len()` for a detected browser and
/// `detected.len() + 1` for the custom command option.
pub fn parse_browser_choice(input: &str, detected: &[BrowserCandidate]) -> Option<BrowserChoice> {
    let index: usize = input.trim().parse().ok()?;

    match index {
        0 => None,
        i if i <= detected.len() => Some(BrowserChoice::Detected(detected[i - 1].clone())),
        i if i == detected.len() + 1 => Some(BrowserChoice::Custom),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webapp::structs::BrowserFamily;
    use std::fs::File;
    use tempfile::TempDir;

    fn fake_binary(dir: &Path, name: &str, mode: u32) {
        let path = dir.join(name);
        File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn detects_executables_in_list_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fake_binary(first.path(), "firefox", 0o755);
        fake_binary(second.path(), "chromium", 0o755);
        fake_binary(second.path(), "vivaldi", 0o644);

        let search_path = env::join_paths([first.path(), second.path()]).unwrap();
        let detected = detect_browsers(Some(&search_path));

        let commands: Vec<_> = detected.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(commands, vec!["chromium", "firefox"]);
        assert_eq!(detected[1].family, BrowserFamily::Firefox);
    }

    #[test]
    fn nothing_detected_without_path() {
        assert!(detect_browsers(None).is_empty());
    }

    #[test]
    fn directories_are_not_executables() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("brave-browser")).unwrap();

        let search_path = OsString::from(dir.path());
        assert!(detect_browsers(Some(&search_path)).is_empty());
    }

    #[test]
    fn fallback_when_none_detected() {
        let fallback = first_or_fallback(&[]);
        assert_eq!(fallback.command, "google-chrome");
        assert_eq!(fallback.family, BrowserFamily::Chromium);

        let brave = KnownBrowser::Brave.candidate();
        assert_eq!(first_or_fallback(std::slice::from_ref(&brave)), brave);
    }

    #[test]
    fn absolute_command_is_checked_directly() {
        let dir = TempDir::new().unwrap();
        fake_binary(dir.path(), "mybrowser", 0o755);
        let command = dir.path().join("mybrowser");

        assert_eq!(resolve_command(command.to_str().unwrap(), None), Some(command.clone()));
        assert_eq!(resolve_command("/definitely/not/here", None), None);
    }

    #[test]
    fn menu_choices_are_one_based() {
        let detected = vec![KnownBrowser::Chromium.candidate(), KnownBrowser::Firefox.candidate()];

        assert_eq!(
            parse_browser_choice("1", &detected),
            Some(BrowserChoice::Detected(KnownBrowser::Chromium.candidate()))
        );
        assert_eq!(
            parse_browser_choice(" 2 ", &detected),
            Some(BrowserChoice::Detected(KnownBrowser::Firefox.candidate()))
        );
        assert_eq!(parse_browser_choice("3", &detected), Some(BrowserChoice::Custom));
        assert_eq!(parse_browser_choice("0", &detected), None);
        assert_eq!(parse_browser_choice("4", &detected), None);
        assert_eq!(parse_browser_choice("chrome", &detected), None);
        assert_eq!(parse_browser_choice("", &detected), None);
    }

    #[test]
    fn custom_is_the_only_choice_when_nothing_detected() {
        assert_eq!(parse_browser_choice("1", &[]), Some(BrowserChoice::Custom));
    }
}
