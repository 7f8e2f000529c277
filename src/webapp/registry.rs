use std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    utils::slugify,
    webapp::{
        error::WebAppError,
        icon::icon_path,
        launcher::{LAUNCHER_PREFIX, LAUNCHER_SUFFIX, unescape_value},
        prompt::Prompt,
        structs::LauncherListing,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRemoval {
    Removed(PathBuf),
    NotFound(PathBuf),
    Failed { path: PathBuf, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed { launcher: LauncherListing, icon: IconRemoval },
    Cancelled,
}

fn launcher_slug(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(LAUNCHER_PREFIX)
        .and_then(|rest| rest.strip_suffix(LAUNCHER_SUFFIX))
}

fn read_name(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .find_map(|line| line.strip_prefix("Name=").map(|name| unescape_value(name.trim())))
}

/// Launchers created by this tool, in directory order. A missing directory
/// lists as empty.
#[instrument]
pub fn list_entries(applications_dir: &Path) -> Result<Vec<LauncherListing>, WebAppError> {
    let read_dir = match fs::read_dir(applications_dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("applications directory does not exist yet");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(WebAppError::filesystem(
                "read applications directory",
                applications_dir,
                e,
            ));
        }
    };

    let mut entries = Vec::new();
    for entry in read_dir.flatten() {
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(slug) = launcher_slug(file_name) else {
            continue;
        };
        if !path.is_file() {
            continue;
        }

        let name = read_name(&path).unwrap_or_else(|| slug.to_string());
        entries.push(LauncherListing { name, path });
    }

    info!(count = entries.len(), "listed web app launchers");
    Ok(entries)
}

/// Removes the launcher chosen by a 1-based `selection` and its same-slug icon.
/// Empty, non-numeric or out-of-range selections cancel without touching disk.
#[instrument(skip(listing))]
pub fn remove_entry(
    listing: &[LauncherListing],
    selection: &str,
    icons_dir: &Path,
) -> Result<RemoveOutcome, WebAppError> {
    let index = match selection.trim().parse::<usize>() {
        Ok(i) if (1..=listing.len()).contains(&i) => i,
        _ => {
            let err = WebAppError::InvalidSelection(selection.trim().to_string());
            debug!(%err, "cancelling removal");
            return Ok(RemoveOutcome::Cancelled);
        }
    };

    let launcher = listing[index - 1].clone();
    fs::remove_file(&launcher.path)
        .map_err(|e| WebAppError::filesystem("remove launcher", &launcher.path, e))?;
    info!(path = %launcher.path.display(), "removed launcher");

    let icon = icon_path(icons_dir, &slugify(&launcher.name));
    let icon = if !icon.exists() {
        IconRemoval::NotFound(icon)
    } else {
        match fs::remove_file(&icon) {
            Ok(()) => {
                info!(path = %icon.display(), "removed icon");
                IconRemoval::Removed(icon)
            }
            Err(e) => {
                warn!(path = %icon.display(), error = %e, "failed to remove icon");
                IconRemoval::Failed { path: icon, error: e.to_string() }
            }
        }
    };

    Ok(RemoveOutcome::Removed { launcher, icon })
}

pub fn print_listing(listing: &[LauncherListing]) {
    if listing.is_empty() {
        println!("ℹ️  No web apps found.");
        return;
    }

    println!("📋 Installed web apps:");
    for (i, entry) in listing.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, entry.name, entry.path.display());
    }
    println!();
}

/// ListEntries → (optional) RemoveSelected.
pub fn list_and_remove(
    applications_dir: &Path,
    icons_dir: &Path,
    prompt: &mut dyn Prompt,
) -> Result<RemoveOutcome, Error> {
    let listing = list_entries(applications_dir)?;
    print_listing(&listing);

    if listing.is_empty() {
        return Ok(RemoveOutcome::Cancelled);
    }

    let selection = prompt.removal_selection(listing.len())?;
    let outcome = remove_entry(&listing, &selection, icons_dir)?;

    match &outcome {
        RemoveOutcome::Removed { launcher, icon } => {
            println!("🧹 Removed {} ({})", launcher.name, launcher.path.display());
            match icon {
                IconRemoval::Removed(path) => println!("🧹 Removed icon {}", path.display()),
                IconRemoval::NotFound(path) => {
                    println!("ℹ️  No icon found at {}", path.display())
                }
                IconRemoval::Failed { path, error } => {
                    println!("⚠️  Could not remove icon {}: {}", path.display(), error)
                }
            }
        }
        RemoveOutcome::Cancelled => println!("ℹ️  Nothing removed."),
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webapp::{
        launcher::write_launcher,
        prompt::testing::ScriptedPrompt,
        structs::{KnownBrowser, WebAppSpec},
    };
    use tempfile::TempDir;

    struct Fixture {
        _root: TempDir,
        apps: PathBuf,
        icons: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = TempDir::new().unwrap();
        let apps = root.path().join("applications");
        let icons = root.path().join("icons");
        fs::create_dir_all(&apps).unwrap();
        fs::create_dir_all(&icons).unwrap();
        Fixture { _root: root, apps, icons }
    }

    fn create(fixture: &Fixture, name: &str, with_icon: bool) -> PathBuf {
        let icon_path = with_icon.then(|| {
            let path = icon_path(&fixture.icons, &slugify(name));
            fs::write(&path, b"png").unwrap();
            path
        });
        let spec = WebAppSpec {
            name: name.to_string(),
            url: "https://example.com".to_string(),
            browser: KnownBrowser::Chromium.candidate(),
            icon_path,
        };
        write_launcher(&spec, &fixture.apps, "web-browser").unwrap()
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let fixture = fixture();
        assert!(list_entries(&fixture.apps).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let fixture = fixture();
        assert!(list_entries(&fixture.apps.join("absent")).unwrap().is_empty());
    }

    #[test]
    fn lists_only_webapp_launchers() {
        let fixture = fixture();
        let path = create(&fixture, "My App!", false);
        fs::write(fixture.apps.join("firefox.desktop"), "[Desktop Entry]\nName=Firefox\n").unwrap();
        fs::write(fixture.apps.join("webapp-notes.txt"), "Name=Notes\n").unwrap();

        let entries = list_entries(&fixture.apps).unwrap();

        assert_eq!(entries, vec![LauncherListing { name: "My App!".to_string(), path }]);
    }

    #[test]
    fn listed_name_is_unescaped() {
        let fixture = fixture();
        create(&fixture, r"C:\Drive", false);

        let entries = list_entries(&fixture.apps).unwrap();

        assert_eq!(entries[0].name, r"C:\Drive");
    }

    #[test]
    fn missing_name_falls_back_to_slug() {
        let fixture = fixture();
        fs::write(fixture.apps.join("webapp-orphan.desktop"), "[Desktop Entry]\nExec=x\n").unwrap();

        let entries = list_entries(&fixture.apps).unwrap();

        assert_eq!(entries[0].name, "orphan");
    }

    #[test]
    fn remove_deletes_launcher_and_icon() {
        let fixture = fixture();
        let launcher = create(&fixture, "Mail", true);
        let icon = icon_path(&fixture.icons, "mail");

        let listing = list_entries(&fixture.apps).unwrap();
        let outcome = remove_entry(&listing, "1", &fixture.icons).unwrap();

        assert!(!launcher.exists());
        assert!(!icon.exists());
        assert!(matches!(outcome, RemoveOutcome::Removed { icon: IconRemoval::Removed(_), .. }));
    }

    #[test]
    fn remove_deletes_only_the_selected_entry() {
        let fixture = fixture();
        create(&fixture, "One", true);
        create(&fixture, "Two", true);

        let listing = list_entries(&fixture.apps).unwrap();
        let target = listing[0].clone();
        remove_entry(&listing, "1", &fixture.icons).unwrap();

        let remaining = list_entries(&fixture.apps).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_ne!(remaining[0].name, target.name);
        assert!(icon_path(&fixture.icons, &slugify(&remaining[0].name)).exists());
        assert!(!icon_path(&fixture.icons, &slugify(&target.name)).exists());
    }

    #[test]
    fn missing_icon_is_reported_not_fatal() {
        let fixture = fixture();
        let launcher = create(&fixture, "Plain", false);

        let listing = list_entries(&fixture.apps).unwrap();
        let outcome = remove_entry(&listing, "1", &fixture.icons).unwrap();

        assert!(!launcher.exists());
        assert!(matches!(outcome, RemoveOutcome::Removed { icon: IconRemoval::NotFound(_), .. }));
    }

    #[test]
    fn invalid_selection_deletes_nothing() {
        let fixture = fixture();
        let launcher = create(&fixture, "Keep", true);
        let listing = list_entries(&fixture.apps).unwrap();

        for selection in ["0", "2", "-1", "abc", "", "1.0"] {
            let outcome = remove_entry(&listing, selection, &fixture.icons).unwrap();
            assert_eq!(outcome, RemoveOutcome::Cancelled);
        }

        assert!(launcher.exists());
        assert!(icon_path(&fixture.icons, "keep").exists());
    }

    #[test]
    fn interactive_removal_uses_typed_index() {
        let fixture = fixture();
        let launcher = create(&fixture, "Only", true);
        let mut prompt = ScriptedPrompt::new(&["1"]);

        let outcome = list_and_remove(&fixture.apps, &fixture.icons, &mut prompt).unwrap();

        assert!(matches!(outcome, RemoveOutcome::Removed { .. }));
        assert!(!launcher.exists());
    }

    #[test]
    fn empty_listing_does_not_prompt() {
        let fixture = fixture();
        let mut prompt = ScriptedPrompt::new(&[]);

        let outcome = list_and_remove(&fixture.apps, &fixture.icons, &mut prompt).unwrap();

        assert_eq!(outcome, RemoveOutcome::Cancelled);
        assert!(prompt.asked.is_empty());
    }

    #[test]
    fn selection_on_empty_listing_cancels() {
        let fixture = fixture();
        assert_eq!(remove_entry(&[], "1", &fixture.icons).unwrap(), RemoveOutcome::Cancelled);
    }
}
