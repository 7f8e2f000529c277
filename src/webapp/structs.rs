use std::{fmt, path::PathBuf};

use strum::{EnumIter, IntoEnumIterator};

/// How a browser is told to open a dedicated window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFamily {
    /// `--app=<url>`
    Chromium,
    /// `--new-window <url>`
    Firefox,
}

/// Browsers looked up on `PATH`, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum KnownBrowser {
    GoogleChrome,
    GoogleChromeStable,
    Chromium,
    ChromiumBrowser,
    Brave,
    MicrosoftEdge,
    Vivaldi,
    Opera,
    Firefox,
    FirefoxEsr,
    LibreWolf,
}

impl KnownBrowser {
    pub fn display_name(&self) -> &'static str {
        match self {
            KnownBrowser::GoogleChrome | KnownBrowser::GoogleChromeStable => "Google Chrome",
            KnownBrowser::Chromium | KnownBrowser::ChromiumBrowser => "Chromium",
            KnownBrowser::Brave => "Brave",
            KnownBrowser::MicrosoftEdge => "Microsoft Edge",
            KnownBrowser::Vivaldi => "Vivaldi",
            KnownBrowser::Opera => "Opera",
            KnownBrowser::Firefox => "Firefox",
            KnownBrowser::FirefoxEsr => "Firefox ESR",
            KnownBrowser::LibreWolf => "LibreWolf",
        }
    }

    pub fn command(&self) -> &'static str {
        match self {
            KnownBrowser::GoogleChrome => "google-chrome",
            KnownBrowser::GoogleChromeStable => "google-chrome-stable",
            KnownBrowser::Chromium => "chromium",
            KnownBrowser::ChromiumBrowser => "chromium-browser",
            KnownBrowser::Brave => "brave-browser",
            KnownBrowser::MicrosoftEdge => "microsoft-edge",
            KnownBrowser::Vivaldi => "vivaldi",
            KnownBrowser::Opera => "opera",
            KnownBrowser::Firefox => "firefox",
            KnownBrowser::FirefoxEsr => "firefox-esr",
            KnownBrowser::LibreWolf => "librewolf",
        }
    }

    pub fn family(&self) -> BrowserFamily {
        match self {
            KnownBrowser::Firefox | KnownBrowser::FirefoxEsr | KnownBrowser::LibreWolf => {
                BrowserFamily::Firefox
            }
            _ => BrowserFamily::Chromium,
        }
    }

    pub fn candidate(&self) -> BrowserCandidate {
        BrowserCandidate {
            display_name: self.display_name().to_string(),
            command: self.command().to_string(),
            family: self.family(),
        }
    }

    /// Matches a command or path by its file name, e.g. `/usr/bin/firefox`.
    pub fn from_command(command: &str) -> Option<KnownBrowser> {
        let file_name = command.trim().rsplit('/').next().unwrap_or_default();
        KnownBrowser::iter().find(|browser| browser.command() == file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCandidate {
    pub display_name: String,
    pub command: String,
    pub family: BrowserFamily,
}

impl BrowserCandidate {
    /// A user-supplied command; family comes from the known list when the
    /// file name matches, Chromium otherwise.
    pub fn custom(command: &str) -> Self {
        let command = command.trim();
        match KnownBrowser::from_command(command) {
            Some(known) => BrowserCandidate {
                display_name: known.display_name().to_string(),
                command: command.to_string(),
                family: known.family(),
            },
            None => BrowserCandidate {
                display_name: command.to_string(),
                command: command.to_string(),
                family: BrowserFamily::Chromium,
            },
        }
    }
}

impl fmt::Display for BrowserCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.command)
    }
}

/// Everything needed to write one launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAppSpec {
    pub name: String,
    /// Always carries an `http://` or `https://` scheme.
    pub url: String,
    pub browser: BrowserCandidate,
    pub icon_path: Option<PathBuf>,
}

/// One launcher found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherListing {
    pub name: String,
    pub path: PathBuf,
}
