//! `[Desktop Entry]` launcher files for web apps.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::utils::{slugify, url_host};
use crate::webapp::error::WebAppError;
use crate::webapp::structs::{BrowserFamily, WebAppSpec};

pub const LAUNCHER_PREFIX: &str = "webapp-";
pub const LAUNCHER_SUFFIX: &str = ".desktop";

/// Characters that force an `Exec=` argument into double quotes.
const EXEC_RESERVED: &[char] = &[
    ' ', '\t', '\n', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?', '#', '(', ')',
    '`',
];

pub fn launcher_path(applications_dir: &Path, slug: &str) -> PathBuf {
    applications_dir.join(format!("{}{}{}", LAUNCHER_PREFIX, slug, LAUNCHER_SUFFIX))
}

/// Escapes a value of string type: only the backslash needs it once control
/// characters are ruled out.
pub fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\")
}

/// Reverses the `\s`, `\n`, `\t`, `\r` and `\\` escapes of a string value.
pub fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

/// One `Exec=` argument: `%` doubled so it is not read as a field code, and
/// quoted when it holds a reserved character.
fn exec_argument(arg: &str) -> String {
    let arg = arg.replace('%', "%%");
    if !arg.contains(EXEC_RESERVED) {
        return arg;
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');

    escape_value(&quoted)
}

/// Command line that opens `url` in its own window. `command` is kept as
/// typed so it may carry its own arguments.
pub fn exec_line(command: &str, family: BrowserFamily, url: &str) -> String {
    let command = command.replace('%', "%%");
    match family {
        BrowserFamily::Firefox => format!("{} --new-window {}", command, exec_argument(url)),
        BrowserFamily::Chromium => {
            format!("{} {}", command, exec_argument(&format!("--app={}", url)))
        }
    }
}

fn reject_control(field: &'static str, value: &str) -> Result<(), WebAppError> {
    if value.chars().any(char::is_control) {
        return Err(WebAppError::InvalidInput {
            field,
            reason: "contains control characters".to_string(),
        });
    }
    Ok(())
}

/// Checks that every value of `spec` fits on a single key line.
pub fn validate_spec(spec: &WebAppSpec) -> Result<(), WebAppError> {
    if spec.name.trim().is_empty() || slugify(&spec.name).is_empty() {
        return Err(WebAppError::MissingRequiredInput { field: "name" });
    }
    if spec.url.trim().is_empty() {
        return Err(WebAppError::MissingRequiredInput { field: "url" });
    }
    if spec.browser.command.trim().is_empty() {
        return Err(WebAppError::MissingRequiredInput { field: "browser" });
    }

    reject_control("name", &spec.name)?;
    reject_control("url", &spec.url)?;
    reject_control("browser", &spec.browser.command)?;
    if let Some(icon) = &spec.icon_path {
        reject_control("icon", &icon.to_string_lossy())?;
    }

    Ok(())
}

/// A web app launcher as written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    /// Entry name (shown in menus).
    pub name: String,
    pub exec: String,
    /// Used by the window manager to group the app's windows.
    pub startup_wm_class: String,
    /// Icon name or absolute path.
    pub icon: String,
}

impl DesktopEntry {
    /// Builds the entry for `spec`, using `fallback_icon` when no icon was installed.
    pub fn for_spec(spec: &WebAppSpec, fallback_icon: &str) -> Self {
        let icon = spec
            .icon_path
            .as_ref()
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_else(|| fallback_icon.to_string());

        DesktopEntry {
            name: spec.name.clone(),
            exec: exec_line(&spec.browser.command, spec.browser.family, &spec.url),
            startup_wm_class: url_host(&spec.url).unwrap_or_default(),
            icon,
        }
    }

    /// Field order matters to some menu implementations; keep it fixed.
    pub fn to_string(&self) -> String {
        let mut content = String::new();
        let name = escape_value(&self.name);

        // writing into a String cannot fail
        let _ = writeln!(content, "[Desktop Entry]");
        let _ = writeln!(content, "Version=1.0");
        let _ = writeln!(content, "Name={}", name);
        let _ = writeln!(content, "Comment=Web App for {}", name);
        let _ = writeln!(content, "Exec={}", self.exec);
        let _ = writeln!(content, "StartupWMClass={}", self.startup_wm_class);
        let _ = writeln!(content, "Terminal=false");
        let _ = writeln!(content, "Type=Application");
        let _ = writeln!(content, "Categories=Network;WebBrowser;");
        let _ = writeln!(content, "StartupNotify=true");
        let _ = writeln!(content, "Icon={}", self.icon);

        content
    }

    /// Write the entry to `path`, replacing any existing file, and mark it executable.
    pub fn write_to_file(&self, path: &Path) -> Result<(), WebAppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                WebAppError::filesystem("create applications directory", parent, e)
            })?;
        }

        let mut file = fs::File::create(path)
            .map_err(|e| WebAppError::filesystem("create launcher file", path, e))?;

        file.write_all(self.to_string().as_bytes())
            .map_err(|e| WebAppError::filesystem("write launcher file", path, e))?;

        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|e| WebAppError::filesystem("mark launcher executable", path, e))?;

        debug!("Wrote desktop entry to {:?}", path);

        Ok(())
    }
}

/// Writes the launcher for `spec` into `applications_dir` and returns its path.
#[instrument(skip(spec, applications_dir), fields(name = %spec.name))]
pub fn write_launcher(
    spec: &WebAppSpec,
    applications_dir: &Path,
    fallback_icon: &str,
) -> Result<PathBuf, WebAppError> {
    validate_spec(spec)?;

    let path = launcher_path(applications_dir, &slugify(&spec.name));
    DesktopEntry::for_spec(spec, fallback_icon).write_to_file(&path)?;

    info!(path = %path.display(), "launcher written");
    Ok(path)
}
