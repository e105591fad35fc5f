use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use which::which;

/// Chromium launch configuration.
///
/// The user data dir carries login state across runs; authentication is
/// established out of band and simply reused here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageConfig {
    /// Run without a visible window.
    pub headless: bool,
    /// Persistent profile directory. Defaults to
    /// `~/.uitrail/profiles/default`.
    pub user_data_dir: Option<PathBuf>,
    /// Explicit Chrome/Chromium binary. Discovered on PATH when unset.
    pub chrome_binary: Option<PathBuf>,
    /// Viewport width in pixels.
    pub window_width: u32,
    /// Viewport height in pixels.
    pub window_height: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_data_dir: None,
            chrome_binary: None,
            window_width: 1440,
            window_height: 900,
        }
    }
}

impl PageConfig {
    pub fn headless(mut self, enabled: bool) -> Self {
        self.headless = enabled;
        self
    }

    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    pub fn chrome_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_binary = Some(path.into());
        self
    }

    /// Resolve the profile directory, falling back to the home-relative
    /// default.
    pub fn resolve_user_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.user_data_dir {
            return dir.clone();
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".uitrail")
            .join("profiles")
            .join("default")
    }

    /// Locate the browser binary: explicit setting first, then PATH.
    pub fn resolve_chrome_binary(&self) -> Option<PathBuf> {
        if let Some(path) = &self.chrome_binary {
            return Some(path.clone());
        }
        for name in [
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which(name) {
                return Some(path);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_dir_is_home_relative() {
        let cfg = PageConfig::default();
        let dir = cfg.resolve_user_data_dir();
        assert!(dir.ends_with(".uitrail/profiles/default"));
    }

    #[test]
    fn explicit_dirs_win() {
        let cfg = PageConfig::default()
            .user_data_dir("/tmp/profile")
            .chrome_binary("/opt/chrome");
        assert_eq!(cfg.resolve_user_data_dir(), PathBuf::from("/tmp/profile"));
        assert_eq!(
            cfg.resolve_chrome_binary(),
            Some(PathBuf::from("/opt/chrome"))
        );
    }
}
