//! Registry of known application entry points.
//!
//! The loop never guesses URLs; a task either names a known app or the
//! caller supplies an explicit start URL.

pub const KNOWN_APPS: &[(&str, &str)] = &[
    ("linear", "https://linear.app"),
    ("notion", "https://www.notion.so"),
    ("outlook", "https://outlook.office.com/mail/"),
];

/// Start URL for a known app name (case-insensitive).
pub fn start_url_for(app_name: &str) -> Option<&'static str> {
    let needle = app_name.to_lowercase();
    KNOWN_APPS
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, url)| *url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_apps_resolve() {
        assert_eq!(start_url_for("linear"), Some("https://linear.app"));
        assert_eq!(start_url_for("Linear"), Some("https://linear.app"));
        assert_eq!(start_url_for("outlook"), Some("https://outlook.office.com/mail/"));
    }

    #[test]
    fn unknown_app_is_none() {
        assert!(start_url_for("jira").is_none());
    }
}
