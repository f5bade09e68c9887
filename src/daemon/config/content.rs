use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

/// Name of the offline cache used when none is configured.
pub const DEFAULT_CACHE_NAME: &str = "countdown-pwa";

/// Paths stored in the offline cache when it is first installed.
pub const DEFAULT_MANIFEST: &[&str] = &[
    "/",
    "/icons/android-chrome-192x192.png",
    "/icons/android-chrome-512x512.png",
    "/icons/apple-touch-icon.png",
    "/icons/favicon-16x16.png",
    "/icons/favicon-32x32.png",
    "/icons/safari-pinned-tab.svg",
    "/styles/base.css",
    "/styles/components.css",
    "/styles/dialog.css",
    "/styles/index.css",
    "/favicon.ico",
    "/index.html",
    "/main.js",
    "/manifest.json",
];

/// Whole content of the daemon's configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Configuration {
    pub notification: NotificationContent,
    #[serde(default)]
    pub web: WebContent,
    #[serde(default)]
    pub runtime: RuntimeContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationContent {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub remaining: MessageContent,
    pub expired: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageContent {
    pub summary: String,
    pub body: Option<String>,
}

/// The optional HTTP front. It is disabled unless `address` is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebContent {
    pub address: Option<SocketAddr>,
    pub root: Option<PathBuf>,
    #[serde(default = "default_cache")]
    pub cache: String,
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,
}

impl Default for WebContent {
    fn default() -> Self {
        Self {
            address: None,
            root: None,
            cache: default_cache(),
            manifest: default_manifest(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuntimeContent {
    pub socket: Option<PathBuf>,
    pub pid: Option<PathBuf>,
    pub state: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_cache() -> String {
    DEFAULT_CACHE_NAME.to_owned()
}

fn default_manifest() -> Vec<String> {
    DEFAULT_MANIFEST.iter().map(|path| (*path).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::daemon::config::reader::DEFAULT_CONTENT;

    #[test]
    fn configuration_default_content() {
        let config: Configuration = toml::from_str(DEFAULT_CONTENT).unwrap();
        assert!(config.notification.enabled);
        assert_eq!(config.notification.remaining.summary, "{remaining} left");
        assert_eq!(config.web, WebContent::default());
        assert_eq!(config.web.manifest.len(), 15);
        assert_eq!(config.runtime, RuntimeContent::default());
    }

    #[test]
    fn configuration_custom_content() {
        let text = r#"
            [notification]
            enabled = false

            [notification.remaining]
            summary = "Hurry"

            [notification.expired]
            summary = "Done"
            body = "Countdown to {end} is over."

            [web]
            address = "127.0.0.1:8080"
            root = "/srv/countdown"
            manifest = ["/", "/main.js"]

            [runtime]
            state = "/tmp/state.toml"
        "#;

        let config: Configuration = toml::from_str(text).unwrap();
        assert!(!config.notification.enabled);
        assert_eq!(config.notification.remaining.body, None);
        assert_eq!(
            config.web.address,
            Some("127.0.0.1:8080".parse().unwrap())
        );
        assert_eq!(config.web.cache, DEFAULT_CACHE_NAME);
        assert_eq!(config.web.manifest, vec!["/", "/main.js"]);
        assert_eq!(config.runtime.state, Some(PathBuf::from("/tmp/state.toml")));
        assert_eq!(config.runtime.socket, None);
    }

    #[test]
    fn configuration_missing_notification() {
        assert!(toml::from_str::<Configuration>("[web]\n").is_err());
    }
}
