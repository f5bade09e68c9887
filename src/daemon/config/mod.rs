mod content;
mod reader;

use std::path::Path;

pub use content::{
    Configuration, MessageContent, NotificationContent, RuntimeContent, WebContent,
    DEFAULT_CACHE_NAME, DEFAULT_MANIFEST,
};
pub use reader::ReadContentError;

use snafu::prelude::*;
use toml::de::Error as DeError;

use crate::utils::xdg::{Xdg, XdgBaseKind, XdgError};

use reader::ContentReader;

const CONFIG_FILE: &str = "config.toml";

/// An error type for loading the configuration.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum LoadConfigurationError {
    #[snafu(display("Could not locate configuration in XDG directories"))]
    XdgConfig { source: XdgError },
    #[snafu(display("Could not read configuration file"))]
    Read { source: ReadContentError },
    #[snafu(display("Configuration is invalid"))]
    Parse { source: DeError },
}

/// Parse a TOML document. The `[notification]` section with its `remaining`
/// and `expired` messages is required; other sections and keys left out take
/// their defaults.
///
/// # Errors
///
/// This function will return an error if `content` is not valid TOML, a
/// value has the wrong type or the notification messages are missing.
pub fn parse(content: &str) -> Result<Configuration, LoadConfigurationError> {
    toml::from_str(content).context(ParseSnafu)
}

/// Load the configuration at a path given by the user. The file must exist.
///
/// # Errors
///
/// This function will return an error if the file is missing, unreadable or
/// invalid.
pub fn load_with_path<P: AsRef<Path>>(path: P) -> Result<Configuration, LoadConfigurationError> {
    let content = ContentReader::existing(path.as_ref()).read().context(ReadSnafu)?;
    parse(&content)
}

/// Load `config.toml` from the XDG configuration directory of `app_name`. On
/// first use the file is written from the commented template.
///
/// # Errors
///
/// This function will return an error if the directory is not usable or the
/// file is unreadable or invalid.
pub fn load_with_xdg(app_name: &str) -> Result<Configuration, LoadConfigurationError> {
    let xdg = Xdg::new(app_name).context(XdgConfigSnafu)?;
    let path = xdg
        .resolve_create(XdgBaseKind::Config, CONFIG_FILE)
        .context(XdgConfigSnafu)?;

    let content = ContentReader::or_template(path).read().context(ReadSnafu)?;
    parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn parse_template() {
        let config = parse(reader::DEFAULT_CONTENT).unwrap();
        assert!(config.notification.enabled);
        assert_eq!(config.notification.expired.summary, "Time is up");
        assert!(config.web.address.is_none());
        assert!(config.runtime.socket.is_none());
    }

    #[test]
    fn parse_error_wrong_type() {
        assert!(matches!(
            parse("[notification]\nenabled = \"yes\"\n"),
            Err(LoadConfigurationError::Parse { .. })
        ));
    }

    #[test]
    fn parse_error_missing_notification() {
        assert!(matches!(
            parse("[web]\naddress = \"127.0.0.1:8080\"\n"),
            Err(LoadConfigurationError::Parse { .. })
        ));
    }

    #[test]
    fn load_with_path_custom_web() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("countdown.toml");
        let mut content = reader::DEFAULT_CONTENT.to_owned();
        content.push_str("\n[web]\naddress = \"127.0.0.1:8080\"\n");
        file.write_str(&content).unwrap();

        let config = load_with_path(file.path()).unwrap();
        assert_eq!(
            config.web.address,
            Some("127.0.0.1:8080".parse().unwrap())
        );
        assert_eq!(config.web.cache, DEFAULT_CACHE_NAME);
    }

    #[test]
    fn load_with_path_missing() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("config.toml");

        assert!(matches!(
            load_with_path(file.path()),
            Err(LoadConfigurationError::Read {
                source: ReadContentError::NotFound { .. }
            })
        ));
        file.assert(predicates::path::missing());
    }
}
