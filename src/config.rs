//! Process-wide settings threaded into every render request

use crate::document;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_LOCALE: &str = "HTMLSHOT_LOCALE";
pub const ENV_CHROME_PATH: &str = "HTMLSHOT_CHROME_PATH";
pub const ENV_DISK: &str = "HTMLSHOT_DISK";

/// Settings shared by all render requests created from one [`crate::Shooter`]
///
/// The defaults are:
/// - `locale` is `en`
/// - `chrome_path` is unset, letting the renderer find a browser itself
/// - `default_disk` is `local`
///
/// # Examples
///
/// ```
/// let cfg = htmlshot::Config { locale: "pt_BR".into(), ..Default::default() };
/// assert_eq!(cfg.lang(), "pt-BR");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application locale, e.g. `pt_BR`; becomes the document `lang`
    pub locale: String,
    /// Browser executable handed to the renderer
    pub chrome_path: Option<PathBuf>,
    /// Storage disk used by `save` when none is named
    pub default_disk: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: document::DEFAULT_LANG.to_string(),
            chrome_path: None,
            default_disk: "local".to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `HTMLSHOT_LOCALE`, `HTMLSHOT_CHROME_PATH` and
    /// `HTMLSHOT_DISK` when they are set.
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    fn merge_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(locale) = lookup(ENV_LOCALE) {
            self.locale = locale;
        }
        if let Some(path) = lookup(ENV_CHROME_PATH) {
            if path.trim().is_empty() {
                return Err(Error::Config(format!("{ENV_CHROME_PATH} is set but empty")));
            }
            self.chrome_path = Some(PathBuf::from(path));
        }
        if let Some(disk) = lookup(ENV_DISK) {
            if disk.trim().is_empty() {
                return Err(Error::Config(format!("{ENV_DISK} is set but empty")));
            }
            self.default_disk = disk;
        }
        Ok(self)
    }

    /// Document language derived from the locale (`pt_BR` -> `pt-BR`)
    pub fn lang(&self) -> String {
        document::lang_from_locale(&self.locale)
    }
}
