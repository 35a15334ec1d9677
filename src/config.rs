//! Configuration constants and connection profiles for replyline
//!
//! Profiles live in an INI file, one section per profile:
//!
//! ```ini
//! [default]
//! server = https://shop.example.com
//! csrf_token = abc123
//! cookie = sessionid=...; csrftoken=abc123
//! timeout = 30
//! user_agent = replyline/0.1
//! ```

use anyhow::{Context, Result};
use ini::Ini;
use std::path::Path;
use std::time::Duration;

/// Default profile file path for replyline
pub const DEFAULT_PROFILE_PATH: &str = "~/.replyline/profile";

/// Environment variable name for overriding the profile path
pub const PROFILE_PATH_ENV_VAR: &str = "REPLYLINE_PROFILE_PATH";

/// Environment variable holding the log filter
pub const LOG_ENV_VAR: &str = "REPLYLINE_LOG";

/// Request timeout when a profile sets none
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Get the profile file path, checking environment variable first, then falling back to default
pub fn get_profile_path() -> String {
    std::env::var_os(PROFILE_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_PROFILE_PATH.to_string())
}

/// Connection settings for one storefront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Base URL; network actions fail without it
    pub server: Option<String>,
    /// Anti-forgery token used when the page carries none
    pub csrf_token: Option<String>,
    /// Raw `Cookie` header carrying the seller's session
    pub cookie: Option<String>,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Profile {
    /// Profile with nothing configured
    pub fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            server: None,
            csrf_token: None,
            cookie: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

/// Load profile `name` from the INI file at `path`. A missing file or
/// section yields a blank profile.
pub fn load_profile(name: &str, path: &str) -> Result<Profile> {
    let expanded = shellexpand::tilde(path);
    let file = Path::new(expanded.as_ref());
    tracing::debug!("Loading profile '{}' from '{}'", name, file.display());

    if !file.exists() {
        tracing::debug!("Profile file not found, using blank profile");
        return Ok(Profile::blank(name));
    }

    let ini = Ini::load_from_file(file)
        .with_context(|| format!("Failed to read profile file '{}'", file.display()))?;
    let Some(section) = ini.section(Some(name)) else {
        tracing::debug!("Profile '{}' not found, using blank profile", name);
        return Ok(Profile::blank(name));
    };

    let value = |key: &str| {
        section
            .get(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let timeout = match value("timeout") {
        Some(seconds) => Duration::from_secs(seconds.parse().with_context(|| {
            format!("Invalid timeout '{seconds}' in profile '{name}'")
        })?),
        None => DEFAULT_TIMEOUT,
    };

    let profile = Profile {
        name: name.to_string(),
        server: value("server"),
        csrf_token: value("csrf_token"),
        cookie: value("cookie"),
        timeout,
        user_agent: value("user_agent"),
    };
    tracing::debug!("Profile loaded successfully, server: {:?}", profile.server);
    Ok(profile)
}
