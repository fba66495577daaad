use std::env;

pub const DEFAULT_CLIENT_NAME: &str = "WEB";
pub const DEFAULT_CLIENT_VERSION: &str = "2.20250108.06.00";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15";

/// Session-wide settings read by every request.
///
/// The client hands each call its own snapshot, so replacing the config while
/// requests are in flight never changes what those requests see.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub cookies: String,
    pub language: String,
    pub region: String,
    pub visitor_data: Option<String>,
    pub always_use_cookies: bool,
    pub client_name: String,
    pub client_version: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            cookies: String::new(),
            language: "en".to_string(),
            region: "US".to_string(),
            visitor_data: None,
            always_use_cookies: false,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads `.env` if present and overrides defaults from `YTK_*` variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = ClientConfig::default();

        if let Ok(cookies) = env::var("YTK_COOKIES") {
            config.cookies = cookies;
        }
        if let Ok(language) = env::var("YTK_LANGUAGE") {
            config.language = language;
        }
        if let Ok(region) = env::var("YTK_REGION") {
            config.region = region;
        }
        if let Ok(visitor_data) = env::var("YTK_VISITOR_DATA") {
            config.visitor_data = Some(visitor_data).filter(|v| !v.is_empty());
        }
        if let Ok(flag) = env::var("YTK_ALWAYS_USE_COOKIES") {
            config.always_use_cookies = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        config
    }

    pub fn has_cookies(&self) -> bool {
        !self.cookies.trim().is_empty()
    }

    /// `SAPISID` (or `__Secure-3PAPISID`) value, used to sign authenticated calls.
    pub fn sapisid(&self) -> Option<&str> {
        let mut fallback = None;
        for pair in self.cookies.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            match name {
                "SAPISID" => return Some(value),
                "__Secure-3PAPISID" => fallback = Some(value),
                _ => {}
            }
        }
        fallback
    }
}

/// Reads `YTK_LOG_CAPACITY`; `None` when unset or unparsable.
pub fn log_capacity_from_env() -> Option<usize> {
    env::var("YTK_LOG_CAPACITY").ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sapisid_lookup() {
        let config = ClientConfig {
            cookies: "PREF=f6=40000000; __Secure-3PAPISID=fallback; SAPISID=abc/def".to_string(),
            ..Default::default()
        };
        assert_eq!(config.sapisid(), Some("abc/def"));

        let config = ClientConfig {
            cookies: "__Secure-3PAPISID=fallback".to_string(),
            ..Default::default()
        };
        assert_eq!(config.sapisid(), Some("fallback"));
        assert_eq!(ClientConfig::default().sapisid(), None);
    }

    #[test]
    fn test_has_cookies_ignores_whitespace() {
        let config = ClientConfig {
            cookies: "  ".to_string(),
            ..Default::default()
        };
        assert!(!config.has_cookies());
    }
}
