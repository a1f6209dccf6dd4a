use bgl_api::ApiError;
use bgl_api::client::DEFAULT_API_URL;
use log::LevelFilter;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TOTAL_WEEKS: u32 = 4;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_url: String,
    pub total_weeks: u32,
    pub cache_ttl: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_url: DEFAULT_API_URL.to_string(),
            total_weeks: DEFAULT_TOTAL_WEEKS,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl AppSettings {
    /// Read settings from `BGL_*` environment variables.
    pub fn load() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut settings = Self::default();

        if let Some(url) = lookup("BGL_API_URL") {
            // Validated when the client is built.
            settings.api_url = url;
        }
        if let Some(raw) = lookup("BGL_TOTAL_WEEKS") {
            settings.total_weeks = parse_positive("BGL_TOTAL_WEEKS", &raw)?;
        }
        if let Some(raw) = lookup("BGL_CACHE_TTL_SECS") {
            let secs = parse_positive("BGL_CACHE_TTL_SECS", &raw)?;
            settings.cache_ttl = Duration::from_secs(u64::from(secs));
        }
        if let Some(raw) = lookup("BGL_LOG_LEVEL")
            && !raw.trim().is_empty()
        {
            let level = LevelFilter::from_str(raw.trim())
                .map_err(|_| ApiError::Config(format!("BGL_LOG_LEVEL: unknown level {raw:?}")))?;
            settings.log_level = Some(level);
        }

        Ok(settings)
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<u32, ApiError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ApiError::Config(format!(
            "{name} must be a positive integer, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgl_api::ErrorKind;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<AppSettings, ApiError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.total_weeks, 4);
        assert_eq!(settings.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn environment_overrides_are_parsed() {
        let settings = settings_from(&[
            ("BGL_API_URL", "http://localhost:9000/exec"),
            ("BGL_TOTAL_WEEKS", "6"),
            ("BGL_CACHE_TTL_SECS", "30"),
            ("BGL_LOG_LEVEL", "debug"),
        ])
        .unwrap();
        assert_eq!(settings.api_url, "http://localhost:9000/exec");
        assert_eq!(settings.total_weeks, 6);
        assert_eq!(settings.cache_ttl, Duration::from_secs(30));
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        for (key, value) in [
            ("BGL_TOTAL_WEEKS", "0"),
            ("BGL_TOTAL_WEEKS", "four"),
            ("BGL_CACHE_TTL_SECS", "-5"),
            ("BGL_LOG_LEVEL", "loud"),
        ] {
            let err = settings_from(&[(key, value)]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{key}={value}");
        }
    }
}
