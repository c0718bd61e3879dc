use std::{env, path::PathBuf, str::FromStr};

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub data_path: Option<PathBuf>,
    pub share_tolerance: f64,
    pub significant_share: f64,
    pub precision: u32,
    /// Label of the catch-all row excluded from known-entity counts.
    pub unknown_label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 8080,
            data_path: None,
            share_tolerance: 1.0,
            significant_share: 1.0,
            precision: 2,
            unknown_label: "Unknown".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            data_path: lookup("DASHBOARD_DATA_PATH")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            share_tolerance: parsed(&lookup, "DASHBOARD_SHARE_TOLERANCE")
                .filter(|value: &f64| value.is_finite() && *value >= 0.0)
                .unwrap_or(defaults.share_tolerance),
            significant_share: parsed(&lookup, "DASHBOARD_SIGNIFICANT_SHARE")
                .filter(|value: &f64| value.is_finite())
                .unwrap_or(defaults.significant_share),
            precision: parsed(&lookup, "DASHBOARD_PRECISION")
                .filter(|value: &u32| *value <= 6)
                .unwrap_or(defaults.precision),
            unknown_label: defaults.unknown_label,
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_with(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(settings_with(&[]), Settings::default());
    }

    #[test]
    fn values_are_read_from_environment() {
        let settings = settings_with(&[
            ("PORT", "9000"),
            ("DASHBOARD_DATA_PATH", "data/dataset.json"),
            ("DASHBOARD_SHARE_TOLERANCE", "0.5"),
            ("DASHBOARD_SIGNIFICANT_SHARE", "5"),
            ("DASHBOARD_PRECISION", "1"),
        ]);
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.data_path, Some(PathBuf::from("data/dataset.json")));
        assert_eq!(settings.share_tolerance, 0.5);
        assert_eq!(settings.significant_share, 5.0);
        assert_eq!(settings.precision, 1);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let settings = settings_with(&[
            ("PORT", "not-a-port"),
            ("DASHBOARD_DATA_PATH", "  "),
            ("DASHBOARD_SHARE_TOLERANCE", "-3"),
            ("DASHBOARD_PRECISION", "12"),
        ]);
        assert_eq!(settings, Settings::default());
    }
}
