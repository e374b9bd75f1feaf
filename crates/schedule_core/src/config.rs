use crate::error::ConfigError;

pub const MIN_FILL_VAR: &str = "SCHEDULE_MIN_FILL";
pub const PRELOAD_ITEMS_VAR: &str = "SCHEDULE_PRELOAD_ITEMS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// Occurrences pulled per side while seeding.
    pub min_fill: usize,
    /// Distance, in position units, from an edge at which extension starts.
    pub preload_items: i64,
}

impl WindowConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(MIN_FILL_VAR) {
            config.min_fill = parse_positive(MIN_FILL_VAR, &raw)?;
        }
        if let Some(raw) = lookup(PRELOAD_ITEMS_VAR) {
            let value = parse_positive(PRELOAD_ITEMS_VAR, &raw)?;
            config.preload_items = i64::try_from(value).map_err(|_| ConfigError::InvalidValue {
                key: PRELOAD_ITEMS_VAR,
                value: raw.clone(),
            })?;
        }
        Ok(config)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            min_fill: 8,
            preload_items: 12,
        }
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
