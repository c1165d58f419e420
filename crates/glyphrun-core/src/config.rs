//! Outline cache configuration
//!
//! The outline cache is unbounded by default: every glyph outline stays
//! until the variable location changes. Long-running applications that
//! walk through many glyphs can cap it per layer mode, either in code or
//! with the `GLYPHRUN_OUTLINE_CACHE_CAPACITY` environment variable.
//!
//! # Example
//!
//! ```
//! use glyphrun_core::OutlineCacheConfig;
//!
//! let config = OutlineCacheConfig::bounded(512);
//! assert_eq!(config.capacity.map(|c| c.get()), Some(512));
//!
//! assert!(OutlineCacheConfig::default().capacity.is_none());
//! ```
//!
//! # Environment Variable
//!
//! ```bash
//! GLYPHRUN_OUTLINE_CACHE_CAPACITY=2048 ./my_app
//! ```
//!
//! `0`, `none` and `unbounded` all mean no limit.

use std::num::NonZeroUsize;

/// Environment variable read by [`OutlineCacheConfig::from_env`]
pub const CAPACITY_ENV_VAR: &str = "GLYPHRUN_OUTLINE_CACHE_CAPACITY";

/// Sizing of a font handle's outline cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutlineCacheConfig {
    /// Maximum entries per layer mode; `None` keeps everything
    pub capacity: Option<NonZeroUsize>,
}

impl OutlineCacheConfig {
    pub fn unbounded() -> Self {
        Self { capacity: None }
    }

    /// A zero capacity is treated as unbounded.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: NonZeroUsize::new(capacity),
        }
    }

    /// Read the capacity from `GLYPHRUN_OUTLINE_CACHE_CAPACITY`
    ///
    /// Unset or unparsable values fall back to the unbounded default.
    pub fn from_env() -> Self {
        match std::env::var(CAPACITY_ENV_VAR) {
            Ok(value) => Self::parse(&value).unwrap_or_else(|| {
                log::warn!("Ignoring invalid {CAPACITY_ENV_VAR} value {value:?}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "" | "none" | "unbounded" => Some(Self::unbounded()),
            digits => {
                let capacity = digits.parse::<usize>().ok()?;
                let config = Self::bounded(capacity);
                log::info!(
                    "Outline cache capacity set to {capacity} via {CAPACITY_ENV_VAR}"
                );
                Some(config)
            },
        }
    }
}
