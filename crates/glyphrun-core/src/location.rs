//! The active design-space location of one font
//!
//! A requested location is first cut down to the axes the font defines,
//! then compared by value against the active one. Axes the font lacks are
//! dropped silently, so asking for `XXXX=5` on a font without that axis
//! neither fails nor counts as a change.
//!
//! On a real change the outline cache is purged before anything else
//! happens, then the outline engine is told to move.

use crate::outline_cache::OutlineCache;
use crate::traits::OutlineProvider;
use crate::types::{Axes, VarLocation};

/// Owns the location outlines are currently drawn at
#[derive(Debug, Clone, Default)]
pub struct VarLocationTracker {
    current: VarLocation,
}

impl VarLocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active location, already filtered to the font's axes
    pub fn current(&self) -> &VarLocation {
        &self.current
    }

    /// Filter and compare without applying anything
    ///
    /// Returns the filtered location when it differs from the active one.
    pub fn pending_change(&self, requested: Option<&VarLocation>, axes: &Axes) -> Option<VarLocation> {
        let filtered = match requested {
            Some(location) => location.filtered(axes),
            None => VarLocation::new(),
        };

        if let Some(location) = requested {
            if filtered.len() != location.len() {
                log::debug!(
                    "Ignoring {} axis value(s) not defined by this font",
                    location.len() - filtered.len()
                );
            }
        }

        (filtered != self.current).then_some(filtered)
    }

    /// Make `requested` the active location
    ///
    /// Returns `true` when the location changed, in which case `cache` has
    /// been purged and `provider` reconfigured, in that order.
    pub fn set_location(
        &mut self,
        requested: Option<&VarLocation>,
        axes: &Axes,
        cache: &mut OutlineCache,
        provider: &mut dyn OutlineProvider,
    ) -> bool {
        let Some(location) = self.pending_change(requested, axes) else {
            return false;
        };

        log::debug!("Variable location changed: {:?} -> {:?}", self.current, location);
        cache.purge();
        self.current = location;
        provider.set_var_location(&self.current);
        true
    }
}
