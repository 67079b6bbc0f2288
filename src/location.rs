//! Selecting the freshest position fix among the platform's location sources

use crate::types::{FixSource, LocationFix};

/// Platform collaborator that reports provider availability and the last
/// known fix per source
///
/// Queries are synchronous reads of cached values; implementations must not
/// block on I/O.
pub trait LocationProvider {
    /// Whether the provider for `source` is currently enabled
    fn is_enabled(&self, source: FixSource) -> bool;

    /// Most recent fix reported by `source`, if any
    fn last_known_fix(&self, source: FixSource) -> Option<LocationFix>;
}

/// Enabled state of both location providers at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProviderStatus {
    pub gps_enabled: bool,
    pub network_enabled: bool,
}

impl ProviderStatus {
    /// Read the current status from `provider`
    pub fn query<P: LocationProvider + ?Sized>(provider: &P) -> Self {
        Self {
            gps_enabled: provider.is_enabled(FixSource::Gps),
            network_enabled: provider.is_enabled(FixSource::Network),
        }
    }

    /// True if at least one provider can produce a fix
    pub fn any_enabled(&self) -> bool {
        self.gps_enabled || self.network_enabled
    }
}

/// Choose the freshest of a GPS and a network fix
///
/// With both present, the GPS fix wins only when it is strictly newer; equal
/// timestamps favour the network fix.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use compass_tracker::{FixSource, GeoPoint, LocationFix, location::select_best};
///
/// let point = GeoPoint::new(52.0, 21.0);
/// let at = |ms| Utc.timestamp_millis_opt(ms).unwrap();
/// let gps = LocationFix::new(point, at(100), FixSource::Gps);
/// let network = LocationFix::new(point, at(100), FixSource::Network);
///
/// assert_eq!(select_best(Some(gps), Some(network)), Some(network));
/// assert_eq!(select_best(Some(gps), None), Some(gps));
/// assert_eq!(select_best(None, None), None);
/// ```
pub fn select_best(gps: Option<LocationFix>, network: Option<LocationFix>) -> Option<LocationFix> {
    match (gps, network) {
        (Some(gps), Some(network)) => {
            if gps.time > network.time {
                Some(gps)
            } else {
                Some(network)
            }
        }
        (gps, None) => gps,
        (None, network) => network,
    }
}

/// Look up the best last known fix from `provider`
///
/// `status` is the availability already read from the same provider. When
/// neither provider is enabled the fixes are not queried at all.
pub fn last_best_fix<P: LocationProvider + ?Sized>(
    provider: &P,
    status: ProviderStatus,
) -> Option<LocationFix> {
    if !status.any_enabled() {
        return None;
    }

    select_best(
        provider.last_known_fix(FixSource::Gps),
        provider.last_known_fix(FixSource::Network),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::Cell;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn fix(ms: i64, source: FixSource) -> LocationFix {
        LocationFix::new(GeoPoint::new(10.0, 20.0), at(ms), source)
    }

    #[test]
    fn test_tie_prefers_network() {
        let gps = fix(100, FixSource::Gps);
        let network = fix(100, FixSource::Network);
        assert_eq!(select_best(Some(gps), Some(network)), Some(network));
    }

    #[test]
    fn test_strictly_newer_gps_wins() {
        let gps = fix(101, FixSource::Gps);
        let network = fix(100, FixSource::Network);
        assert_eq!(select_best(Some(gps), Some(network)), Some(gps));
    }

    #[test]
    fn test_newer_network_wins() {
        let gps = fix(100, FixSource::Gps);
        let network = fix(250, FixSource::Network);
        assert_eq!(select_best(Some(gps), Some(network)), Some(network));
    }

    #[test]
    fn test_single_fix_returned() {
        let network = fix(100, FixSource::Network);
        assert_eq!(select_best(None, Some(network)), Some(network));

        // Even a fix at the epoch is returned when it is the only one
        let gps = fix(0, FixSource::Gps);
        assert_eq!(select_best(Some(gps), None), Some(gps));
    }

    #[test]
    fn test_no_fix() {
        assert_eq!(select_best(None, None), None);
    }

    struct CountingProvider {
        status: ProviderStatus,
        gps: Option<LocationFix>,
        network: Option<LocationFix>,
        lookups: Cell<u32>,
    }

    impl LocationProvider for CountingProvider {
        fn is_enabled(&self, source: FixSource) -> bool {
            match source {
                FixSource::Gps => self.status.gps_enabled,
                FixSource::Network => self.status.network_enabled,
            }
        }

        fn last_known_fix(&self, source: FixSource) -> Option<LocationFix> {
            self.lookups.set(self.lookups.get() + 1);
            match source {
                FixSource::Gps => self.gps,
                FixSource::Network => self.network,
            }
        }
    }

    #[test]
    fn test_disabled_providers_are_not_queried() {
        let provider = CountingProvider {
            status: ProviderStatus::default(),
            gps: Some(fix(100, FixSource::Gps)),
            network: None,
            lookups: Cell::new(0),
        };
        let status = ProviderStatus::query(&provider);
        assert!(!status.any_enabled());
        assert_eq!(last_best_fix(&provider, status), None);
        assert_eq!(provider.lookups.get(), 0);
    }

    #[test]
    fn test_one_enabled_provider_queries_both_sources() {
        let provider = CountingProvider {
            status: ProviderStatus {
                gps_enabled: false,
                network_enabled: true,
            },
            gps: Some(fix(500, FixSource::Gps)),
            network: Some(fix(400, FixSource::Network)),
            lookups: Cell::new(0),
        };
        let status = ProviderStatus::query(&provider);
        assert!(status.any_enabled());
        let best = last_best_fix(&provider, status);
        assert_eq!(best.map(|f| f.source), Some(FixSource::Gps));
        assert_eq!(provider.lookups.get(), 2);
    }
}
