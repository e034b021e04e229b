//! Persisted stake keys
//!
//! Every row in `stake_starts` is keyed by `"{network}:{raw_stake_id}"`. This module is
//! the only place that builds or parses that key.

use crate::config::Network;

/// Separator between the network name and the raw stake ID
pub const KEY_SEPARATOR: char = ':';

/// Prefix older rows were written with before keys were unified
const LEGACY_SEPARATOR: char = '_';

/// Build the persisted key for a network-local stake ID
///
/// A raw ID that already carries this network's prefix (current or legacy form) is
/// stripped first, so applying this twice yields the same key.
pub fn namespaced_key(network: Network, raw_stake_id: &str) -> String {
    format!(
        "{}{}{}",
        network.as_str(),
        KEY_SEPARATOR,
        strip_network_prefix(network, raw_stake_id.trim())
    )
}

/// Split a persisted key back into its network and raw stake ID
pub fn split_namespaced_key(key: &str) -> Option<(Network, &str)> {
    let (network, raw) = key.split_once(KEY_SEPARATOR)?;
    let network = network.parse::<Network>().ok()?;
    if raw.is_empty() {
        return None;
    }
    Some((network, raw))
}

fn strip_network_prefix(network: Network, raw: &str) -> &str {
    let name = network.as_str();
    for separator in [KEY_SEPARATOR, LEGACY_SEPARATOR] {
        if let Some(rest) = raw.strip_prefix(name) {
            if let Some(id) = rest.strip_prefix(separator) {
                if !id.is_empty() {
                    return id;
                }
            }
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_key_format() {
        assert_eq!(namespaced_key(Network::Pulsechain, "42"), "pulsechain:42");
        assert_eq!(namespaced_key(Network::Ethereum, "42"), "ethereum:42");
    }

    #[test]
    fn test_networks_never_collide() {
        let raw_ids = ["0", "42", "ethereum:1", "pulsechain_7", ":", "a:b", ""];
        for raw in raw_ids {
            assert_ne!(
                namespaced_key(Network::Ethereum, raw),
                namespaced_key(Network::Pulsechain, raw),
                "collision for raw id {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_already_prefixed_ids_are_not_double_prefixed() {
        assert_eq!(namespaced_key(Network::Ethereum, "ethereum:42"), "ethereum:42");
        assert_eq!(namespaced_key(Network::Ethereum, "ethereum_42"), "ethereum:42");
        assert_eq!(namespaced_key(Network::Pulsechain, " 42 "), "pulsechain:42");

        let once = namespaced_key(Network::Pulsechain, "1234");
        assert_eq!(namespaced_key(Network::Pulsechain, &once), once);
    }

    #[test]
    fn test_other_networks_prefix_is_kept() {
        // A foreign prefix is part of the raw ID, not something to reinterpret
        assert_eq!(
            namespaced_key(Network::Pulsechain, "ethereum:42"),
            "pulsechain:ethereum:42"
        );
    }

    #[test]
    fn test_split_round_trip() {
        let key = namespaced_key(Network::Pulsechain, "42");
        assert_eq!(split_namespaced_key(&key), Some((Network::Pulsechain, "42")));
        assert_eq!(split_namespaced_key("42"), None);
        assert_eq!(split_namespaced_key("polygon:42"), None);
        assert_eq!(split_namespaced_key("ethereum:"), None);
    }
}
