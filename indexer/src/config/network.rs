use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Networks whose stake events are indexed
///
/// PulseChain forked from Ethereum and shares its genesis state, so raw stake IDs
/// overlap between the two. Anything persisted must be keyed by network as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Ethereum,
    Pulsechain,
}

impl Network {
    /// All supported networks, in a stable order
    pub const ALL: [Network; 2] = [Network::Ethereum, Network::Pulsechain];

    /// Name used in persisted rows, keys and log prefixes
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Pulsechain => "pulsechain",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a network name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network '{0}' (expected 'ethereum' or 'pulsechain')")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ethereum" | "eth" => Ok(Network::Ethereum),
            "pulsechain" | "pls" => Ok(Network::Pulsechain),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}
