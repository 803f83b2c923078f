//! REST routes and gateway URL layout for the Stateless platform.

/// Control-plane API base.
pub const API_BASE: &str = "https://api.stateless.solutions/v1";

/// RPC gateway base; bucket URLs hang off per-chain path slugs.
pub const GATEWAY_BASE: &str = "https://api.stateless.solutions";

pub const ACCOUNT_PROFILE: &str = "/accounts/profile";
pub const LIST_BUCKETS: &str = "/buckets/list";

/// URL path slug for a supported chain id.
pub fn chain_slug(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("ethereum"),
        10 => Some("optimism"),
        137 => Some("polygon"),
        42161 => Some("arbitrum-one"),
        _ => None,
    }
}
