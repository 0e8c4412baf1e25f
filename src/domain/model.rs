use serde::{Deserialize, Serialize};

/// One downloaded blocklist, exactly as fetched.
#[derive(Debug, Clone)]
pub struct RawList {
    pub name: String,
    pub body: String,
}

/// What the transform stage hands to the load stage: the deduplicated domain
/// set plus the TLD suppressions that shaped it.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub unique_domains: Vec<String>,
    pub tld_suppressions: Vec<String>,
    pub total_raw_domains: usize,
}

impl SyncPlan {
    pub fn unique_count(&self) -> usize {
        self.unique_domains.len()
    }
}

/// A Gateway list as returned by the Cloudflare API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

/// A Gateway firewall policy (rule) as returned by the Cloudflare API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfPolicy {
    pub id: String,
    pub name: String,
}
