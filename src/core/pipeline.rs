use crate::cloudflare::policy::{PolicyManager, RateLimits, LIST_CHUNK_SIZE, MAX_GATEWAY_LISTS};
use crate::cloudflare::GatewayClient;
use crate::core::parser::parse_domains;
use crate::core::{ConfigProvider, Pipeline, RawList, Storage, SyncPlan};
use crate::utils::error::{Result, SyncError};
use reqwest::Client;
use std::collections::HashSet;

/// Reads an optional filter file (whitelist / TLD list) from the working
/// directory. Only absence is tolerated; any other read failure must not
/// silently empty the whitelist.
fn load_filter_file(path: &str) -> Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Missing {}, skipping", path);
            Ok(Vec::new())
        }
        Err(e) => Err(SyncError::IoError(e)),
    }
}

pub struct BlocklistPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    gateway: GatewayClient,
    limits: RateLimits,
    whitelist: HashSet<String>,
    tld_suppressions: Vec<String>,
}

impl<S: Storage, C: ConfigProvider> BlocklistPipeline<S, C> {
    pub fn new(storage: S, config: C, gateway: GatewayClient, limits: RateLimits) -> Result<Self> {
        let whitelist = load_filter_file(config.whitelist_file())?
            .into_iter()
            .collect();
        let tld_suppressions = load_filter_file(config.tld_file())?;

        Ok(Self {
            storage,
            config,
            client: Client::new(),
            gateway,
            limits,
            whitelist,
            tld_suppressions,
        })
    }

    pub fn has_tld_suppressions(&self) -> bool {
        !self.tld_suppressions.is_empty()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BlocklistPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawList>> {
        let mut lists = Vec::new();

        for (name, url) in self.config.list_sources() {
            tracing::debug!("Setting list {}", name);
            tracing::info!("Downloading file from {}", url);

            let response = self.client.get(url).send().await?.error_for_status()?;
            let body = response.text().await?;

            // Keep a copy on disk for post-mortem inspection
            self.storage.write_file(name, body.as_bytes()).await?;
            tracing::info!("File size: {:.0} KB", body.len() as f64 / 1024.0);

            lists.push(RawList {
                name: name.clone(),
                body,
            });
        }

        Ok(lists)
    }

    async fn transform(&self, lists: Vec<RawList>) -> Result<SyncPlan> {
        let mut all_domains = Vec::new();

        for list in &lists {
            let domains = parse_domains(&list.body, &self.whitelist, &self.tld_suppressions);
            tracing::info!("Number of domains in {}: {}", list.name, domains.len());
            all_domains.extend(domains);
        }

        let total_raw_domains = all_domains.len();
        let unique: HashSet<String> = all_domains.into_iter().collect();
        let mut unique_domains: Vec<String> = unique.into_iter().collect();
        unique_domains.sort();

        tracing::debug!("Total not unique domains: {}", total_raw_domains);
        tracing::info!(
            "Total count of unique domains in list: {}",
            unique_domains.len()
        );

        Ok(SyncPlan {
            unique_domains,
            tld_suppressions: self.tld_suppressions.clone(),
            total_raw_domains,
        })
    }

    async fn load(&self, plan: SyncPlan) -> Result<String> {
        let name_prefix = self.config.name_prefix();
        let tld_name_prefix = self.config.tld_name_prefix();

        let new_list_count = plan.unique_count().div_ceil(LIST_CHUNK_SIZE);
        tracing::info!("Total lists to create: {}", new_list_count);

        let (cf_lists, all_lists) = self.gateway.get_lists(name_prefix).await?;
        let other_lists = all_lists.len() - cf_lists.len();

        tracing::debug!("Number of managed lists in Cloudflare: {}", cf_lists.len());
        tracing::debug!("Additional lists in Cloudflare: {}", other_lists);

        let existing_count: u64 = cf_lists.iter().map(|l| l.count).sum();
        if plan.unique_count() as u64 == existing_count {
            tracing::warn!("Lists are the same size, stopping");
            return Ok("Lists are the same size, nothing to do".to_string());
        }

        if new_list_count + other_lists > MAX_GATEWAY_LISTS {
            tracing::warn!(
                "Max of {} lists allowed. Select smaller blocklists, stopping",
                MAX_GATEWAY_LISTS
            );
            return Ok("Account list cap would be exceeded, nothing done".to_string());
        }

        let policies = PolicyManager::new(&self.gateway, self.limits);

        if plan.tld_suppressions.is_empty() {
            policies.delete_policy(tld_name_prefix).await?;
        } else {
            policies
                .replace_tld_policy(tld_name_prefix, &plan.tld_suppressions)
                .await?;
        }

        policies.delete_lists_policy(name_prefix, &cf_lists).await?;
        let created = policies
            .create_lists_policy(name_prefix, &plan.unique_domains)
            .await?;

        Ok(format!(
            "Synced {} domains across {} lists",
            plan.unique_count(),
            created.len()
        ))
    }
}
