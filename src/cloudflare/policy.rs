use crate::cloudflare::GatewayClient;
use crate::core::parser::chunk_domains;
use crate::domain::model::CfList;
use crate::utils::error::{Result, SyncError};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::sleep;

/// Gateway caps DOMAIN lists at 1000 entries each.
pub const LIST_CHUNK_SIZE: usize = 1000;

/// Zero Trust accounts allow at most 300 lists in total.
pub const MAX_GATEWAY_LISTS: usize = 300;

/// Pacing between mutating Gateway calls, tuned for the Cloudflare rate limit.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub list_op_delay: Duration,
    pub pre_create_pause: Duration,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            list_op_delay: Duration::from_millis(1500),
            pre_create_pause: Duration::from_secs(60),
        }
    }
}

impl RateLimits {
    /// For tests and dry experiments where pacing only wastes time.
    pub fn none() -> Self {
        Self {
            list_op_delay: Duration::ZERO,
            pre_create_pause: Duration::ZERO,
        }
    }
}

/// Builds the traffic expression matching any domain in the given lists.
pub fn build_traffic_expression(list_ids: &[String]) -> String {
    list_ids
        .iter()
        .map(|id| format!("any(dns.domains[*] in ${})", id))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Builds the anchored regex matching any of the suppressed TLDs, leading
/// dots stripped, sorted and deduplicated.
pub fn build_tld_regex(tlds: &[String]) -> String {
    let unique: BTreeSet<String> = tlds.iter().map(|tld| tld.replace('.', "")).collect();
    format!(
        "[.](|{})$",
        unique.into_iter().collect::<Vec<_>>().join("|")
    )
}

pub fn build_tld_traffic_expression(regex: &str) -> String {
    format!("any(dns.domains[*] matches \"{}\")", regex)
}

/// Drives list and policy replacement against the Gateway API, pacing
/// mutating calls to stay under the rate limit.
pub struct PolicyManager<'a> {
    client: &'a GatewayClient,
    limits: RateLimits,
}

impl<'a> PolicyManager<'a> {
    pub fn new(client: &'a GatewayClient, limits: RateLimits) -> Self {
        Self { client, limits }
    }

    /// Creates or replaces the TLD block policy. Exactly one matching policy
    /// may exist beforehand; more than one aborts the run.
    pub async fn replace_tld_policy(&self, name_prefix: &str, tlds: &[String]) -> Result<()> {
        let existing = self.client.get_policies(name_prefix).await?;

        match existing.len() {
            0 => {}
            1 => {
                self.client
                    .delete_policy(&existing[0].id, name_prefix)
                    .await?;
            }
            _ => {
                return Err(SyncError::ProcessingError {
                    message: format!("More than one firewall policy matches '{}'", name_prefix),
                })
            }
        }

        let regex = build_tld_regex(tlds);
        let traffic = build_tld_traffic_expression(&regex);
        self.client.create_policy(name_prefix, &traffic, true).await?;

        Ok(())
    }

    /// Deletes the policy matching the prefix; absence is a logged no-op.
    pub async fn delete_policy(&self, name_prefix: &str) -> Result<()> {
        let existing = self.client.get_policies(name_prefix).await?;

        match existing.len() {
            0 => {
                tracing::info!("No firewall policy {} found to delete", name_prefix);
                Ok(())
            }
            1 => {
                self.client
                    .delete_policy(&existing[0].id, name_prefix)
                    .await
            }
            _ => Err(SyncError::ProcessingError {
                message: format!("More than one firewall policy matches '{}'", name_prefix),
            }),
        }
    }

    /// Tears down the block policy and every list it referenced.
    pub async fn delete_lists_policy(&self, name_prefix: &str, lists: &[CfList]) -> Result<()> {
        self.delete_policy(name_prefix).await?;

        tracing::info!("Deleting lists, please wait");
        for list in lists {
            self.client.delete_list(&list.id, &list.name).await?;
            sleep(self.limits.list_op_delay).await;
        }

        Ok(())
    }

    /// Creates the chunked DOMAIN lists and the block policy over them.
    pub async fn create_lists_policy(
        &self,
        name_prefix: &str,
        unique_domains: &[String],
    ) -> Result<Vec<CfList>> {
        if !self.limits.pre_create_pause.is_zero() {
            tracing::warn!(
                "Pausing for {:?} to prevent rate limit, please wait",
                self.limits.pre_create_pause
            );
            sleep(self.limits.pre_create_pause).await;
        }

        tracing::info!("Creating lists, please wait");

        let mut created = Vec::new();
        for chunk in chunk_domains(unique_domains, LIST_CHUNK_SIZE) {
            let list_name = format!("{} {}", name_prefix, created.len() + 1);
            let list = self.client.create_list(&list_name, &chunk).await?;
            created.push(list);

            sleep(self.limits.list_op_delay).await;
        }

        let list_ids: Vec<String> = created.iter().map(|l| l.id.clone()).collect();
        let traffic = build_traffic_expression(&list_ids);

        // A fresh policy every run; the old one went away with the old lists
        let existing = self.client.get_policies(name_prefix).await?;
        match existing.len() {
            0 => {
                self.client
                    .create_policy(name_prefix, &traffic, false)
                    .await?;
            }
            1 => {
                self.client
                    .delete_policy(&existing[0].id, name_prefix)
                    .await?;
                self.client
                    .create_policy(name_prefix, &traffic, false)
                    .await?;
            }
            _ => {
                return Err(SyncError::ProcessingError {
                    message: format!("More than one firewall policy matches '{}'", name_prefix),
                })
            }
        }

        Ok(created)
    }
}
