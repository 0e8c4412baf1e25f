use crate::domain::model::{RawList, SyncPlan};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn list_sources(&self) -> &BTreeMap<String, String>;
    fn whitelist_file(&self) -> &str;
    fn tld_file(&self) -> &str;
    fn tmp_dir(&self) -> &str;
    fn name_prefix(&self) -> &str;
    fn tld_name_prefix(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawList>>;
    async fn transform(&self, lists: Vec<RawList>) -> Result<SyncPlan>;
    async fn load(&self, plan: SyncPlan) -> Result<String>;
}
