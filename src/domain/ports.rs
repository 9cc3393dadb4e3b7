use crate::domain::model::{AssetCandidate, GroupRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// The remote asset-management API as seen by the reconciliation core.
///
/// Implementations own all transport and payload-shape concerns; the core
/// only ever sees typed records or a `SyncError`.
#[async_trait]
pub trait AssetApi: Send + Sync {
    /// Looks up a group by exact name (limit 1). `Ok(None)` means no group
    /// with that name exists.
    async fn find_group_by_name(&self, name: &str) -> Result<Option<GroupRecord>>;

    /// Creates a group with empty membership, returning its identifier.
    /// Fails if the response carries no usable identifier.
    async fn create_group(&self, name: &str, description: &str) -> Result<String>;

    /// Fetches a group by identifier. Used to verify read-availability of a
    /// freshly created group.
    async fn fetch_group(&self, id: &str) -> Result<GroupRecord>;

    /// Searches active assets by exact name. May return multiple candidates;
    /// disambiguation by FQDN is the caller's job.
    async fn search_assets(&self, name: &str) -> Result<Vec<AssetCandidate>>;

    /// Replaces the group's membership with exactly the given identifiers.
    async fn replace_members(&self, group_id: &str, member_ids: &[String]) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn csv_path(&self) -> &str;
    fn member_search_limit(&self) -> usize;
    fn verify_attempts(&self) -> u32;
    fn verify_delay(&self) -> Duration;
}
