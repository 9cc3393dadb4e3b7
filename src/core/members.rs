use crate::domain::model::{SyscodeBucket, WorkItem};
use crate::domain::ports::AssetApi;
use std::collections::HashSet;

/// Resolves the work items of one bucket to asset identifiers.
pub struct MemberResolver<'a, A: AssetApi> {
    api: &'a A,
}

impl<'a, A: AssetApi> MemberResolver<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Returns the deduplicated, insertion-ordered asset ids for the bucket.
    ///
    /// Every per-item problem (transport error, zero candidates, no FQDN
    /// match) is logged and treated as a miss for that item only; the rest of
    /// the bucket is always processed. The result may be empty.
    pub async fn resolve(&self, bucket: &SyscodeBucket) -> Vec<String> {
        let mut member_ids = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for item in &bucket.items {
            let Some(asset_id) = self.resolve_item(&bucket.syscode, item).await else {
                continue;
            };

            if seen.insert(asset_id.clone()) {
                member_ids.push(asset_id);
            } else {
                tracing::debug!(
                    syscode = %bucket.syscode,
                    name = %item.name,
                    asset_id = %asset_id,
                    "asset already collected for this bucket, skipping duplicate"
                );
            }
        }

        member_ids
    }

    async fn resolve_item(&self, syscode: &str, item: &WorkItem) -> Option<String> {
        let candidates = match self.api.search_assets(&item.name).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!(
                    syscode,
                    name = %item.name,
                    error = %err,
                    "asset lookup failed, treating as a miss"
                );
                return None;
            }
        };

        // First candidate with a case-insensitive FQDN match wins; remaining
        // candidates are not inspected.
        let matched = candidates.iter().find(|c| {
            c.fqdn
                .as_deref()
                .is_some_and(|f| f.eq_ignore_ascii_case(&item.fqdn))
        });

        match matched {
            Some(asset) => {
                tracing::debug!(
                    syscode,
                    name = %item.name,
                    fqdn = %item.fqdn,
                    asset_id = %asset.id,
                    candidates = candidates.len(),
                    "asset resolved"
                );
                Some(asset.id.clone())
            }
            None => {
                tracing::warn!(
                    syscode,
                    name = %item.name,
                    fqdn = %item.fqdn,
                    candidates = candidates.len(),
                    "no asset matched name and FQDN"
                );
                None
            }
        }
    }
}
