use crate::core::group::GroupResolver;
use crate::core::members::MemberResolver;
use crate::core::normalize::{group_by_syscode, normalize};
use crate::domain::model::{
    BucketOutcome, BucketStatus, DeviceRow, MembershipUpdate, RunReport, SyscodeBucket,
};
use crate::domain::ports::AssetApi;
use crate::utils::retry::RetryPolicy;
use chrono::Utc;

/// Drives the per-syscode pipeline: normalize, bucket, resolve group, resolve
/// members, replace membership. Buckets are strictly sequential and isolated;
/// one bucket's failure never blocks the next.
pub struct Reconciler<A: AssetApi> {
    api: A,
    verify_policy: RetryPolicy,
}

impl<A: AssetApi> Reconciler<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            verify_policy: RetryPolicy::default(),
        }
    }

    pub fn with_verify_policy(mut self, policy: RetryPolicy) -> Self {
        self.verify_policy = policy;
        self
    }

    /// Runs one reconciliation pass over the given rows. Never fails: every
    /// API-level problem is absorbed into the report at bucket or item
    /// granularity.
    pub async fn run(&self, rows: Vec<DeviceRow>) -> RunReport {
        let started_at = Utc::now();
        let rows_read = rows.len();

        let items = normalize(&rows);
        let work_items = items.len();
        if items.is_empty() {
            tracing::warn!(rows_read, "no valid work items after normalization, nothing to do");
            return RunReport {
                started_at,
                finished_at: Utc::now(),
                rows_read,
                work_items: 0,
                buckets: Vec::new(),
            };
        }

        let buckets = group_by_syscode(items);
        tracing::info!(
            rows_read,
            work_items,
            buckets = buckets.len(),
            "starting reconciliation"
        );

        let mut outcomes = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            outcomes.push(self.process_bucket(bucket).await);
        }

        RunReport {
            started_at,
            finished_at: Utc::now(),
            rows_read,
            work_items,
            buckets: outcomes,
        }
    }

    async fn process_bucket(&self, bucket: &SyscodeBucket) -> BucketOutcome {
        tracing::info!(
            syscode = %bucket.syscode,
            items = bucket.items.len(),
            "processing bucket"
        );

        let resolver = GroupResolver::new(&self.api).with_verify_policy(self.verify_policy);
        let group = match resolver.resolve(&bucket.syscode).await {
            Ok(group) => group,
            Err(err) => {
                tracing::error!(
                    syscode = %bucket.syscode,
                    error = %err,
                    "group resolution failed, skipping bucket"
                );
                return BucketOutcome {
                    syscode: bucket.syscode.clone(),
                    status: BucketStatus::GroupFailed,
                    member_count: 0,
                    group_created: false,
                };
            }
        };

        let member_ids = MemberResolver::new(&self.api).resolve(bucket).await;
        if member_ids.is_empty() {
            tracing::info!(
                syscode = %bucket.syscode,
                group_id = %group.id,
                "no members resolved, skipping membership update"
            );
            return BucketOutcome {
                syscode: bucket.syscode.clone(),
                status: BucketStatus::NoMembers,
                member_count: 0,
                group_created: group.created_now,
            };
        }

        let update = MembershipUpdate {
            group_id: group.id,
            member_ids,
        };

        match self
            .api
            .replace_members(&update.group_id, &update.member_ids)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    syscode = %bucket.syscode,
                    group_id = %update.group_id,
                    members = update.member_ids.len(),
                    "membership updated"
                );
                BucketOutcome {
                    syscode: bucket.syscode.clone(),
                    status: BucketStatus::Completed,
                    member_count: update.member_ids.len(),
                    group_created: group.created_now,
                }
            }
            Err(err) => {
                tracing::error!(
                    syscode = %bucket.syscode,
                    group_id = %update.group_id,
                    members = update.member_ids.len(),
                    error = %err,
                    "membership update failed"
                );
                BucketOutcome {
                    syscode: bucket.syscode.clone(),
                    status: BucketStatus::UpdateFailed,
                    member_count: update.member_ids.len(),
                    group_created: group.created_now,
                }
            }
        }
    }
}
