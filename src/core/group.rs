use crate::domain::model::Group;
use crate::domain::ports::AssetApi;
use crate::utils::error::SyncError;
use crate::utils::retry::{retry_with_policy, RetryPolicy};
use thiserror::Error;

/// Failures that invalidate an entire syscode bucket. The orchestrator skips
/// member resolution for the bucket and moves on; nothing here aborts the run.
#[derive(Error, Debug)]
pub enum GroupError {
    #[error("group lookup for '{syscode}' failed: {source}")]
    Lookup {
        syscode: String,
        #[source]
        source: SyncError,
    },

    #[error("group create for '{syscode}' failed: {source}")]
    CreateFailed {
        syscode: String,
        #[source]
        source: SyncError,
    },

    #[error("group '{syscode}' (id {group_id}) not readable after {attempts} attempts: {source}")]
    VerificationFailed {
        syscode: String,
        group_id: String,
        attempts: u32,
        #[source]
        source: SyncError,
    },
}

/// Ensures a group exists for a syscode and returns its identifier.
pub struct GroupResolver<'a, A: AssetApi> {
    api: &'a A,
    verify: RetryPolicy,
}

impl<'a, A: AssetApi> GroupResolver<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            verify: RetryPolicy::default(),
        }
    }

    pub fn with_verify_policy(mut self, policy: RetryPolicy) -> Self {
        self.verify = policy;
        self
    }

    /// Looks the group up by exact name, creating it if absent. A freshly
    /// created group is re-fetched by id under the verify policy before it is
    /// handed to member resolution, because the backing API does not promise
    /// that a create is immediately readable.
    pub async fn resolve(&self, syscode: &str) -> Result<Group, GroupError> {
        tracing::debug!(syscode, "looking up group by name");

        let existing = self
            .api
            .find_group_by_name(syscode)
            .await
            .map_err(|source| GroupError::Lookup {
                syscode: syscode.to_string(),
                source,
            })?;

        if let Some(record) = existing {
            tracing::info!(syscode, group_id = %record.id, "group already exists");
            return Ok(Group {
                id: record.id,
                name: record.name,
                created_now: false,
            });
        }

        let description = group_description(syscode);
        tracing::info!(syscode, "group not found, creating");

        let group_id = self
            .api
            .create_group(syscode, &description)
            .await
            .map_err(|source| GroupError::CreateFailed {
                syscode: syscode.to_string(),
                source,
            })?;

        self.verify_created(syscode, &group_id).await?;

        tracing::info!(syscode, group_id = %group_id, "group created and verified");
        Ok(Group {
            id: group_id,
            name: syscode.to_string(),
            created_now: true,
        })
    }

    async fn verify_created(&self, syscode: &str, group_id: &str) -> Result<(), GroupError> {
        retry_with_policy(self.verify, "group-verify", || async {
            let record = self.api.fetch_group(group_id).await?;
            if record.id == group_id {
                Ok(())
            } else {
                Err(SyncError::unexpected_response(
                    "group-verify",
                    format!("fetched id '{}' does not match '{}'", record.id, group_id),
                ))
            }
        })
        .await
        .map_err(|source| GroupError::VerificationFailed {
            syscode: syscode.to_string(),
            group_id: group_id.to_string(),
            attempts: self.verify.attempts,
            source,
        })
    }
}

/// Deterministic description for groups this tool creates.
pub fn group_description(syscode: &str) -> String {
    format!("Devices assigned to SysCode '{}' (managed by syscode-sync)", syscode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AssetCandidate, GroupRecord};
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Scriptable fake API for resolver tests.
    struct FakeApi {
        existing_group: Option<GroupRecord>,
        find_fails: bool,
        create_fails: bool,
        fetch_failures_before_success: u32,
        find_calls: AtomicU32,
        create_calls: AtomicU32,
        fetch_calls: AtomicU32,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                existing_group: None,
                find_fails: false,
                create_fails: false,
                fetch_failures_before_success: 0,
                find_calls: AtomicU32::new(0),
                create_calls: AtomicU32::new(0),
                fetch_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl AssetApi for FakeApi {
        async fn find_group_by_name(&self, _name: &str) -> Result<Option<GroupRecord>> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            if self.find_fails {
                return Err(SyncError::unexpected_response(
                    "group-lookup",
                    "HTTP 502: bad gateway",
                ));
            }
            Ok(self.existing_group.clone())
        }

        async fn create_group(&self, _name: &str, _description: &str) -> Result<String> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.create_fails {
                Err(SyncError::unexpected_response(
                    "group-create",
                    "response carried no entity id",
                ))
            } else {
                Ok("new-group-1".to_string())
            }
        }

        async fn fetch_group(&self, id: &str) -> Result<GroupRecord> {
            let n = self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fetch_failures_before_success {
                Err(SyncError::unexpected_response(
                    "group-fetch",
                    "not visible yet",
                ))
            } else {
                Ok(GroupRecord {
                    id: id.to_string(),
                    name: "APP1".to_string(),
                })
            }
        }

        async fn search_assets(&self, _name: &str) -> Result<Vec<AssetCandidate>> {
            Ok(vec![])
        }

        async fn replace_members(&self, _group_id: &str, _member_ids: &[String]) -> Result<()> {
            Ok(())
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_existing_group_skips_create_and_verify() {
        let mut api = FakeApi::new();
        api.existing_group = Some(GroupRecord {
            id: "g-42".to_string(),
            name: "APP1".to_string(),
        });

        let resolver = GroupResolver::new(&api).with_verify_policy(fast_policy());
        let group = resolver.resolve("APP1").await.unwrap();

        assert_eq!(group.id, "g-42");
        assert!(!group.created_now);
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_group_is_created_and_verified() {
        let api = FakeApi::new();
        let resolver = GroupResolver::new(&api).with_verify_policy(fast_policy());

        let group = resolver.resolve("APP1").await.unwrap();

        assert_eq!(group.id, "new-group-1");
        assert!(group.created_now);
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_verify_succeeding_on_second_attempt_short_circuits() {
        let mut api = FakeApi::new();
        api.fetch_failures_before_success = 1;

        let resolver = GroupResolver::new(&api).with_verify_policy(fast_policy());
        let group = resolver.resolve("APP1").await.unwrap();

        assert!(group.created_now);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_verify_exhaustion_reports_verification_failed() {
        let mut api = FakeApi::new();
        api.fetch_failures_before_success = 99;

        let resolver = GroupResolver::new(&api).with_verify_policy(fast_policy());
        let err = resolver.resolve("APP1").await.unwrap_err();

        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 3);
        match err {
            GroupError::VerificationFailed { attempts, group_id, .. } => {
                assert_eq!(attempts, 3);
                assert_eq!(group_id, "new-group-1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lookup_transport_failure_reports_lookup_error() {
        let mut api = FakeApi::new();
        api.find_fails = true;

        let resolver = GroupResolver::new(&api).with_verify_policy(fast_policy());
        let err = resolver.resolve("APP1").await.unwrap_err();

        assert!(matches!(err, GroupError::Lookup { .. }));
        // A failed lookup must not fall through to a create.
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_failure_reports_create_failed() {
        let mut api = FakeApi::new();
        api.create_fails = true;

        let resolver = GroupResolver::new(&api).with_verify_policy(fast_policy());
        let err = resolver.resolve("APP1").await.unwrap_err();

        assert!(matches!(err, GroupError::CreateFailed { .. }));
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_description_is_deterministic() {
        assert_eq!(group_description("APP1"), group_description("APP1"));
        assert!(group_description("APP1").contains("APP1"));
    }
}
