use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel syscode assigned to devices whose SysCode column is blank.
pub const NO_SYSCODE: &str = "no-syscode";

/// One CSV record, exactly as read. Field values are untrimmed; validation
/// happens during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRow {
    pub name: String,
    pub fqdn: String,
    pub raw_syscode: String,
}

/// A single (device, syscode) pairing produced by exploding a `DeviceRow`'s
/// comma-separated SysCode field. Name, fqdn and syscode are always non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub name: String,
    pub fqdn: String,
    pub syscode: String,
}

/// All work items sharing one syscode. Unit of processing and of failure
/// isolation.
#[derive(Debug, Clone)]
pub struct SyscodeBucket {
    pub syscode: String,
    pub items: Vec<WorkItem>,
}

/// A group as resolved for a bucket, either found or freshly created.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub created_now: bool,
}

/// Parsed shape of a group entity returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
}

/// Parsed shape of an asset search hit. `fqdn` is `None` when the field is
/// absent or not a string, making the candidate unmatchable.
#[derive(Debug, Clone)]
pub struct AssetCandidate {
    pub id: String,
    pub name: Option<String>,
    pub fqdn: Option<String>,
}

/// The full-replace membership payload built for one bucket. `member_ids` is
/// deduplicated and insertion-ordered.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipUpdate {
    pub group_id: String,
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketStatus {
    /// Group resolved, members resolved, membership PUT succeeded.
    Completed,
    /// Group resolved but no work item produced a member; no PUT issued.
    NoMembers,
    /// Group lookup, create or post-create verification failed; bucket skipped.
    GroupFailed,
    /// Membership PUT failed; members were resolved but not applied.
    UpdateFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketOutcome {
    pub syscode: String,
    pub status: BucketStatus,
    pub member_count: usize,
    pub group_created: bool,
}

/// Aggregated result of one reconciliation run. Per-bucket failures are
/// recorded here rather than propagated; the run as a whole still succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows_read: usize,
    pub work_items: usize,
    pub buckets: Vec<BucketOutcome>,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.count(BucketStatus::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(BucketStatus::GroupFailed) + self.count(BucketStatus::UpdateFailed)
    }

    pub fn groups_created(&self) -> usize {
        self.buckets.iter().filter(|b| b.group_created).count()
    }

    pub fn members_applied(&self) -> usize {
        self.buckets
            .iter()
            .filter(|b| b.status == BucketStatus::Completed)
            .map(|b| b.member_count)
            .sum()
    }

    fn count(&self, status: BucketStatus) -> usize {
        self.buckets.iter().filter(|b| b.status == status).count()
    }
}
