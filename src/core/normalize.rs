use crate::domain::model::{DeviceRow, SyscodeBucket, WorkItem, NO_SYSCODE};
use std::collections::HashMap;

/// Splits a raw SysCode field into trimmed, non-empty tokens. A blank or
/// all-separator field yields the single sentinel token.
pub fn split_syscodes(raw: &str) -> Vec<String> {
    let tokens: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        vec![NO_SYSCODE.to_string()]
    } else {
        tokens
    }
}

/// Turns raw CSV rows into per-syscode work items.
///
/// Rows with a blank name or FQDN are dropped with a warning. A row with N
/// syscode tokens yields N work items sharing the row's name and FQDN. Pure
/// and deterministic; row order and within-row token order are preserved.
pub fn normalize(rows: &[DeviceRow]) -> Vec<WorkItem> {
    let mut items = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let name = row.name.trim();
        let fqdn = row.fqdn.trim();

        if name.is_empty() || fqdn.is_empty() {
            tracing::warn!(
                row = index + 1,
                name = %row.name,
                fqdn = %row.fqdn,
                "dropping row with blank name or FQDN"
            );
            continue;
        }

        for syscode in split_syscodes(&row.raw_syscode) {
            items.push(WorkItem {
                name: name.to_string(),
                fqdn: fqdn.to_string(),
                syscode,
            });
        }
    }

    items
}

/// Partitions work items into buckets keyed by exact syscode string.
///
/// Bucket order follows first appearance of each syscode; item order within a
/// bucket follows input order.
pub fn group_by_syscode(items: Vec<WorkItem>) -> Vec<SyscodeBucket> {
    let mut buckets: Vec<SyscodeBucket> = Vec::new();
    let mut index_by_syscode: HashMap<String, usize> = HashMap::new();

    for item in items {
        match index_by_syscode.get(&item.syscode) {
            Some(&i) => buckets[i].items.push(item),
            None => {
                index_by_syscode.insert(item.syscode.clone(), buckets.len());
                buckets.push(SyscodeBucket {
                    syscode: item.syscode.clone(),
                    items: vec![item],
                });
            }
        }
    }

    buckets
}
