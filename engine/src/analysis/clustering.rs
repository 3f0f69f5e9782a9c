//! Failure clustering by normalized error signature
//!
//! The signature is the first line of the failure message with volatile
//! tokens (hex addresses, long numeric ids) replaced by placeholders, so that
//! the same underlying failure groups together across tests.

use crate::report::{ErrorCluster, TestRecord};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Replacement for hexadecimal literals
pub const HEX_PLACEHOLDER: &str = "HEX";

/// Replacement for runs of four or more digits
pub const ID_PLACEHOLDER: &str = "ID";

static HEX_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"0x[a-fA-F0-9]+").unwrap());

static LONG_DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]{4,}").unwrap());

/// Compute the cluster key for a failure message.
///
/// Hex literals are replaced before digit runs, so `0x1234ABCD` becomes
/// `HEX` rather than `0xIDABCD`.
pub fn normalize_message(message: &str) -> String {
    let first_line = message.split('\n').next().unwrap_or_default().trim();
    let without_hex = HEX_LITERAL.replace_all(first_line, HEX_PLACEHOLDER);
    LONG_DIGIT_RUN
        .replace_all(&without_hex, ID_PLACEHOLDER)
        .into_owned()
}

/// Group failed records by normalized message.
///
/// Records that are not failed, or have no message or an empty one, join no
/// cluster. Whitespace-only messages cluster under the empty key.
/// Clusters are ordered by descending size; equal sizes keep creation order.
pub fn cluster_failures(failed: &[&TestRecord]) -> Vec<ErrorCluster> {
    let mut clusters: Vec<ErrorCluster> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in failed.iter().filter(|r| r.is_failed()) {
        let Some(message) = record.error_message() else {
            continue;
        };
        let key = normalize_message(message);

        match index.get(&key) {
            Some(&position) => {
                let cluster = &mut clusters[position];
                cluster.count += 1;
                cluster.test_ids.push(record.id.clone());
            }
            None => {
                index.insert(key.clone(), clusters.len());
                clusters.push(ErrorCluster {
                    message: key,
                    count: 1,
                    test_ids: vec![record.id.clone()],
                });
            }
        }
    }

    // Vec::sort_by is stable.
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    debug!(
        failures = failed.len(),
        clusters = clusters.len(),
        "clustered failures"
    );
    clusters
}
