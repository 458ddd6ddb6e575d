//! Reduction of per-unit results into one report

use crate::types::{AggregateReport, UsageResult, UsageVerdict};

/// Fold usage results into a single report.
///
/// - `any_used`: OR of `has_transactions`
/// - `total_balance`: sum of balances (errored entries carry 0)
/// - `earliest_activity`: minimum timestamp over used units; unknown as
///   soon as any used unit has no timestamp
/// - `verdict`: `Undetermined` only when there were results and every one
///   of them errored
pub fn aggregate(results: &[UsageResult]) -> AggregateReport {
    let any_used = results.iter().any(|r| r.has_transactions);
    let total_balance = results
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.balance_satoshis));
    let failed_units = results.iter().filter(|r| r.is_error()).count();

    let used: Vec<&UsageResult> = results.iter().filter(|r| r.has_transactions).collect();
    let earliest_activity = if used.iter().any(|r| r.earliest_activity.is_none()) {
        None
    } else {
        used.iter().filter_map(|r| r.earliest_activity).min()
    };

    let verdict = if any_used {
        UsageVerdict::Used
    } else if !results.is_empty() && failed_units == results.len() {
        UsageVerdict::Undetermined
    } else {
        UsageVerdict::Unused
    };

    AggregateReport {
        any_used,
        total_balance,
        earliest_activity,
        failed_units,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UsageUnit;
    use chrono::{DateTime, Utc};

    fn unit(n: u32) -> UsageUnit {
        UsageUnit::address(format!("addr{}", n), format!("m/84'/0'/0'/0/{}", n), format!("#{}", n))
    }

    fn used(n: u32, balance: u64, at: Option<i64>) -> UsageResult {
        UsageResult {
            has_transactions: true,
            balance_satoshis: balance,
            earliest_activity: at.and_then(|t| DateTime::<Utc>::from_timestamp(t, 0)),
            source: Some("mock".to_string()),
            ..UsageResult::empty(unit(n))
        }
    }

    #[test]
    fn test_empty() {
        let report = aggregate(&[]);
        assert!(!report.any_used);
        assert_eq!(report.total_balance, 0);
        assert_eq!(report.earliest_activity, None);
        assert_eq!(report.verdict, UsageVerdict::Unused);
    }

    #[test]
    fn test_used_and_unused() {
        let report = aggregate(&[used(0, 500, None), UsageResult::empty(unit(1))]);
        assert!(report.any_used);
        assert_eq!(report.total_balance, 500);
        assert_eq!(report.verdict, UsageVerdict::Used);
    }

    #[test]
    fn test_earliest_is_minimum() {
        let report = aggregate(&[used(0, 0, Some(1_600_000_000)), used(1, 0, Some(1_500_000_000))]);
        assert_eq!(report.earliest_activity.unwrap().timestamp(), 1_500_000_000);
    }

    #[test]
    fn test_missing_timestamp_makes_date_unknown() {
        let report = aggregate(&[used(0, 0, Some(1_500_000_000)), used(1, 0, None)]);
        assert!(report.any_used);
        assert_eq!(report.earliest_activity, None);
    }

    #[test]
    fn test_all_failed_is_undetermined() {
        let report = aggregate(&[
            UsageResult::failed(unit(0), "timeout"),
            UsageResult::failed(unit(1), "API error: 503"),
        ]);
        assert!(!report.any_used);
        assert_eq!(report.failed_units, 2);
        assert_eq!(report.verdict, UsageVerdict::Undetermined);
    }

    #[test]
    fn test_partial_failure_is_unused() {
        let report = aggregate(&[UsageResult::failed(unit(0), "timeout"), UsageResult::empty(unit(1))]);
        assert_eq!(report.failed_units, 1);
        assert_eq!(report.verdict, UsageVerdict::Unused);
    }
}
