use crate::application::{ItemOutcome, TransactionMode, TransactionReport};
use crate::error::PacmineError;

fn skip_lines(skipped: &[PacmineError]) -> Vec<String> {
    skipped.iter().map(|w| format!("   [SKIP] {}", w)).collect()
}

/// Requests the planner dropped, one line each.
pub(crate) fn print_skipped(skipped: &[PacmineError]) {
    for line in skip_lines(skipped) {
        println!("{}", line);
    }
}

fn plan_failure_lines(err: &anyhow::Error) -> Vec<String> {
    match err.downcast_ref::<PacmineError>() {
        Some(PacmineError::NoResolvablePackages { reasons }) => skip_lines(reasons),
        _ => vec![],
    }
}

/// Print the skip reasons carried by a `NoResolvablePackages` failure.
pub(crate) fn print_plan_failure(err: &anyhow::Error) {
    for line in plan_failure_lines(err) {
        println!("{}", line);
    }
}

/// Print the per-item outcome of a transaction.
pub(crate) fn print_report(report: &TransactionReport) {
    if report.cancelled {
        match report.mode {
            TransactionMode::Install => println!("Installation cancelled."),
            TransactionMode::Remove => println!("Removal cancelled."),
        }
        return;
    }

    for item in &report.items {
        match item.outcome {
            ItemOutcome::Failed => {
                println!("   {:<9} {}: {}", item.outcome.to_string(), item.name, item.detail)
            }
            _ => println!("   {:<9} {} {}", item.outcome.to_string(), item.name, item.detail),
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        println!(
            "{} of {} package(s) failed.",
            failed,
            report.items.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_failure_lists_every_reason() {
        let err: anyhow::Error = PacmineError::NoResolvablePackages {
            reasons: vec![
                PacmineError::CatalogEmpty {
                    query: "ghost".into(),
                },
                PacmineError::NoCompatibleVersion {
                    name: "LuminaCore".into(),
                    runtime_version: "1.20.1".into(),
                },
            ],
        }
        .into();

        assert_eq!(
            plan_failure_lines(&err),
            vec![
                "   [SKIP] No package matches 'ghost'",
                "   [SKIP] 'LuminaCore' has no release compatible with 1.20.1",
            ]
        );
    }

    #[test]
    fn test_other_failures_print_nothing() {
        let err: anyhow::Error = PacmineError::EnvironmentNotInitialized {
            path: ".pacmine/env".into(),
        }
        .into();
        assert!(plan_failure_lines(&err).is_empty());
    }
}
