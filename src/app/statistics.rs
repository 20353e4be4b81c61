//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::engine::{BatchOutcome, RunProgress, RunReport};
use crate::error_handling::{ErrorType, ProcessingStats};

/// Prints a one-line summary of a finished run plus its failed batches.
pub fn print_run_summary(report: &RunReport) {
    let kind = report.kind.map_or("EMPTY", |k| k.as_str());
    info!(
        "✅ [{}] Updated {} of {} item{} ({} failed) in {} batch{}, {} round{}, {} retr{} - {:.1}s",
        kind,
        report.updated_count,
        report.attempted_items,
        if report.attempted_items == 1 { "" } else { "s" },
        report.failed_items,
        report.batches,
        if report.batches == 1 { "" } else { "es" },
        report.rounds,
        if report.rounds == 1 { "" } else { "s" },
        report.retries,
        if report.retries == 1 { "y" } else { "ies" },
        report.elapsed_seconds
    );

    for result in report.results.iter().filter(|r| !r.outcome.is_accepted()) {
        info!(
            "   batch {} ({} items, attempt {}): {}",
            result.batch_index,
            result.items,
            result.attempt,
            result.error.as_deref().unwrap_or("failed")
        );
    }

    let partial = report
        .results
        .iter()
        .filter(|r| r.outcome == BatchOutcome::PartialUserError)
        .count();
    if partial > 0 {
        info!("   {} batch(es) had items rejected by the remote", partial);
    }
}

/// Prints the process-wide engine counters.
pub fn print_progress_summary(progress: &RunProgress) {
    info!(
        "Runs: {} completed, {} active; {} rounds, {} batches ({} failed), {} items updated, {} retries",
        RunProgress::get(&progress.completed_runs),
        RunProgress::get(&progress.active_runs),
        RunProgress::get(&progress.rounds),
        RunProgress::get(&progress.batches_dispatched),
        RunProgress::get(&progress.batches_failed),
        RunProgress::get(&progress.items_updated),
        RunProgress::get(&progress.retries),
    );
}

/// Prints failure counts by category to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    if total_errors == 0 {
        return;
    }

    info!("Error Counts ({} total):", total_errors);
    for error_type in ErrorType::iter() {
        let count = error_stats.get_error_count(error_type);
        if count > 0 {
            info!("   {}: {}", error_type.as_str(), count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::OperationKind;

    #[test]
    fn test_print_error_statistics_empty() {
        print_error_statistics(&ProcessingStats::new());
    }

    #[test]
    fn test_print_error_statistics_with_counts() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::Throttled);
        stats.add_errors(ErrorType::UserError, 2);
        print_error_statistics(&stats);
        assert_eq!(stats.total_errors(), 3);
    }

    #[test]
    fn test_print_run_summary_empty_report() {
        print_run_summary(&RunReport::empty(Some(OperationKind::SetQuantity)));
        print_run_summary(&RunReport::empty(None));
    }

    #[test]
    fn test_print_progress_summary() {
        print_progress_summary(&RunProgress::new());
    }
}
