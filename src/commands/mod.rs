pub mod export;
pub mod fields;
pub mod reconcile;
pub mod sync;

use tasksync_core::SyncOutcome;

/// Print the per-field decision trace for one task.
pub fn print_decisions(outcome: &SyncOutcome) {
    for field_outcome in &outcome.decisions {
        println!(
            "    {:<14} {}",
            field_outcome.field.name(),
            field_outcome.decision
        );
    }
}
