//! Dry-run mode: mutating kubectl/minikube invocations are printed, not run

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

static DRY_RUN: AtomicBool = AtomicBool::new(false);

/// Enable or disable dry-run mode for the rest of the process
pub fn set_dry_run(enabled: bool) {
    DRY_RUN.store(enabled, Ordering::SeqCst);
}

/// Check if dry-run mode is enabled
pub fn is_dry_run() -> bool {
    DRY_RUN.load(Ordering::SeqCst)
}

/// Log a command that would have been executed
pub fn log_action(action: &str) {
    println!("  {} {}", "[DRY RUN]".cyan().bold(), action);
}

/// Execute function only if not in dry-run mode.
/// Returns Ok(()) in dry-run mode without executing.
pub fn exec_unless_dry_run<F>(action_desc: &str, f: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    if is_dry_run() {
        log_action(action_desc);
        Ok(())
    } else {
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test because the flag is process-global and tests run in parallel
    #[test]
    fn test_exec_unless_dry_run_both_modes() {
        set_dry_run(false);

        let mut executed = false;
        let result = exec_unless_dry_run("test action", || {
            executed = true;
            Ok(())
        });

        assert!(result.is_ok());
        assert!(executed);

        set_dry_run(true);
        assert!(is_dry_run());

        let mut executed = false;
        let result = exec_unless_dry_run("test action", || {
            executed = true;
            Ok(())
        });

        assert!(result.is_ok());
        assert!(!executed); // Should not execute in dry-run mode

        set_dry_run(false);
    }
}
