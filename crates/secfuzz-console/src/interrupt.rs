//! Ctrl+C while a command runs.
//!
//! While the line editor waits for input it owns the terminal and reports
//! Ctrl+C itself. During command execution SIGINT lands here instead and only
//! sets a flag; long-running commands poll it.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route SIGINT to this flag. At most once per process.
    pub fn install_ctrlc_handler(&self) -> Result<()> {
        let flag = self.0.clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })
        .context("Failed to set Ctrl+C handler")
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let a = InterruptFlag::new();
        let b = a.clone();
        assert!(!b.is_raised());
        a.raise();
        assert!(b.is_raised());
        b.clear();
        assert!(!a.is_raised());
    }
}
