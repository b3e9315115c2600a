use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared interrupt flag between the Ctrl-C handler, the provider and the spinner.
///
/// `busy` is raised while a provider call is in flight. An interrupt outside of that window
/// exits immediately since nothing has been committed yet.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    busy: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Mark a blocking call as in flight until the returned guard drops.
    pub fn enter_busy(&self) -> BusyGuard {
        self.busy.store(true, Ordering::SeqCst);
        BusyGuard {
            busy: Arc::clone(&self.busy),
        }
    }
}

pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Route Ctrl-C into the token.
pub fn install_interrupt_handler(token: &CancelToken) -> Result<()> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        if token.is_busy() {
            token.cancel();
        } else {
            eprintln!();
            std::process::exit(130);
        }
    })
    .context("failed to set Ctrl-C handler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_guard_clears_on_drop() {
        let token = CancelToken::new();
        {
            let _guard = token.enter_busy();
            assert!(token.is_busy());
        }
        assert!(!token.is_busy());
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
    }
}
