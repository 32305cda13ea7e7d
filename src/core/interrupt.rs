//! Ctrl-C handling for batch runs.
//!
//! The first SIGINT/SIGTERM only raises a flag; the driver checks it between
//! files so the file being written is finished. A second signal exits
//! immediately.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use crate::core::constants::EXIT_INTERRUPTED;

/// Shared interruption flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// A flag nothing will ever raise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register signal handlers that raise this flag.
    pub fn install() -> io::Result<Self> {
        let interrupt = Self::new();
        for sig in [SIGINT, SIGTERM] {
            // Order matters: the conditional shutdown sees the flag before
            // the plain handler sets it, so only a second signal exits.
            flag::register_conditional_shutdown(sig, EXIT_INTERRUPTED, Arc::clone(&interrupt.0))?;
            flag::register(sig, Arc::clone(&interrupt.0))?;
        }
        Ok(interrupt)
    }

    /// Raise the flag by hand.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
