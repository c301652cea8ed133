//! Ctrl+C handling.
//!
//! Outside a workflow run an interrupt ends the process straight away. While
//! a run is in progress it is only recorded, and the batch loop stops once the
//! run has finished moving its files.

use crate::error::{ErrorKind, Result};
use crate::recorder;
use exn::ResultExt;
use std::sync::atomic::{AtomicBool, Ordering};

static IN_CRITICAL_SECTION: AtomicBool = AtomicBool::new(false);
static REQUESTED: AtomicBool = AtomicBool::new(false);

pub fn install() -> Result<()> {
    ctrlc::set_handler(|| {
        REQUESTED.store(true, Ordering::SeqCst);
        if IN_CRITICAL_SECTION.load(Ordering::SeqCst) {
            eprintln!("\nInterrupted; exiting once the current scan is finished...");
            tracing::warn!("Interrupt received during a workflow run");
        } else {
            eprintln!("\nExiting...");
            tracing::info!("Exiting...");
            recorder::finish();
            std::process::exit(0);
        }
    })
    .or_raise(|| ErrorKind::Interrupt)
}

/// Whether an interrupt arrived during a critical section.
pub fn requested() -> bool {
    REQUESTED.load(Ordering::SeqCst)
}

/// Defers interrupts until dropped.
#[must_use]
pub struct CriticalSection(());
impl CriticalSection {
    pub fn enter() -> Self {
        IN_CRITICAL_SECTION.store(true, Ordering::SeqCst);
        Self(())
    }
}
impl Drop for CriticalSection {
    fn drop(&mut self) {
        IN_CRITICAL_SECTION.store(false, Ordering::SeqCst);
    }
}
