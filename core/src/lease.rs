//! Single-emulator ownership guard
//!
//! Emulator cores keep process-global state, so at most one may be live per
//! thread. An [`EmulatorLease`] is taken before the core is created and held
//! until it has been dropped.

use std::cell::Cell;
use std::marker::PhantomData;

use crate::error::EnvError;

thread_local! {
    static LEASE_HELD: Cell<bool> = const { Cell::new(false) };
}

/// RAII proof that this thread owns the live emulator
///
/// Not `Send`: the lease belongs to the thread that acquired it.
#[derive(Debug)]
pub struct EmulatorLease {
    _not_send: PhantomData<*const ()>,
}

impl EmulatorLease {
    /// Take the lease
    ///
    /// # Errors
    /// [`EnvError::EmulatorInUse`] if another lease is alive on this thread.
    pub fn acquire() -> Result<Self, EnvError> {
        LEASE_HELD.with(|held| {
            if held.replace(true) {
                Err(EnvError::EmulatorInUse)
            } else {
                tracing::trace!("emulator lease acquired");
                Ok(Self {
                    _not_send: PhantomData,
                })
            }
        })
    }

    /// Whether a lease is currently held on this thread
    pub fn is_held() -> bool {
        LEASE_HELD.with(Cell::get)
    }
}

impl Drop for EmulatorLease {
    fn drop(&mut self) {
        LEASE_HELD.with(|held| held.set(false));
        tracing::trace!("emulator lease released");
    }
}
