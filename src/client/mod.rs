//! Client-side building blocks: small stateful components that own their
//! timers and listeners and release them on drop. None of them fail; on any
//! error they fall back to a neutral state.

pub mod customer_filter;
pub mod debounce;
pub mod modal;
pub mod offline;
pub mod postal;
pub mod viewport;

pub use customer_filter::{CustomerSearch, CustomerSummary};
pub use debounce::Debouncer;
pub use modal::{Focus, Key, KeyBindings, ModalKeys};
pub use offline::{CacheStorage, CachedPage, Navigation, OfflineFallback};
pub use postal::{AddressApi, PostalAddress, PostalLookup, ZipcloudApi};
pub use viewport::{BreakpointWatch, Viewport, MOBILE_BREAKPOINT};

use std::sync::{Mutex, MutexGuard};

/// Lock ignoring poisoning; these components hold no invariants a panic could break.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
