//! Stack growth for nested delegation.
//!
//! Advancing a generator that delegates to a generator that delegates to
//! another generator recurses once per link of the chain, and each link may
//! re-enter the VM. Every hop runs through `ensure_sufficient_stack` so long
//! chains grow the native stack instead of overflowing it.
//!
//! For WASM targets where stacker isn't available, the closure is called
//! directly.

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Remaining stack below which we grow (128KB; a VM resume can be deep).
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each new stack segment (2MB).
    const SEGMENT: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

/// WASM version - call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
