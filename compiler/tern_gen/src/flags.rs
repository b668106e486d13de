//! Generator lifecycle flags.

use bitflags::bitflags;

bitflags! {
    /// Lifecycle phase of a generator.
    ///
    /// - Fresh: empty set
    /// - Suspended: `STARTED | SUSPENDED` (engine frame captured, or a
    ///   delegation in progress)
    /// - Finished: `STARTED | FINISHED`, never with `SUSPENDED`
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Lifecycle: u8 {
        /// The body has been entered at least once.
        const STARTED = 1 << 0;
        /// Terminal: no more pairs will be produced.
        const FINISHED = 1 << 1;
        /// Paused at a yield point, waiting for the next advance.
        const SUSPENDED = 1 << 2;
    }
}

impl Lifecycle {
    /// Flags of a generator that has reached its terminal state.
    pub const TERMINAL: Lifecycle = Lifecycle::STARTED.union(Lifecycle::FINISHED);

    #[inline]
    pub fn is_started(self) -> bool {
        self.contains(Lifecycle::STARTED)
    }

    #[inline]
    pub fn is_finished(self) -> bool {
        self.contains(Lifecycle::FINISHED)
    }

    #[inline]
    pub fn is_suspended(self) -> bool {
        self.contains(Lifecycle::SUSPENDED)
    }
}
