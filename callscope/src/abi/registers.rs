//! x86-64 argument register numbering and the captured call state.
//!
//! The System V AMD64 convention passes the first six integer/pointer
//! arguments in rdi, rsi, rdx, rcx, r8, r9 and the first eight
//! floating-point arguments in xmm0-xmm7; everything after that spills to
//! the stack. Porting to another architecture means replacing this table,
//! not the resolver algorithms.

/// Integer argument registers in the convention.
pub const INT_ARG_REGS: usize = 6;

/// Vector (floating-point) argument registers in the convention.
pub const FLOAT_ARG_REGS: usize = 8;

/// Base of the vector register id space, keeping it disjoint from the
/// integer ids.
pub const FLOAT_BASE: usize = 100;

/// Register ids accepted by [`crate::domain::ArgLocation::Register`].
pub mod reg {
    use super::FLOAT_BASE;

    pub const RDI: usize = 0;
    pub const RSI: usize = 1;
    pub const RDX: usize = 2;
    pub const RCX: usize = 3;
    pub const R8: usize = 4;
    pub const R9: usize = 5;

    pub const XMM0: usize = FLOAT_BASE;
    pub const XMM1: usize = FLOAT_BASE + 1;
    pub const XMM2: usize = FLOAT_BASE + 2;
    pub const XMM3: usize = FLOAT_BASE + 3;
    pub const XMM4: usize = FLOAT_BASE + 4;
    pub const XMM5: usize = FLOAT_BASE + 5;
    pub const XMM6: usize = FLOAT_BASE + 6;
    pub const XMM7: usize = FLOAT_BASE + 7;
}

/// The integer argument registers captured by the entry hook, in calling-
/// convention order. Vector registers are not part of the generic snapshot;
/// they are read live through [`super::ArchAccess`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct RegisterSnapshot {
    pub rdi: u64,
    pub rsi: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub r8: u64,
    pub r9: u64,
}

impl RegisterSnapshot {
    /// Value of the numbered argument register, `None` outside the table.
    #[must_use]
    pub fn arg(&self, id: usize) -> Option<u64> {
        match id {
            reg::RDI => Some(self.rdi),
            reg::RSI => Some(self.rsi),
            reg::RDX => Some(self.rdx),
            reg::RCX => Some(self.rcx),
            reg::R8 => Some(self.r8),
            reg::R9 => Some(self.r9),
            _ => None,
        }
    }
}

/// Captured state of one traced call.
///
/// Valid only for the duration of a single hook invocation, on the thread
/// that made the traced call. Each context is call-local; the resolver never
/// shares state between concurrent traced threads.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    pub regs: RegisterSnapshot,
    /// Stack memory at the point of the call; word 0 is the base reference
    /// for [`crate::domain::ArgLocation::StackOffset`].
    pub stack_base: *const u64,
    /// Captured return-value storage, null until the exit hook fires.
    pub retval: *const u8,
}

impl CallContext {
    /// Build an entry-side context.
    ///
    /// # Safety
    ///
    /// `stack_base` must point into the traced call's live stack so that
    /// every word offset a resolved spec names is readable.
    #[must_use]
    pub unsafe fn new(regs: RegisterSnapshot, stack_base: *const u64) -> Self {
        Self { regs, stack_base, retval: std::ptr::null() }
    }

    /// Attach the exit-side return-value storage.
    ///
    /// # Safety
    ///
    /// `retval` must point to at least [`crate::domain::VALUE_CAPACITY`]
    /// readable bytes of captured return storage.
    #[must_use]
    pub unsafe fn with_retval(mut self, retval: *const u8) -> Self {
        self.retval = retval;
        self
    }
}
