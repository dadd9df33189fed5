//! Argument/return resolution for the System V AMD64 calling convention.
//!
//! The convention facts live in [`registers`]; everything that needs an
//! actual instruction (reading a live XMM register, draining the x87 stack
//! for a long double) sits behind the [`ArchAccess`] capability trait so the
//! resolver logic itself stays architecture-neutral.

pub mod arch;
pub mod registers;
pub mod resolver;

pub use arch::ArchAccess;
pub use registers::{CallContext, RegisterSnapshot, FLOAT_ARG_REGS, INT_ARG_REGS};
pub use resolver::ArgResolver;

#[cfg(target_arch = "x86_64")]
pub use arch::X86Access;
