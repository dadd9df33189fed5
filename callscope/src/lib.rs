//! # Callscope - x86-64 tracer core
//!
//! Callscope is the architecture-specific engine of a user-space function
//! tracer. Given the raw CPU and stack state captured when a trace hook
//! fires, it answers "what are the argument and return values of this call?",
//! and for binaries linked with eager PLT resolution (bind-now) it rebuilds
//! the interception point the tracer would otherwise lose.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Traced Process                       │
//! │         (entry/exit hooks fire on traced calls)         │
//! └─────────────────────────┬───────────────────────────────┘
//!                           │ captured registers + stack
//!                           ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Callscope (This Crate)                  │
//! │                                                         │
//! │  ┌──────────────┐                  ┌──────────────┐     │
//! │  │ ArgResolver  │                  │  PLT hook    │     │
//! │  │   (abi)      │                  │  (plthook)   │     │
//! │  └──────┬───────┘                  └──────┬───────┘     │
//! │         │ per call/argument               │ once, at    │
//! │         ▼                                 ▼ init        │
//! │  ┌──────────────┐                  ┌──────────────┐     │
//! │  │    Value     │                  │  Trampoline  │     │
//! │  │ (tagged)     │                  │    Table     │     │
//! │  └──────────────┘                  └──────────────┘     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`abi`]: the argument/return resolver for the System V AMD64 calling
//!   convention (6 integer argument registers, 8 vector argument registers,
//!   stack slots after register exhaustion)
//! - [`plthook`]: per-symbol executable trampolines that keep dynamic-symbol
//!   calls interceptable in bind-now binaries, with a write-XOR-execute
//!   region lifecycle
//! - [`domain`]: core value types (`ArgumentSpec`, `Value`) and structured
//!   errors
//!
//! ## Key Concepts
//!
//! - **Calling convention**: the fixed rule set assigning arguments to
//!   registers and stack slots; this crate hard-codes the x86-64 table
//! - **PLT/GOT**: the stub table and address table that route calls to
//!   dynamically linked functions
//! - **Bind-now**: eager GOT resolution at load time, which bypasses the
//!   lazy-binding stub the tracer normally hooks
//! - **Trampoline**: a synthesized stub that reinserts an interception
//!   point after bind-now resolution
//!
//! Probe insertion, symbol-table loading, event recording, and general ELF
//! loading live in other crates of the tracer; this one only holds the ABI
//! and machine-code knowledge they share.

pub mod abi;
pub mod domain;
pub mod plthook;

pub use abi::{ArchAccess, ArgResolver, CallContext, RegisterSnapshot};
pub use domain::{
    ArgLocation, ArgumentSpec, DynamicSymbolEntry, InstallError, ResolveError, Value, ValueFormat,
};
pub use plthook::{
    install_bind_now_trampolines, BinaryImage, ElfImage, PltHookRegistry, SectionInfo,
    TrampolineTable,
};

#[cfg(target_arch = "x86_64")]
pub use abi::X86Access;
