//! Bind-now PLT trampolines.
//!
//! A bind-now binary resolves every GOT entry eagerly at load, bypassing
//! the lazy-binding stub the tracer normally hooks. This module rebuilds the
//! interception point: one private executable stub per dynamic symbol, each
//! pushing its symbol index and funneling into the binary's real `.plt`
//! entry, installed once at initialization and sealed read+execute.

pub mod image;
pub mod install;
pub mod stub;
pub mod table;

pub use image::{BinaryImage, ElfImage, SectionInfo};
pub use install::{install_bind_now_trampolines, PltHookRegistry, SKIP_SYMBOLS};
pub use stub::{Stub, GOT_ENTRY_SIZE, STUB_SIZE};
pub use table::TrampolineTable;
