//! Bind-now trampoline installation.
//!
//! Runs once, single-threaded, at initialization, before any traced call
//! can reach the affected PLT entries. For each dynamic symbol it recovers
//! the GOT slot its PLT entry indirects through, hands that slot to the
//! tracer's PLT hook registry, and writes a private stub that keeps the
//! symbol index observable on the way into the binary's real `.plt`.

use log::{debug, warn};

use crate::domain::{DynamicSymbolEntry, InstallError};
use crate::plthook::image::BinaryImage;
use crate::plthook::stub::{
    jump_displacement, Stub, GOT_ENTRY_SIZE, JMP_INSN_SIZE, R_OFFSET_POS, STUB_SIZE,
};
use crate::plthook::table::{StubRegion, TrampolineTable};

/// Symbols that must never be routed through a trampoline: the tracer's own
/// probe entry points (recursive interception) and the libc finalizer
/// (shutdown-time corruption).
pub const SKIP_SYMBOLS: &[&str] = &[
    "mcount",
    "__fentry__",
    "__cyg_profile_func_enter",
    "__cyg_profile_func_exit",
    "__cxa_finalize",
];

/// The tracer's PLT hook bookkeeping, owned outside this crate.
pub trait PltHookRegistry {
    /// Set up per-binary hook state for `symbols`. Called exactly once,
    /// before any GOT entry is registered.
    fn prepare(&mut self, symbols: &[DynamicSymbolEntry]);

    /// Install the tracer's common resolution handler at `got_index` with
    /// `stub_addr` as the redirect target, returning the symbol's real
    /// resolved address.
    fn register_got_entry(
        &mut self,
        got_index: usize,
        symbol_index: usize,
        stub_addr: u64,
    ) -> Result<u64, InstallError>;
}

/// Build and seal the bind-now trampoline table for one binary.
///
/// `load_offset` is the runtime load bias of the binary; `got_addr` the
/// runtime address of its PLT GOT region. Per-symbol problems skip the
/// symbol; allocation failure or a missing `.plt` section abort the whole
/// installation, leaving nothing executable behind.
pub fn install_bind_now_trampolines(
    image: &dyn BinaryImage,
    symbols: &[DynamicSymbolEntry],
    registry: &mut dyn PltHookRegistry,
    load_offset: u64,
    got_addr: u64,
) -> Result<TrampolineTable, InstallError> {
    registry.prepare(symbols);

    let mut region = StubRegion::alloc(symbols.len() + 1)?;
    debug!(
        "setup bind-now PLT trampoline at {:#x} ({} symbols)",
        region.base_addr(),
        symbols.len()
    );

    let mut installed = vec![false; symbols.len()];
    let mut resolved = vec![None; symbols.len()];

    for (idx, sym) in symbols.iter().enumerate() {
        if SKIP_SYMBOLS.contains(&sym.name.as_str()) {
            debug!("skipping unsafe symbol {}", sym.name);
            continue;
        }

        let Some(got_index) = got_index_for(image, sym, got_addr) else { continue };

        let stub_addr = region.base_addr() + (idx * STUB_SIZE) as u64;
        let real_addr = match registry.register_got_entry(got_index, idx, stub_addr) {
            Ok(addr) => addr,
            Err(err) => {
                warn!("PLT hook registration failed for {}: {err}", sym.name);
                continue;
            }
        };

        let disp = jump_displacement(idx, symbols.len());
        region.write(idx * STUB_SIZE, Stub::for_symbol(idx as u32, disp).bytes());
        resolved[idx] = Some(real_addr);
        installed[idx] = true;

        debug!(
            "[{idx}] {} got idx {got_index}, real address = {real_addr:#x}, \
             target addr = {stub_addr:#x}, jump offset = {disp:#x}",
            sym.name
        );
    }

    // Every stub ultimately falls through into the binary's real PLT entry
    // point, with the symbol index still on the stack.
    let plt = image
        .sections()
        .iter()
        .find(|s| s.name == ".plt")
        .ok_or(InstallError::PltSectionNotFound)?;
    let tail_target = plt.addr + load_offset;
    debug!("real address to jump: {tail_target:#x}");
    region.write(symbols.len() * STUB_SIZE, &tail_target.to_le_bytes());

    let sealed = region.seal()?;
    Ok(TrampolineTable::new(sealed, installed, resolved))
}

/// Recover the GOT index a symbol's PLT entry indirects through.
///
/// The entry embeds a 32-bit relocation offset; the referenced GOT slot is
/// that offset plus the entry address plus the jump instruction length. The
/// resulting index can differ from the symbol's table index because PLT and
/// GOT ordering need not match.
fn got_index_for(
    image: &dyn BinaryImage,
    sym: &DynamicSymbolEntry,
    got_addr: u64,
) -> Option<usize> {
    let mut raw = [0u8; 4];
    if let Err(err) = image.read(sym.addr + R_OFFSET_POS, &mut raw) {
        warn!("cannot read PLT entry of {}: {err}", sym.name);
        return None;
    }
    let r_offset = u64::from(u32::from_le_bytes(raw));
    let slot_addr = r_offset + sym.addr + JMP_INSN_SIZE;

    let Some(delta) = slot_addr.checked_sub(got_addr) else {
        warn!("GOT slot {slot_addr:#x} of {} below GOT base {got_addr:#x}", sym.name);
        return None;
    };
    if delta % GOT_ENTRY_SIZE != 0 {
        warn!("misaligned GOT slot {slot_addr:#x} for {}", sym.name);
        return None;
    }
    Some((delta / GOT_ENTRY_SIZE) as usize)
}
