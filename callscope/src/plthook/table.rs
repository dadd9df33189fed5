//! The trampoline memory region and its write-XOR-execute lifecycle.
//!
//! A [`StubRegion`] is mapped read+write, filled, then consumed by
//! [`StubRegion::seal`] into a [`SealedRegion`] that is read+execute and has
//! no write API, so the typestate makes the "never writable and executable
//! at the same time" invariant mechanically checkable. An unsealed region
//! unmaps on drop; a sealed one lives for the process lifetime.

use std::ptr::{self, NonNull};
use std::slice;

use crate::domain::InstallError;
use crate::plthook::stub::STUB_SIZE;

/// Writable, non-executable stub memory.
#[derive(Debug)]
pub(crate) struct StubRegion {
    base: NonNull<u8>,
    len: usize,
}

impl StubRegion {
    /// Map `slots` stub-sized slots of anonymous read+write memory.
    pub(crate) fn alloc(slots: usize) -> Result<Self, InstallError> {
        let len = slots * STUB_SIZE;
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(InstallError::TrampolineAlloc(len));
        }
        let base = NonNull::new(ptr.cast()).ok_or(InstallError::TrampolineAlloc(len))?;
        Ok(Self { base, len })
    }

    pub(crate) fn base_addr(&self) -> u64 {
        self.base.as_ptr() as u64
    }

    /// Copy `bytes` into the region at `offset`.
    pub(crate) fn write(&mut self, offset: usize, bytes: &[u8]) {
        assert!(offset + bytes.len() <= self.len);
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.base.as_ptr().add(offset), bytes.len());
        }
    }

    /// Flip the whole region to read+execute, exactly once.
    pub(crate) fn seal(self) -> Result<SealedRegion, InstallError> {
        let rc = unsafe {
            libc::mprotect(self.base.as_ptr().cast(), self.len, libc::PROT_READ | libc::PROT_EXEC)
        };
        if rc != 0 {
            // Self still owns the mapping; Drop unmaps it while it is
            // merely read+write.
            return Err(InstallError::ProtectFailed);
        }
        let sealed = SealedRegion { base: self.base, len: self.len };
        std::mem::forget(self);
        Ok(sealed)
    }
}

impl Drop for StubRegion {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base.as_ptr().cast(), self.len);
        }
    }
}

/// Read+execute stub memory. No write access, no unmap: once sealed the
/// table belongs to the process for its lifetime.
#[derive(Debug)]
pub(crate) struct SealedRegion {
    base: NonNull<u8>,
    len: usize,
}

impl SealedRegion {
    pub(crate) fn base_addr(&self) -> u64 {
        self.base.as_ptr() as u64
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        assert!(offset + len <= self.len);
        unsafe { slice::from_raw_parts(self.base.as_ptr().add(offset), len) }
    }
}

/// The installed bind-now trampoline table.
///
/// N stub slots (one per dynamic symbol, skipped symbols left empty)
/// followed by one tail slot holding the runtime address of the binary's
/// `.plt`. Built once at initialization by
/// [`crate::plthook::install_bind_now_trampolines`].
#[derive(Debug)]
pub struct TrampolineTable {
    region: SealedRegion,
    installed: Vec<bool>,
    resolved: Vec<Option<u64>>,
}

impl TrampolineTable {
    pub(crate) fn new(
        region: SealedRegion,
        installed: Vec<bool>,
        resolved: Vec<Option<u64>>,
    ) -> Self {
        Self { region, installed, resolved }
    }

    /// Runtime address of the first stub slot.
    #[must_use]
    pub fn base(&self) -> u64 {
        self.region.base_addr()
    }

    /// Total mapped size in bytes, including the tail slot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.region.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbol_count() == 0
    }

    /// Number of symbol slots (excluding the tail).
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.installed.len()
    }

    /// Number of slots that actually received a stub.
    #[must_use]
    pub fn stub_count(&self) -> usize {
        self.installed.iter().filter(|installed| **installed).count()
    }

    #[must_use]
    pub fn has_stub(&self, index: usize) -> bool {
        self.installed.get(index).copied().unwrap_or(false)
    }

    /// Runtime address of the stub slot for symbol `index`.
    #[must_use]
    pub fn stub_addr(&self, index: usize) -> u64 {
        self.base() + (index * STUB_SIZE) as u64
    }

    /// Raw bytes of the stub slot for symbol `index`.
    #[must_use]
    pub fn stub_bytes(&self, index: usize) -> [u8; STUB_SIZE] {
        let mut out = [0u8; STUB_SIZE];
        out.copy_from_slice(self.region.bytes(index * STUB_SIZE, STUB_SIZE));
        out
    }

    /// Real resolved address of symbol `index`, as reported by the PLT hook
    /// registry during installation.
    #[must_use]
    pub fn real_address(&self, index: usize) -> Option<u64> {
        self.resolved.get(index).copied().flatten()
    }

    /// The shared tail target every stub funnels into: the runtime address
    /// of the binary's `.plt`.
    #[must_use]
    pub fn tail_target(&self) -> u64 {
        let mut word = [0u8; 8];
        word.copy_from_slice(self.region.bytes(self.symbol_count() * STUB_SIZE, 8));
        u64::from_le_bytes(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn region_perms(addr: u64) -> Option<String> {
        let maps = fs::read_to_string("/proc/self/maps").ok()?;
        for line in maps.lines() {
            let mut parts = line.split_whitespace();
            let range = parts.next()?;
            let perms = parts.next()?;
            let (start, end) = range.split_once('-')?;
            let start = u64::from_str_radix(start, 16).ok()?;
            let end = u64::from_str_radix(end, 16).ok()?;
            if addr >= start && addr < end {
                return Some(perms.to_string());
            }
        }
        None
    }

    #[test]
    fn test_seal_makes_region_exec_not_writable() {
        let mut region = StubRegion::alloc(4).expect("alloc");
        region.write(0, &[0x90; STUB_SIZE]);

        let addr = region.base_addr();
        let perms = region_perms(addr).expect("mapped while writable");
        assert!(perms.starts_with("rw-"), "unexpected perms {perms}");

        let sealed = region.seal().expect("seal");
        let perms = region_perms(sealed.base_addr()).expect("mapped after seal");
        assert!(perms.starts_with("r-x"), "unexpected perms {perms}");
        assert_eq!(sealed.bytes(0, STUB_SIZE), &[0x90; STUB_SIZE]);
    }

    #[test]
    fn test_unsealed_region_unmaps_on_drop() {
        let region = StubRegion::alloc(2).expect("alloc");
        let addr = region.base_addr();
        assert!(region_perms(addr).is_some());

        drop(region);
        let perms = region_perms(addr);
        assert!(
            perms.as_deref().map_or(true, |p| !p.starts_with("r-x")),
            "dropped region left executable: {perms:?}"
        );
    }
}
