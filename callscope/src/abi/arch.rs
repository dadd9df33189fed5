//! Instruction-level register access behind a capability trait.
//!
//! Two capabilities need an actual instruction on x86-64: reading a live
//! XMM argument register (they are not part of the generic hook snapshot)
//! and capturing an x87 long-double return value (not representable in the
//! generic return capture path). Isolating them here keeps the resolver's
//! branching architecture-neutral and lets tests substitute canned values.

use crate::domain::VALUE_CAPACITY;

/// Architecture capabilities the resolver needs beyond the snapshot.
pub trait ArchAccess {
    /// Read the low 64 bits of vector argument register `reg`, or `None`
    /// if `reg` is outside the convention's vector argument range.
    fn read_vector_register(&self, reg: usize) -> Option<u64>;

    /// Capture an extended-precision floating-point return value.
    fn read_long_double_return(&self) -> [u8; VALUE_CAPACITY];
}

/// Live x86-64 implementation.
///
/// Only meaningful inside a trace hook, while the traced call's register
/// state is still intact; the exit hook must call
/// [`ArchAccess::read_long_double_return`] before anything else touches the
/// x87 stack.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Default, Clone, Copy)]
pub struct X86Access;

#[cfg(target_arch = "x86_64")]
impl ArchAccess for X86Access {
    fn read_vector_register(&self, reg: usize) -> Option<u64> {
        use std::arch::asm;

        let bits: u64;
        unsafe {
            match reg {
                0 => asm!("movq {0}, xmm0", out(reg) bits, options(nomem, nostack, preserves_flags)),
                1 => asm!("movq {0}, xmm1", out(reg) bits, options(nomem, nostack, preserves_flags)),
                2 => asm!("movq {0}, xmm2", out(reg) bits, options(nomem, nostack, preserves_flags)),
                3 => asm!("movq {0}, xmm3", out(reg) bits, options(nomem, nostack, preserves_flags)),
                4 => asm!("movq {0}, xmm4", out(reg) bits, options(nomem, nostack, preserves_flags)),
                5 => asm!("movq {0}, xmm5", out(reg) bits, options(nomem, nostack, preserves_flags)),
                6 => asm!("movq {0}, xmm6", out(reg) bits, options(nomem, nostack, preserves_flags)),
                7 => asm!("movq {0}, xmm7", out(reg) bits, options(nomem, nostack, preserves_flags)),
                _ => return None,
            }
        }
        Some(bits)
    }

    fn read_long_double_return(&self) -> [u8; VALUE_CAPACITY] {
        use std::arch::asm;

        let mut buf = [0u8; VALUE_CAPACITY];
        // Pop st(0) to memory and reload it, leaving the x87 stack as the
        // traced function left it.
        unsafe {
            asm!(
                "fstp tbyte ptr [{0}]",
                "fld tbyte ptr [{0}]",
                in(reg) buf.as_mut_ptr(),
                options(nostack),
            );
        }
        buf
    }
}
