//! The per-symbol trampoline stub and the x86-64 PLT/GOT layout facts.
//!
//! Every stub is the same 16 bytes with two patch sites:
//!
//! ```text
//! 68 xx xx xx xx        push  imm32        ; symbol index
//! ff 25 xx xx xx xx     jmp   *disp32(%rip); through the tail slot
//! cc cc cc cc cc        int3 padding
//! ```
//!
//! The indirect jump of stub `i` reads the table's final slot, which holds
//! the runtime address of the binary's `.plt`; the displacement therefore
//! only depends on how far stub `i` sits from the tail.

/// Size of one stub slot (and of the tail slot).
pub const STUB_SIZE: usize = 16;

/// Byte position of the 32-bit relocation offset inside a PLT entry.
pub const R_OFFSET_POS: u64 = 2;

/// Length of the GOT-referencing jump instruction in a PLT entry.
pub const JMP_INSN_SIZE: u64 = 6;

/// Width of one GOT entry.
pub const GOT_ENTRY_SIZE: u64 = 8;

/// Patch site of the pushed symbol index.
const PUSH_IDX_POS: usize = 1;

/// Patch site of the rip-relative jump displacement.
const JMP_DISP_POS: usize = 7;

/// int3 padding bytes between the jump and the end of a stub.
const TAIL_PAD: usize = 5;

const TEMPLATE: [u8; STUB_SIZE] = [
    0x68, 0x00, 0x00, 0x00, 0x00, // push $idx
    0xff, 0x25, 0x00, 0x00, 0x00, 0x00, // jmp *(offset)
    0xcc, 0xcc, 0xcc, 0xcc, 0xcc, // padding
];

/// A fully patched stub, ready to be copied into its table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stub {
    bytes: [u8; STUB_SIZE],
}

impl Stub {
    /// Patch the symbol index and jump displacement into a fresh template.
    #[must_use]
    pub fn for_symbol(index: u32, jump_disp: u32) -> Self {
        let mut bytes = TEMPLATE;
        bytes[PUSH_IDX_POS..PUSH_IDX_POS + 4].copy_from_slice(&index.to_le_bytes());
        bytes[JMP_DISP_POS..JMP_DISP_POS + 4].copy_from_slice(&jump_disp.to_le_bytes());
        Self { bytes }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8; STUB_SIZE] {
        &self.bytes
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        let mut field = [0u8; 4];
        field.copy_from_slice(&self.bytes[PUSH_IDX_POS..PUSH_IDX_POS + 4]);
        u32::from_le_bytes(field)
    }

    #[must_use]
    pub fn jump_disp(&self) -> u32 {
        let mut field = [0u8; 4];
        field.copy_from_slice(&self.bytes[JMP_DISP_POS..JMP_DISP_POS + 4]);
        u32::from_le_bytes(field)
    }
}

/// rip-relative displacement from stub `index` to the tail slot of a table
/// holding `total` symbols: earlier indices sit farther from the tail.
#[must_use]
pub fn jump_displacement(index: usize, total: usize) -> u32 {
    ((total - index - 1) * STUB_SIZE + TAIL_PAD) as u32
}
