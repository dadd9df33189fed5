//! Core value types shared by the resolver and the trampoline installer.
//!
//! An [`ArgumentSpec`] tells the resolver where one argument or return value
//! lives; a [`Value`] is what comes back. The tagged [`Value`] union carries
//! its own size so downstream recording never has to reinterpret raw bytes.

/// Largest scalar the tracer can capture (an x87 long double padded to 16).
pub const VALUE_CAPACITY: usize = 16;

/// Where one argument or return value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgLocation {
    /// Explicit register id (see `abi::registers` for the numbering).
    Register(usize),
    /// 0-based positional argument index, assigned in calling-convention
    /// order; spills to the stack past the integer register count.
    Index(usize),
    /// 0-based index into the vector argument registers, a numbering space
    /// distinct from [`ArgLocation::Index`]; spills past the vector count.
    FloatIndex(usize),
    /// Signed word offset from the captured stack base.
    StackOffset(isize),
}

/// How the resolved bytes should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Integer,
    Pointer,
    Float,
    LongDouble,
    Raw,
}

/// Immutable description of one argument or return value.
///
/// Produced by the spec-parsing layer of the tracer, consumed only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub location: ArgLocation,
    /// Size in bytes, at most [`VALUE_CAPACITY`].
    pub size: usize,
    pub format: ValueFormat,
}

impl ArgumentSpec {
    #[must_use]
    pub fn new(location: ArgLocation, size: usize, format: ValueFormat) -> Self {
        Self { location, size, format }
    }
}

/// A resolved argument or return value.
///
/// Each variant carries its own size, so the byte-exact image a recorder
/// needs is always recoverable via [`Value::raw_bytes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Integer { bits: u64, size: usize },
    Pointer(u64),
    Float64(f64),
    LongDouble([u8; VALUE_CAPACITY]),
    Raw { bytes: [u8; VALUE_CAPACITY], len: usize },
}

impl Value {
    /// Size in bytes of the captured value.
    #[must_use]
    pub fn size(&self) -> usize {
        match *self {
            Value::Integer { size, .. } => size,
            Value::Pointer(_) | Value::Float64(_) => 8,
            Value::LongDouble(_) => 10,
            Value::Raw { len, .. } => len,
        }
    }

    /// Byte-exact little-endian image of the value and its length.
    #[must_use]
    pub fn raw_bytes(&self) -> ([u8; VALUE_CAPACITY], usize) {
        let mut out = [0u8; VALUE_CAPACITY];
        match *self {
            Value::Integer { bits, size } => {
                out[..8].copy_from_slice(&bits.to_le_bytes());
                (out, size)
            }
            Value::Pointer(addr) => {
                out[..8].copy_from_slice(&addr.to_le_bytes());
                (out, 8)
            }
            Value::Float64(v) => {
                out[..8].copy_from_slice(&v.to_bits().to_le_bytes());
                (out, 8)
            }
            Value::LongDouble(bytes) => (bytes, 10),
            Value::Raw { bytes, len } => (bytes, len),
        }
    }

    /// Interpret `len` captured bytes according to `format`.
    pub(crate) fn from_bytes(bytes: [u8; VALUE_CAPACITY], len: usize, format: ValueFormat) -> Self {
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[..8]);
        let bits = u64::from_le_bytes(word);
        match format {
            ValueFormat::Integer => {
                let bits = if len < 8 { bits & ((1u64 << (8 * len)) - 1) } else { bits };
                Value::Integer { bits, size: len }
            }
            ValueFormat::Pointer => Value::Pointer(bits),
            ValueFormat::Float => Value::Float64(f64::from_bits(bits)),
            ValueFormat::LongDouble => Value::LongDouble(bytes),
            ValueFormat::Raw => Value::Raw { bytes, len },
        }
    }
}

/// One entry of the traced binary's dynamic symbol table.
///
/// Produced by the symbol-table loader; `addr` is the runtime address of the
/// symbol's PLT entry, `index` its position in the dynamic symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicSymbolEntry {
    pub name: String,
    pub addr: u64,
    pub index: usize,
}
