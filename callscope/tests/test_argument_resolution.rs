//! Calling-convention coverage for `ArgResolver::resolve_argument`:
//! positional indices against registers and stack spill slots, float
//! indices against vector registers and their double-word spill slots,
//! explicit register specs, and strict-mode range handling.

use std::cell::Cell;

use callscope::abi::registers::reg;
use callscope::{
    ArchAccess, ArgLocation, ArgResolver, ArgumentSpec, CallContext, RegisterSnapshot,
    ResolveError, Value, ValueFormat,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Canned vector registers and an x87 value, with call counters so tests
/// can prove which path was taken.
struct MockArch {
    xmm: [u64; 8],
    long_double: [u8; 16],
    vector_reads: Cell<usize>,
    x87_reads: Cell<usize>,
}

impl MockArch {
    fn new() -> Self {
        let mut xmm = [0u64; 8];
        for (i, slot) in xmm.iter_mut().enumerate() {
            *slot = (i as f64 * 1.5 + 0.25).to_bits();
        }
        let mut long_double = [0u8; 16];
        for (i, b) in long_double.iter_mut().enumerate() {
            *b = 0xd0 + i as u8;
        }
        Self { xmm, long_double, vector_reads: Cell::new(0), x87_reads: Cell::new(0) }
    }
}

impl ArchAccess for &MockArch {
    fn read_vector_register(&self, reg: usize) -> Option<u64> {
        let bits = *self.xmm.get(reg)?;
        self.vector_reads.set(self.vector_reads.get() + 1);
        Some(bits)
    }

    fn read_long_double_return(&self) -> [u8; 16] {
        self.x87_reads.set(self.x87_reads.get() + 1);
        self.long_double
    }
}

fn sample_regs() -> RegisterSnapshot {
    RegisterSnapshot {
        rdi: 0x1111,
        rsi: 0x2222,
        rdx: 0x3333,
        rcx: 0x4444,
        r8: 0x5555,
        r9: 0x6666,
    }
}

fn ctx(regs: RegisterSnapshot, stack: &[u64]) -> CallContext {
    unsafe { CallContext::new(regs, stack.as_ptr()) }
}

#[test]
fn test_positional_indices_read_argument_registers() {
    init_logging();
    let mock = MockArch::new();
    let resolver = ArgResolver::new(&mock);
    let stack = [0u64; 4];
    let ctx = ctx(sample_regs(), &stack);

    let expected = [0x1111u64, 0x2222, 0x3333, 0x4444, 0x5555, 0x6666];
    for (i, want) in expected.iter().enumerate() {
        let spec = ArgumentSpec::new(ArgLocation::Index(i), 8, ValueFormat::Integer);
        let value = resolver.resolve_argument(&ctx, &spec).unwrap();
        assert_eq!(value, Value::Integer { bits: *want, size: 8 }, "argument index {i}");
    }
    assert_eq!(mock.vector_reads.get(), 0);
}

#[test]
fn test_positional_index_past_registers_reads_stack() {
    init_logging();
    let mock = MockArch::new();
    let resolver = ArgResolver::new(&mock);
    let stack = [0xaa01u64, 0xaa02, 0xaa03, 0xaa04];
    let ctx = ctx(sample_regs(), &stack);

    // Index 6 is the first spilled argument: stack base + 0.
    for (i, want) in [(6usize, 0xaa01u64), (7, 0xaa02), (9, 0xaa04)] {
        let spec = ArgumentSpec::new(ArgLocation::Index(i), 8, ValueFormat::Integer);
        let value = resolver.resolve_argument(&ctx, &spec).unwrap();
        assert_eq!(value, Value::Integer { bits: want, size: 8 }, "argument index {i}");
    }
    assert_eq!(mock.vector_reads.get(), 0, "spilled arguments must not touch registers");
}

#[test]
fn test_float_indices_read_vector_registers() {
    init_logging();
    let mock = MockArch::new();
    let resolver = ArgResolver::new(&mock);
    let stack = [0u64; 4];
    let ctx = ctx(sample_regs(), &stack);

    for i in 0..8 {
        let spec = ArgumentSpec::new(ArgLocation::FloatIndex(i), 8, ValueFormat::Float);
        let value = resolver.resolve_argument(&ctx, &spec).unwrap();
        assert_eq!(value, Value::Float64(i as f64 * 1.5 + 0.25), "xmm{i}");
    }
    assert_eq!(mock.vector_reads.get(), 8);
}

#[test]
fn test_float_index_past_registers_reads_spill_slots() {
    init_logging();
    let mock = MockArch::new();
    let resolver = ArgResolver::new(&mock);

    // Spilled vector args sit at (index - 8) * 2 - 1 words from the base;
    // index 8 lands one word *below* it, so give the base a word of slack.
    let stack: Vec<u64> = (0..8).map(|i| f64::from(i).to_bits()).collect();
    let base = unsafe { stack.as_ptr().add(1) };
    let ctx = unsafe { CallContext::new(sample_regs(), base) };

    for (i, want_slot) in [(8usize, 0usize), (9, 2), (10, 4)] {
        let spec = ArgumentSpec::new(ArgLocation::FloatIndex(i), 8, ValueFormat::Float);
        let value = resolver.resolve_argument(&ctx, &spec).unwrap();
        assert_eq!(value, Value::Float64(want_slot as f64), "float index {i}");
    }
    assert_eq!(mock.vector_reads.get(), 0);
}

#[test]
fn test_explicit_register_specs() {
    init_logging();
    let mock = MockArch::new();
    let resolver = ArgResolver::new(&mock);
    let stack = [0u64; 4];
    let ctx = ctx(sample_regs(), &stack);

    let spec = ArgumentSpec::new(ArgLocation::Register(reg::RDX), 8, ValueFormat::Integer);
    assert_eq!(
        resolver.resolve_argument(&ctx, &spec).unwrap(),
        Value::Integer { bits: 0x3333, size: 8 }
    );

    let spec = ArgumentSpec::new(ArgLocation::Register(reg::XMM1), 8, ValueFormat::Float);
    assert_eq!(resolver.resolve_argument(&ctx, &spec).unwrap(), Value::Float64(1.75));
}

#[test]
fn test_register_spec_outside_table_is_contract_violation() {
    init_logging();
    let mock = MockArch::new();
    let resolver = ArgResolver::new(&mock);
    let stack = [0u64; 4];
    let ctx = ctx(sample_regs(), &stack);

    // A register-only spec that misses the table cannot fall back to the
    // stack; it fails that argument without crashing the trace.
    let spec = ArgumentSpec::new(ArgLocation::Register(42), 8, ValueFormat::Integer);
    assert_eq!(resolver.resolve_argument(&ctx, &spec), Err(ResolveError::RegisterSpecOnStack));
}

#[test]
fn test_stack_round_trip_is_byte_exact() {
    init_logging();
    let mock = MockArch::new();
    let resolver = ArgResolver::new(&mock);

    let pattern = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x23, 0x45, 0x67];
    let mut stack = [0u64; 8];
    stack[3] = u64::from_le_bytes(pattern);
    stack[4] = 0x8899_aabb_ccdd_eeff;
    let ctx = ctx(RegisterSnapshot::default(), &stack);

    for size in [1usize, 2, 4, 8] {
        let spec = ArgumentSpec::new(ArgLocation::StackOffset(3), size, ValueFormat::Raw);
        let value = resolver.resolve_argument(&ctx, &spec).unwrap();
        let (bytes, len) = value.raw_bytes();
        assert_eq!(len, size);
        assert_eq!(&bytes[..size], &pattern[..size], "size {size}");
        assert_eq!(&bytes[size..], &[0u8; 16][size..], "no stray bytes for size {size}");
    }

    // A 16-byte struct spans two stack words.
    let spec = ArgumentSpec::new(ArgLocation::StackOffset(3), 16, ValueFormat::Raw);
    let (bytes, len) = resolver.resolve_argument(&ctx, &spec).unwrap().raw_bytes();
    assert_eq!(len, 16);
    assert_eq!(&bytes[..8], &pattern);
    assert_eq!(&bytes[8..], &0x8899_aabb_ccdd_eeffu64.to_le_bytes());
}

#[test]
fn test_pointer_format_from_register() {
    init_logging();
    let mock = MockArch::new();
    let resolver = ArgResolver::new(&mock);
    let stack = [0u64; 4];
    let ctx = ctx(sample_regs(), &stack);

    let spec = ArgumentSpec::new(ArgLocation::Index(1), 8, ValueFormat::Pointer);
    assert_eq!(resolver.resolve_argument(&ctx, &spec).unwrap(), Value::Pointer(0x2222));
}

#[test]
fn test_strict_mode_rejects_out_of_range_offsets() {
    init_logging();
    let mock = MockArch::new();
    let strict = ArgResolver::new(&mock).strict(true);
    let stack = [0x77u64; 4];
    let ctx = ctx(sample_regs(), &stack);

    let spec = ArgumentSpec::new(ArgLocation::StackOffset(0), 8, ValueFormat::Integer);
    assert_eq!(strict.resolve_argument(&ctx, &spec), Err(ResolveError::StackOffsetOutOfRange(0)));

    let spec = ArgumentSpec::new(ArgLocation::StackOffset(101), 8, ValueFormat::Integer);
    assert_eq!(
        strict.resolve_argument(&ctx, &spec),
        Err(ResolveError::StackOffsetOutOfRange(101))
    );

    // Lenient mode logs the diagnostic and copies anyway.
    let lenient = ArgResolver::new(&mock);
    let spec = ArgumentSpec::new(ArgLocation::StackOffset(0), 8, ValueFormat::Integer);
    assert_eq!(
        lenient.resolve_argument(&ctx, &spec).unwrap(),
        Value::Integer { bits: 0x77, size: 8 }
    );
}
