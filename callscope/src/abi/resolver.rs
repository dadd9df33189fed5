//! Argument and return-value resolution.
//!
//! `resolve_argument` first tries the register table, then falls back to the
//! stack; `resolve_return_value` is a separate, simpler contract. Both favor
//! the continuity of a live trace: a malformed spec degrades to a logged
//! best-effort copy instead of failing the traced call, unless strict mode
//! is enabled.

use std::ptr;

use log::{debug, error};

use crate::abi::arch::ArchAccess;
use crate::abi::registers::{CallContext, FLOAT_ARG_REGS, FLOAT_BASE, INT_ARG_REGS};
use crate::domain::{ArgLocation, ArgumentSpec, ResolveError, Value, ValueFormat, VALUE_CAPACITY};

/// Word offsets outside this range are treated as suspicious.
const STACK_OFFSET_RANGE: std::ops::RangeInclusive<isize> = 1..=100;

/// Extended-precision size that forces the x87 return path.
const LONG_DOUBLE_SIZE: usize = 10;

/// Resolves [`ArgumentSpec`]s against a [`CallContext`].
///
/// Stateless apart from configuration: reentrant, lock-free, safe to invoke
/// concurrently from every traced thread.
#[derive(Debug, Clone, Copy)]
pub struct ArgResolver<A: ArchAccess> {
    arch: A,
    strict: bool,
}

#[cfg(target_arch = "x86_64")]
impl Default for ArgResolver<crate::abi::arch::X86Access> {
    fn default() -> Self {
        Self::new(crate::abi::arch::X86Access)
    }
}

impl<A: ArchAccess> ArgResolver<A> {
    #[must_use]
    pub fn new(arch: A) -> Self {
        Self { arch, strict: false }
    }

    /// Turn range diagnostics into hard per-argument errors.
    ///
    /// The default lenient mode logs and copies anyway, which keeps parity
    /// with the original tracer behavior in production traces.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Resolve one argument of a traced call.
    pub fn resolve_argument(
        &self,
        ctx: &CallContext,
        spec: &ArgumentSpec,
    ) -> Result<Value, ResolveError> {
        if let Some(id) = register_candidate(spec.location) {
            if let Some(bits) = self.read_register(ctx, id) {
                let len = spec.size.min(8);
                let mut bytes = [0u8; VALUE_CAPACITY];
                bytes[..8].copy_from_slice(&bits.to_le_bytes());
                return Ok(Value::from_bytes(bytes, len, spec.format));
            }
        }
        self.resolve_from_stack(ctx, spec)
    }

    /// Resolve the return value of a traced call (exit hook only).
    pub fn resolve_return_value(
        &self,
        ctx: &CallContext,
        spec: &ArgumentSpec,
    ) -> Result<Value, ResolveError> {
        match (spec.format, spec.size) {
            // Long doubles never reach the generic return capture; drain
            // the x87 stack instead.
            (ValueFormat::LongDouble, _) | (ValueFormat::Float, LONG_DOUBLE_SIZE) => {
                Ok(Value::LongDouble(self.arch.read_long_double_return()))
            }
            (ValueFormat::Float, _) => {
                let bits = self
                    .arch
                    .read_vector_register(0)
                    .ok_or(ResolveError::BadVectorRegister(0))?;
                Ok(Value::Float64(f64::from_bits(bits)))
            }
            _ => {
                if ctx.retval.is_null() {
                    error!("return value requested without captured return storage");
                    return Err(ResolveError::NoReturnValue);
                }
                let len = spec.size.min(VALUE_CAPACITY);
                let mut bytes = [0u8; VALUE_CAPACITY];
                unsafe {
                    ptr::copy_nonoverlapping(ctx.retval, bytes.as_mut_ptr(), len);
                }
                Ok(Value::from_bytes(bytes, len, spec.format))
            }
        }
    }

    fn read_register(&self, ctx: &CallContext, id: usize) -> Option<u64> {
        if id < INT_ARG_REGS {
            return ctx.regs.arg(id);
        }
        if (FLOAT_BASE..FLOAT_BASE + FLOAT_ARG_REGS).contains(&id) {
            return self.arch.read_vector_register(id - FLOAT_BASE);
        }
        None
    }

    fn resolve_from_stack(
        &self,
        ctx: &CallContext,
        spec: &ArgumentSpec,
    ) -> Result<Value, ResolveError> {
        let words = match spec.location {
            ArgLocation::StackOffset(offset) => offset,
            ArgLocation::Index(n) => n as isize - INT_ARG_REGS as isize,
            // Spilled vector arguments occupy double-word aligned slots.
            ArgLocation::FloatIndex(n) => (n as isize - FLOAT_ARG_REGS as isize) * 2 - 1,
            ArgLocation::Register(id) => {
                // A register-only spec cannot also require stack math.
                error!("invalid stack access for register argument spec (register {id})");
                return Err(ResolveError::RegisterSpecOnStack);
            }
        };

        if !STACK_OFFSET_RANGE.contains(&words) {
            if self.strict {
                return Err(ResolveError::StackOffsetOutOfRange(words));
            }
            debug!("suspicious stack offset: {words}");
        }

        let len = spec.size.min(VALUE_CAPACITY);
        let mut bytes = [0u8; VALUE_CAPACITY];
        unsafe {
            let src = ctx.stack_base.offset(words).cast::<u8>();
            ptr::copy_nonoverlapping(src, bytes.as_mut_ptr(), len);
        }
        Ok(Value::from_bytes(bytes, len, spec.format))
    }
}

/// Map a location to its candidate register id, if any.
fn register_candidate(location: ArgLocation) -> Option<usize> {
    match location {
        ArgLocation::Register(id) => Some(id),
        ArgLocation::Index(n) if n < INT_ARG_REGS => Some(n),
        ArgLocation::FloatIndex(n) if n < FLOAT_ARG_REGS => Some(FLOAT_BASE + n),
        _ => None,
    }
}
