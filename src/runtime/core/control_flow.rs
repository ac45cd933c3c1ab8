//! Structured-control resolution (§4.5).
//!
//! Block jump targets are resolved lazily: on first entry to a `block`,
//! `loop`, or `if`, we forward-scan the bytecode, decoding every opcode's
//! actual operand length so nested structures are counted correctly. This
//! replaces a naive one-byte-per-opcode skip table, which mis-skips any
//! instruction with a LEB128 immediate and desyncs on the first `br`/`call`/
//! `local.*`/`i32.const`/memory op it meets.

use crate::error::{CoreError, TrapKind};
use crate::runtime::core::leb128::{read_sleb128_i32, read_u8, read_uleb128_u32};

/// A pushed structured-control region. Modeled as a tagged enum per variant
/// rather than one struct with an always-present `else_pc` field, so branch
/// semantics (§4.5, "Structured control state machine") follow from the tag
/// instead of an unused field convention.
#[derive(Debug, Clone, Copy)]
pub enum Block {
    Block { end_pc: usize },
    Loop { start_pc: usize },
    If { end_pc: usize, else_pc: Option<usize> },
}

/// Scan forward from `start` (the position right after a block-type byte)
/// to find the matching `end`, and, for an `if`, the matching `else` if one
/// exists before it.
pub fn resolve_block(code: &[u8], start: usize, is_if: bool) -> Result<(usize, Option<usize>), CoreError> {
    let mut pos = start;
    let mut depth: u32 = 0;
    let mut else_pc = None;

    loop {
        let op = read_u8(code, &mut pos)?;
        match op {
            0x02 | 0x03 | 0x04 => {
                depth += 1;
                let _blocktype = read_u8(code, &mut pos)?;
            }
            0x05 => {
                if depth == 0 && is_if && else_pc.is_none() {
                    else_pc = Some(pos);
                }
            }
            0x0B => {
                if depth == 0 {
                    return Ok((pos, else_pc));
                }
                depth -= 1;
            }
            other => skip_operands(other, code, &mut pos)?,
        }
    }
}

/// Advance `pos` past the immediate operand(s) of a single-opcode
/// instruction that isn't one of the structural opcodes handled above.
/// Mirrors the decode step the executor performs when it actually runs the
/// instruction; an opcode this core doesn't support traps here exactly as it
/// would during execution (§6: "Any other opcode is a trap").
fn skip_operands(op: u8, code: &[u8], pos: &mut usize) -> Result<(), CoreError> {
    match op {
        0x01 | 0x0F | 0x1A => {} // nop, return, drop
        0x0C | 0x0D => {
            read_uleb128_u32(code, pos)?; // br / br_if label index
        }
        0x10 => {
            read_uleb128_u32(code, pos)?; // call function index
        }
        0x20 | 0x21 | 0x22 => {
            read_uleb128_u32(code, pos)?; // local index
        }
        0x28 | 0x36 => {
            read_uleb128_u32(code, pos)?; // align
            read_uleb128_u32(code, pos)?; // offset
        }
        0x41 => {
            read_sleb128_i32(code, pos)?;
        }
        0x45 | 0x48..=0x4F | 0x67 | 0x68 | 0x6A..=0x70 => {}
        other => return Err(CoreError::Trap(TrapKind::UnknownOpcode(other))),
    }
    Ok(())
}
