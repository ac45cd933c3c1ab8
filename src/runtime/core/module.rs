//! Binary module decoding (§2, §4.2).
//!
//! `Module::parse` walks the section stream once, in order, and produces a
//! flat set of VM-ready tables. The decoder is zero-copy: `Module<'a>`
//! borrows the embedder-owned byte buffer, and function bodies are stored as
//! `(start_offset, end_offset)` pairs into that same buffer rather than
//! copied out, so `code_offset` values index directly into `self.bytes`.
//!
//! Only the i32 subset is representable: a `FuncType` with any non-i32
//! param/result, or an import/export of kind table/global, is accepted at
//! the binary level (per §2, "unknown sections and most unsupported
//! constructs are skipped rather than rejected") but carries no operational
//! meaning — there's nothing in this core that can call through a Table or
//! read a Global.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::runtime::core::leb128::{read_sleb128_i32, read_string, read_u8, read_uleb128_u32};
use crate::runtime::core::string_arena::StringArena;

const WASM_MAGIC: &[u8; 4] = b"\0asm";
const WASM_VERSION: u32 = 1;

const SECTION_TYPE: u8 = 1;
const SECTION_IMPORT: u8 = 2;
const SECTION_FUNCTION: u8 = 3;
const SECTION_MEMORY: u8 = 5;
const SECTION_EXPORT: u8 = 7;
const SECTION_START: u8 = 8;
const SECTION_CODE: u8 = 10;
const SECTION_DATA: u8 = 11;

/// A single value type. Only `I32` is meaningful to the executor; other byte
/// values decode successfully (so well-formed multi-type modules don't
/// outright fail to parse) but a `FuncType` that mentions one is rejected
/// once execution would actually need it — see `FuncType::all_i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    I32,
    Other(u8),
}

impl ValueType {
    fn from_byte(b: u8) -> Self {
        match b {
            0x7F => ValueType::I32,
            other => ValueType::Other(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FuncType {
    pub params: Vec<ValueType>,
    pub results: Vec<ValueType>,
}

impl FuncType {
    /// §2: at most 16 params and at most 1 result.
    fn validate(&self) -> Result<(), CoreError> {
        if self.params.len() > 16 {
            return Err(CoreError::decode("function type has more than 16 params"));
        }
        if self.results.len() > 1 {
            return Err(CoreError::decode("function type has more than one result"));
        }
        Ok(())
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn has_result(&self) -> bool {
        !self.results.is_empty()
    }
}

/// A host function bound by `(module, field)`. Unbound until the embedder
/// calls `Module::bind_import`; calling an unbound import traps
/// `UnresolvedImport` (§4.4, §7).
pub type HostFn = Box<dyn Fn(&[i32]) -> i32 + Send + Sync>;

pub struct FunctionImport {
    pub module: String,
    pub field: String,
    pub type_index: u32,
    pub callback: Option<HostFn>,
}

impl std::fmt::Debug for FunctionImport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionImport")
            .field("module", &self.module)
            .field("field", &self.field)
            .field("type_index", &self.type_index)
            .field("bound", &self.callback.is_some())
            .finish()
    }
}

/// A locally-defined function: its signature plus the byte range of its
/// code-section body (locals declarations + instructions), as absolute
/// offsets into the module's byte buffer.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDesc {
    pub type_index: u32,
    pub body_start: usize,
    pub body_end: usize,
}

#[derive(Debug, Clone, Copy)]
pub enum ExportKind {
    Function,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Export {
    pub kind: ExportKind,
    pub index: u32,
}

/// §3: always exactly one 64 KiB memory when a memory section is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryLimits {
    pub initial: u32,
    pub maximum: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct DataSegment {
    pub offset: u32,
    pub bytes: Vec<u8>,
}

/// A decoded module. Borrows the embedder's byte buffer; function bodies are
/// byte ranges into it rather than owned copies.
#[derive(Debug)]
pub struct Module<'a> {
    pub bytes: &'a [u8],
    pub types: Vec<FuncType>,
    pub function_imports: Vec<FunctionImport>,
    pub functions: Vec<FunctionDesc>,
    pub memory: Option<MemoryLimits>,
    pub exports: HashMap<String, Export>,
    pub data_segments: Vec<DataSegment>,
    pub start: Option<u32>,
    /// Backing storage for import/export names (§4.3). Only written to
    /// during decode; nothing reads it back out by reference today since
    /// `FunctionImport`/`Export` keep their own owned copies for ergonomic
    /// comparison, but every name still has to fit the bounded budget this
    /// enforces, and decode fails loudly (§7: "string-arena overflow")
    /// rather than growing past it.
    name_arena: StringArena,
}

impl<'a> Module<'a> {
    /// Total number of functions, imports first, then locally-defined ones —
    /// the Wasm "function index space" (§2).
    pub fn imported_function_count(&self) -> usize {
        self.function_imports.len()
    }

    pub fn function_type(&self, func_idx: u32) -> Result<&FuncType, CoreError> {
        let idx = func_idx as usize;
        let type_index = if idx < self.function_imports.len() {
            self.function_imports[idx].type_index
        } else {
            let local = idx - self.function_imports.len();
            self.functions
                .get(local)
                .ok_or_else(|| CoreError::decode("function index out of range"))?
                .type_index
        };
        self.types
            .get(type_index as usize)
            .ok_or_else(|| CoreError::decode("type index out of range"))
    }

    pub fn is_imported_function(&self, func_idx: u32) -> bool {
        (func_idx as usize) < self.function_imports.len()
    }

    /// Bind a host function by `(module, field)`. Idempotent no-op if no
    /// import matches — this is not an error (§4.4).
    pub fn bind_import(&mut self, module: &str, field: &str, f: HostFn) {
        for import in &mut self.function_imports {
            if import.module == module && import.field == field {
                import.callback = Some(f);
            }
        }
    }

    pub fn get_export(&self, name: &str) -> Option<&Export> {
        self.exports.get(name)
    }

    /// Parse a complete binary module. Unknown sections (and unsupported
    /// fields within known sections, e.g. table/global imports) are skipped
    /// by length rather than rejected (§2).
    pub fn parse(bytes: &'a [u8]) -> Result<Self, CoreError> {
        if bytes.len() < 8 {
            return Err(CoreError::decode("module shorter than header"));
        }
        if &bytes[0..4] != WASM_MAGIC {
            return Err(CoreError::decode("bad magic bytes"));
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != WASM_VERSION {
            return Err(CoreError::decode(format!("unsupported version {version}")));
        }

        let mut module = Module {
            bytes,
            types: Vec::new(),
            function_imports: Vec::new(),
            functions: Vec::new(),
            memory: None,
            exports: HashMap::new(),
            data_segments: Vec::new(),
            start: None,
            name_arena: StringArena::new(),
        };

        // Function index -> type index for locally-defined functions, filled
        // in by the Function section and consumed by the Code section.
        let mut local_type_indices: Vec<u32> = Vec::new();

        let mut pos = 8usize;
        while pos < bytes.len() {
            let section_id = read_u8(bytes, &mut pos)?;
            let section_len = read_uleb128_u32(bytes, &mut pos)? as usize;
            let section_end = pos
                .checked_add(section_len)
                .filter(|&e| e <= bytes.len())
                .ok_or_else(|| CoreError::decode("section length runs past buffer end"))?;

            match section_id {
                SECTION_TYPE => parse_type_section(bytes, pos, section_end, &mut module.types)?,
                SECTION_IMPORT => parse_import_section(
                    bytes,
                    pos,
                    section_end,
                    &mut module.function_imports,
                    &mut module.name_arena,
                )?,
                SECTION_FUNCTION => {
                    parse_function_section(bytes, pos, section_end, &mut local_type_indices)?
                }
                SECTION_MEMORY => {
                    module.memory = Some(parse_memory_section(bytes, pos, section_end)?)
                }
                SECTION_EXPORT => parse_export_section(
                    bytes,
                    pos,
                    section_end,
                    &mut module.exports,
                    &mut module.name_arena,
                )?,
                SECTION_START => {
                    let mut p = pos;
                    module.start = Some(read_uleb128_u32(bytes, &mut p)?);
                }
                SECTION_CODE => parse_code_section(
                    bytes,
                    pos,
                    section_end,
                    &local_type_indices,
                    &mut module.functions,
                )?,
                SECTION_DATA => {
                    parse_data_section(bytes, pos, section_end, &mut module.data_segments)?
                }
                _ => {} // unknown/unsupported section: skip by length
            }

            pos = section_end;
        }

        for t in &module.types {
            t.validate()?;
        }

        Ok(module)
    }
}

fn parse_type_section(
    bytes: &[u8],
    start: usize,
    end: usize,
    out: &mut Vec<FuncType>,
) -> Result<(), CoreError> {
    let mut pos = start;
    let count = read_uleb128_u32(bytes, &mut pos)?;
    for _ in 0..count {
        let form = read_u8(bytes, &mut pos)?;
        if form != 0x60 {
            return Err(CoreError::decode("expected func type form 0x60"));
        }
        let param_count = read_uleb128_u32(bytes, &mut pos)?;
        let mut params = Vec::with_capacity(param_count as usize);
        for _ in 0..param_count {
            params.push(ValueType::from_byte(read_u8(bytes, &mut pos)?));
        }
        let result_count = read_uleb128_u32(bytes, &mut pos)?;
        let mut results = Vec::with_capacity(result_count as usize);
        for _ in 0..result_count {
            results.push(ValueType::from_byte(read_u8(bytes, &mut pos)?));
        }
        out.push(FuncType { params, results });
    }
    if pos != end {
        return Err(CoreError::decode("type section length mismatch"));
    }
    Ok(())
}

fn parse_import_section(
    bytes: &[u8],
    start: usize,
    end: usize,
    out: &mut Vec<FunctionImport>,
    arena: &mut StringArena,
) -> Result<(), CoreError> {
    let mut pos = start;
    let count = read_uleb128_u32(bytes, &mut pos)?;
    for _ in 0..count {
        let module = read_string(bytes, &mut pos)?;
        let field = read_string(bytes, &mut pos)?;
        arena
            .insert(&module)
            .ok_or_else(|| CoreError::decode("string arena overflow"))?;
        arena
            .insert(&field)
            .ok_or_else(|| CoreError::decode("string arena overflow"))?;
        let kind = read_u8(bytes, &mut pos)?;
        match kind {
            0x00 => {
                let type_index = read_uleb128_u32(bytes, &mut pos)?;
                out.push(FunctionImport {
                    module,
                    field,
                    type_index,
                    callback: None,
                });
            }
            0x01 => skip_table_type(bytes, &mut pos)?,
            0x02 => skip_memory_type(bytes, &mut pos)?,
            0x03 => skip_global_type(bytes, &mut pos)?,
            other => return Err(CoreError::decode(format!("unknown import kind {other}"))),
        }
    }
    if pos != end {
        return Err(CoreError::decode("import section length mismatch"));
    }
    Ok(())
}

fn skip_table_type(bytes: &[u8], pos: &mut usize) -> Result<(), CoreError> {
    let _elem_type = read_u8(bytes, pos)?;
    skip_limits(bytes, pos)
}

fn skip_memory_type(bytes: &[u8], pos: &mut usize) -> Result<(), CoreError> {
    skip_limits(bytes, pos)
}

fn skip_global_type(bytes: &[u8], pos: &mut usize) -> Result<(), CoreError> {
    let _value_type = read_u8(bytes, pos)?;
    let _mutability = read_u8(bytes, pos)?;
    Ok(())
}

fn skip_limits(bytes: &[u8], pos: &mut usize) -> Result<(), CoreError> {
    let flags = read_u8(bytes, pos)?;
    let _min = read_uleb128_u32(bytes, pos)?;
    if flags & 0x01 != 0 {
        let _max = read_uleb128_u32(bytes, pos)?;
    }
    Ok(())
}

fn parse_function_section(
    bytes: &[u8],
    start: usize,
    end: usize,
    out: &mut Vec<u32>,
) -> Result<(), CoreError> {
    let mut pos = start;
    let count = read_uleb128_u32(bytes, &mut pos)?;
    for _ in 0..count {
        out.push(read_uleb128_u32(bytes, &mut pos)?);
    }
    if pos != end {
        return Err(CoreError::decode("function section length mismatch"));
    }
    Ok(())
}

/// §3: this core only recognizes a single standard memory0. A memory section
/// may declare more than one entry; per §4.2 only the first is honoured, the
/// rest are parsed (so the section's length bookkeeping stays correct) and
/// discarded. Each entry may carry the non-standard "inline export name"
/// bit-7 extension some encoders emit; the name is read and dropped.
fn parse_memory_section(bytes: &[u8], start: usize, end: usize) -> Result<MemoryLimits, CoreError> {
    let mut pos = start;
    let count = read_uleb128_u32(bytes, &mut pos)?;
    if count == 0 {
        return Err(CoreError::decode("memory section declares no entries"));
    }
    let mut first = None;
    for i in 0..count {
        let flags = read_u8(bytes, &mut pos)?;
        let initial = read_uleb128_u32(bytes, &mut pos)?;
        let maximum = if flags & 0x01 != 0 {
            Some(read_uleb128_u32(bytes, &mut pos)?)
        } else {
            None
        };
        if flags & 0x80 != 0 {
            read_string(bytes, &mut pos)?;
        }
        if i == 0 {
            first = Some(MemoryLimits { initial, maximum });
        }
    }
    if pos != end {
        return Err(CoreError::decode("memory section length mismatch"));
    }
    Ok(first.expect("count > 0 guarantees first is set"))
}

fn parse_export_section(
    bytes: &[u8],
    start: usize,
    end: usize,
    out: &mut HashMap<String, Export>,
    arena: &mut StringArena,
) -> Result<(), CoreError> {
    let mut pos = start;
    let count = read_uleb128_u32(bytes, &mut pos)?;
    for _ in 0..count {
        let name = read_string(bytes, &mut pos)?;
        arena
            .insert(&name)
            .ok_or_else(|| CoreError::decode("string arena overflow"))?;
        let kind_byte = read_u8(bytes, &mut pos)?;
        let index = read_uleb128_u32(bytes, &mut pos)?;
        let kind = match kind_byte {
            0x00 => Some(ExportKind::Function),
            0x02 => Some(ExportKind::Memory),
            _ => None, // table/global export: recorded nowhere, nothing to export
        };
        if let Some(kind) = kind {
            out.insert(name, Export { kind, index });
        }
    }
    if pos != end {
        return Err(CoreError::decode("export section length mismatch"));
    }
    Ok(())
}

fn parse_code_section(
    bytes: &[u8],
    start: usize,
    end: usize,
    local_type_indices: &[u32],
    out: &mut Vec<FunctionDesc>,
) -> Result<(), CoreError> {
    let mut pos = start;
    let count = read_uleb128_u32(bytes, &mut pos)?;
    if count as usize != local_type_indices.len() {
        return Err(CoreError::decode(
            "code section entry count doesn't match function section",
        ));
    }
    for &type_index in local_type_indices {
        let body_size = read_uleb128_u32(bytes, &mut pos)? as usize;
        let body_start = pos;
        let body_end = body_start
            .checked_add(body_size)
            .filter(|&e| e <= bytes.len())
            .ok_or_else(|| CoreError::decode("function body runs past buffer end"))?;
        out.push(FunctionDesc {
            type_index,
            body_start,
            body_end,
        });
        pos = body_end;
    }
    if pos != end {
        return Err(CoreError::decode("code section length mismatch"));
    }
    Ok(())
}

fn parse_data_section(
    bytes: &[u8],
    start: usize,
    end: usize,
    out: &mut Vec<DataSegment>,
) -> Result<(), CoreError> {
    let mut pos = start;
    let count = read_uleb128_u32(bytes, &mut pos)?;
    for _ in 0..count {
        let mem_idx = read_uleb128_u32(bytes, &mut pos)?;
        if mem_idx != 0 {
            return Err(CoreError::decode("data segment targets non-zero memory index"));
        }
        let offset = parse_i32_const_expr(bytes, &mut pos)?;
        let data_len = read_uleb128_u32(bytes, &mut pos)? as usize;
        let data_end = pos
            .checked_add(data_len)
            .filter(|&e| e <= bytes.len())
            .ok_or_else(|| CoreError::decode("data segment runs past buffer end"))?;
        out.push(DataSegment {
            offset: offset as u32,
            bytes: bytes[pos..data_end].to_vec(),
        });
        pos = data_end;
    }
    if pos != end {
        return Err(CoreError::decode("data section length mismatch"));
    }
    Ok(())
}

/// A constant offset expression: `i32.const N end`. This is the only
/// constant-expression form the spec supports for data segment offsets.
fn parse_i32_const_expr(bytes: &[u8], pos: &mut usize) -> Result<i32, CoreError> {
    let op = read_u8(bytes, pos)?;
    if op != 0x41 {
        return Err(CoreError::decode("data segment offset must be i32.const"));
    }
    let value = read_sleb128_i32(bytes, pos)?;
    let end_op = read_u8(bytes, pos)?;
    if end_op != 0x0B {
        return Err(CoreError::decode("data segment offset expression missing end"));
    }
    Ok(value)
}
