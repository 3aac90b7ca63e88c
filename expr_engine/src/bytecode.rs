//! Stack-machine bytecode and the Code Block that owns it (component C).
//!
//! Design Note (spec §9): inter-block references are implemented as a
//! plain arena index rather than the generational-index scheme the note
//! also allows, because the Namespace is append-only — variables are
//! never removed after creation, so there is no slot reuse for a
//! generation counter to guard against. `BlockRef`/`FuncRef` are therefore
//! bare `usize` newtypes into `CodeBlockArena`/the builtin table.

use crate::error::ErrorKind;
use crate::scalar::Scalar;

/// Index of a Code Block inside a [`CodeBlockArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockRef(pub usize);

/// The shape shared by every builtin `Operator`/`Named` entry in the
/// registry (component E) — plain enough that `CodeBlock` doesn't need to
/// know which table a callee came from.
pub type BuiltinFn = fn(&[Scalar]) -> Result<Scalar, ErrorKind>;

/// Four-variant instruction set (spec §3/§9): `LoadConst`/`LoadArg` index
/// into per-block tables, `CallCode`/`CallFunc` carry their own arity so a
/// block can be arity-checked without looking up the callee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    LoadConst(u16),
    LoadArg(u16),
    CallCode(BlockRef, u8),
    CallFunc(BuiltinFn, u8),
}

/// Sentinel for "arity not yet fixed" — a forward-declared variable whose
/// defining expression hasn't been parsed yet.
const ARITY_UNSET: i32 = -1;

#[derive(Debug, Clone)]
enum Cache {
    None,
    Value(Scalar),
    Error(ErrorKind),
}

/// One compiled expression: an instruction stream, its deduplicated
/// constant pool, a virtual stack height tracked incrementally, and (for
/// arity-0 blocks) a memoized result.
#[derive(Debug, Clone)]
pub struct CodeBlock {
    instructions: Vec<Instruction>,
    pool: Vec<Scalar>,
    arity: i32,
    height: i32,
    cache: Cache,
}

impl Default for CodeBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeBlock {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            pool: Vec::new(),
            arity: ARITY_UNSET,
            height: 0,
            cache: Cache::None,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_valid(&self) -> bool {
        self.height == 1
    }

    pub fn is_constant(&self) -> bool {
        self.arity == 0
    }

    pub fn has_cached_error(&self) -> bool {
        matches!(self.cache, Cache::Error(_))
    }

    pub fn get_arity(&self) -> Option<u8> {
        if self.arity < 0 {
            None
        } else {
            Some(self.arity as u8)
        }
    }

    /// Set exactly once from unset to a concrete arity. A later call with a
    /// matching value is a no-op; a later call with a different value is
    /// silently ignored per spec ("subsequent set_arity must match or is
    /// ignored") unless it would invalidate an existing `LoadArg` index, in
    /// which case it is rejected.
    pub fn set_arity(&mut self, n: u8) -> Result<(), ErrorKind> {
        if self.arity < 0 {
            let max_arg = self
                .instructions
                .iter()
                .filter_map(|i| match i {
                    Instruction::LoadArg(idx) => Some(*idx as u32),
                    _ => None,
                })
                .max();
            if let Some(max_arg) = max_arg {
                if max_arg >= n as u32 {
                    return Err(ErrorKind::ArityMismatch);
                }
            }
            self.arity = n as i32;
        }
        Ok(())
    }

    pub fn load_const(&mut self, value: Scalar) {
        let index = match self.pool.iter().position(|v| *v == value) {
            Some(idx) => idx,
            None => {
                self.pool.push(value);
                self.pool.len() - 1
            }
        };
        self.instructions.push(Instruction::LoadConst(index as u16));
        self.height += 1;
    }

    pub fn load_arg(&mut self, index: u16) -> Result<(), ErrorKind> {
        if self.arity >= 0 && index as i32 >= self.arity {
            return Err(ErrorKind::MissingArgs);
        }
        self.instructions.push(Instruction::LoadArg(index));
        self.height += 1;
        Ok(())
    }

    /// Append a `CallFunc`, peephole-evaluating it immediately when
    /// `try_eval` is on and every one of the top `k` instructions is a
    /// `LoadConst` (spec §4.C / design note "try-eval pre-computation").
    pub fn call_func(
        &mut self,
        arity: u8,
        func: BuiltinFn,
        try_eval: bool,
    ) -> Result<(), ErrorKind> {
        let k = arity as usize;
        if k as i32 > self.height {
            return Err(ErrorKind::MissingValues);
        }

        let all_const = try_eval
            && self.instructions.len() >= k
            && self.instructions[self.instructions.len() - k..]
                .iter()
                .all(|i| matches!(i, Instruction::LoadConst(_)));

        if all_const {
            let start = self.instructions.len() - k;
            let const_indices: Vec<usize> = self.instructions[start..]
                .iter()
                .map(|i| match i {
                    Instruction::LoadConst(idx) => *idx as usize,
                    _ => unreachable!(),
                })
                .collect();
            let args: Vec<Scalar> = const_indices.iter().map(|idx| self.pool[*idx]).collect();
            self.instructions.truncate(start);

            match func(&args) {
                Ok(result) => {
                    self.height -= k as i32;
                    self.load_const(result);
                }
                Err(kind) => {
                    self.cache = Cache::Error(kind);
                    self.height -= k as i32 - 1;
                }
            }
        } else {
            self.instructions.push(Instruction::CallFunc(func, arity));
            self.height -= k as i32 - 1;
        }
        Ok(())
    }

    pub fn call_code(&mut self, callee: BlockRef, callee_arity: u8) {
        self.instructions
            .push(Instruction::CallCode(callee, callee_arity));
        self.height -= callee_arity as i32 - 1;
    }

    /// Distinct callee blocks referenced by `CallCode`, in first-occurrence
    /// order (spec §4.C `dep_list`).
    pub fn dep_list(&self) -> Vec<BlockRef> {
        let mut seen = Vec::new();
        for instr in &self.instructions {
            if let Instruction::CallCode(callee, _) = instr {
                if !seen.contains(callee) {
                    seen.push(*callee);
                }
            }
        }
        seen
    }

    pub fn reset(&mut self) {
        self.instructions.clear();
        self.pool.clear();
        self.height = 0;
        self.cache = Cache::None;
    }

    /// Evaluate with the given arguments. A cached result (arity-0 blocks
    /// only) short-circuits execution entirely, including re-surfacing a
    /// cached error.
    pub fn eval(
        &mut self,
        args: &[Scalar],
        arena: &mut CodeBlockArena,
    ) -> Result<Scalar, ErrorKind> {
        match &self.cache {
            Cache::Value(v) => return Ok(*v),
            Cache::Error(e) => return Err(e.clone()),
            Cache::None => {}
        }

        let result = self.run(args, arena);

        if self.is_constant() {
            self.cache = match &result {
                Ok(v) => Cache::Value(*v),
                Err(e) => Cache::Error(e.clone()),
            };
        }
        result
    }

    fn run(&self, args: &[Scalar], arena: &mut CodeBlockArena) -> Result<Scalar, ErrorKind> {
        if !self.is_valid() {
            return Err(ErrorKind::IncompleteCode);
        }

        let mut stack: Vec<Scalar> = Vec::with_capacity(self.height.max(0) as usize);
        for instr in &self.instructions {
            match instr {
                Instruction::LoadConst(idx) => stack.push(self.pool[*idx as usize]),
                Instruction::LoadArg(idx) => {
                    let arg = args.get(*idx as usize).ok_or(ErrorKind::MissingArgs)?;
                    stack.push(*arg);
                }
                Instruction::CallCode(callee, arity) => {
                    let arity = *arity as usize;
                    if stack.len() < arity {
                        return Err(ErrorKind::StackUnderflow);
                    }
                    let call_args: Vec<Scalar> = stack.split_off(stack.len() - arity);
                    let value = arena.eval(*callee, &call_args)?;
                    stack.push(value);
                }
                Instruction::CallFunc(func, arity) => {
                    let arity = *arity as usize;
                    if stack.len() < arity {
                        return Err(ErrorKind::StackUnderflow);
                    }
                    let call_args: Vec<Scalar> = stack.split_off(stack.len() - arity);
                    let value = func(&call_args)?;
                    stack.push(value);
                }
            }
        }

        match stack.len() {
            1 => Ok(stack[0]),
            0 => Err(ErrorKind::StackUnderflow),
            _ => Err(ErrorKind::StackSurplus),
        }
    }
}

/// Owning storage for every Code Block a Namespace has created, so that
/// `CallCode` instructions can hold stable non-owning [`BlockRef`]s
/// instead of Rust references with awkward lifetimes.
#[derive(Debug, Default)]
pub struct CodeBlockArena {
    blocks: Vec<CodeBlock>,
}

impl CodeBlockArena {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn alloc(&mut self, block: CodeBlock) -> BlockRef {
        self.blocks.push(block);
        BlockRef(self.blocks.len() - 1)
    }

    pub fn get(&self, r: BlockRef) -> &CodeBlock {
        &self.blocks[r.0]
    }

    pub fn get_mut(&mut self, r: BlockRef) -> &mut CodeBlock {
        &mut self.blocks[r.0]
    }

    pub fn eval(&mut self, r: BlockRef, args: &[Scalar]) -> Result<Scalar, ErrorKind> {
        // Take the block out so `run` can recurse through `self` (other
        // blocks) without a second mutable borrow of the same arena slot.
        let mut block = std::mem::replace(&mut self.blocks[r.0], CodeBlock::new());
        let result = block.eval(args, self);
        self.blocks[r.0] = block;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[test]
    fn constant_pool_dedups() {
        let mut block = CodeBlock::new();
        block.load_const(Scalar::Rational { num: 5, den: 1 });
        block.load_const(Scalar::Rational { num: 5, den: 1 });
        assert_eq!(block.pool.len(), 1);
        assert_eq!(block.height(), 2);
    }

    #[test]
    fn fresh_block_is_invalid() {
        let block = CodeBlock::new();
        assert!(!block.is_valid());
    }

    #[test]
    fn single_const_block_is_valid_and_evaluates() {
        let mut arena = CodeBlockArena::new();
        let mut block = CodeBlock::new();
        block.set_arity(0).unwrap();
        block.load_const(Scalar::Rational { num: 7, den: 1 });
        assert!(block.is_valid());
        assert_eq!(
            block.eval(&[], &mut arena).unwrap(),
            Scalar::Rational { num: 7, den: 1 }
        );
    }

    #[test]
    fn set_arity_rejects_shrinking_below_used_arg_index() {
        let mut block = CodeBlock::new();
        block.load_arg(2).unwrap();
        assert!(block.set_arity(2).is_err());
        assert!(block.set_arity(3).is_ok());
    }

    #[test]
    fn try_eval_folds_constant_call() {
        let abs = registry::lookup_named("abs").unwrap();
        let mut block = CodeBlock::new();
        block.set_arity(0).unwrap();
        block.load_const(Scalar::Rational { num: -5, den: 1 });
        block.call_func(1, abs.func, true).unwrap();
        assert_eq!(block.instructions().len(), 1);
        assert!(matches!(block.instructions()[0], Instruction::LoadConst(_)));
    }

    #[test]
    fn call_code_updates_height_by_arity() {
        let mut arena = CodeBlockArena::new();
        let mut callee = CodeBlock::new();
        callee.set_arity(2).unwrap();
        callee.load_arg(0).unwrap();
        callee.load_arg(1).unwrap();
        let callee_ref = arena.alloc(callee);

        let mut caller = CodeBlock::new();
        caller.set_arity(0).unwrap();
        caller.load_const(Scalar::Rational { num: 1, den: 1 });
        caller.load_const(Scalar::Rational { num: 2, den: 1 });
        caller.call_code(callee_ref, 2);
        assert_eq!(caller.height(), 1);
    }

    #[test]
    fn reset_clears_but_keeps_identity() {
        let mut block = CodeBlock::new();
        block.set_arity(0).unwrap();
        block.load_const(Scalar::zero());
        block.reset();
        assert_eq!(block.height(), 0);
        assert!(block.instructions().is_empty());
        assert_eq!(block.get_arity(), Some(0));
    }
}
