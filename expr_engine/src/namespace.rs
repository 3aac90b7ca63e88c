//! Namespace: named variables/functions, dependency graph, cycle
//! detection, and value retrieval (component G).
//!
//! Design Note (spec §9): the `used_by` back-pointer used to reconstruct
//! a detected cycle is kept as a transient map built fresh per check
//! rather than a field on [`Variable`], so the Variable type carries no
//! mutable scratch state.

use std::collections::{HashMap, VecDeque};

use crate::bytecode::{BlockRef, CodeBlock, CodeBlockArena};
use crate::error::{EngineError, ErrorKind};
use crate::parser;
use crate::scalar::Scalar;

/// Index of a [`Variable`] inside a [`Namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarRef(pub usize);

/// A named entry: either a zero-arity value or a user-defined function.
/// `deps` is the dependency list cached at attach time (spec §3); it is
/// recomputed, not incrementally maintained, every time a block is
/// (re)attached.
#[derive(Debug)]
pub struct Variable {
    name: String,
    hash: u32,
    block: BlockRef,
    has_impl: bool,
    deps: Vec<VarRef>,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_impl(&self) -> bool {
        self.has_impl
    }

    pub fn deps(&self) -> &[VarRef] {
        &self.deps
    }

    pub fn block(&self) -> BlockRef {
        self.block
    }
}

/// 32-bit FNV-1a, matching spec §3's "32-bit precomputed hash" — a probe
/// speedup, not a cryptographic property.
fn hash_name(name: &str) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for b in name.bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(0x0100_0193);
    }
    h
}

fn skip_spaces(s: &str) -> usize {
    s.bytes().take_while(|&b| b == b' ' || b == b'\t').count()
}

fn scan_ident(s: &str) -> Option<&str> {
    let mut chars = s.char_indices();
    let (_, first) = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    let mut end = first.len_utf8();
    for (idx, ch) in chars {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    Some(&s[..end])
}

/// Scan an optional `name[(arg1, arg2, ...)]:` prefix off `text`.
/// Returns `None` (not a label — the whole text is a bare expression) if
/// no identifier starts the text, the argument list is malformed, or no
/// colon follows.
fn try_parse_label(text: &str) -> Option<(String, Vec<String>, usize)> {
    let mut pos = skip_spaces(text);
    let name = scan_ident(&text[pos..])?;
    let name = name.to_string();
    pos += name.len();

    let mut params = Vec::new();
    pos += skip_spaces(&text[pos..]);
    if text[pos..].starts_with('(') {
        pos += 1;
        loop {
            pos += skip_spaces(&text[pos..]);
            let p = scan_ident(&text[pos..])?;
            params.push(p.to_string());
            pos += p.len();
            pos += skip_spaces(&text[pos..]);
            if let Some(rest) = text[pos..].strip_prefix(',') {
                let _ = rest;
                pos += 1;
            } else if text[pos..].starts_with(')') {
                pos += 1;
                break;
            } else {
                return None;
            }
        }
    }

    pos += skip_spaces(&text[pos..]);
    let rest = text[pos..].strip_prefix(':')?;
    let _ = rest;
    Some((name, params, pos + 1))
}

/// Named variables/functions keyed by name, their shared Code Block
/// arena, and the transient diagnostics for the last redefinition and
/// dependency cycle (spec §3).
#[derive(Debug)]
pub struct Namespace {
    vars: Vec<Variable>,
    arena: CodeBlockArena,
    owner_of: HashMap<BlockRef, VarRef>,
    eval_on_parse: bool,
    anon_counter: u64,
    last_redef: Option<VarRef>,
    cycle_chain: Vec<VarRef>,
}

impl Namespace {
    pub fn new(eval_on_parse: bool) -> Self {
        Self {
            vars: Vec::new(),
            arena: CodeBlockArena::new(),
            owner_of: HashMap::new(),
            eval_on_parse,
            anon_counter: 0,
            last_redef: None,
            cycle_chain: Vec::new(),
        }
    }

    pub fn eval_on_parse(&self) -> bool {
        self.eval_on_parse
    }

    pub fn arena(&self) -> &CodeBlockArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut CodeBlockArena {
        &mut self.arena
    }

    pub fn variable(&self, vref: VarRef) -> &Variable {
        &self.vars[vref.0]
    }

    /// Number of variables created so far, including forward
    /// declarations and anonymous entries — used by the FFI surface to
    /// bounds-check a caller-supplied `VarRef` before indexing with it.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Linear probe keyed by (hash, length, bytes), per spec §4.G.
    pub fn get(&self, name: &str) -> Option<VarRef> {
        let h = hash_name(name);
        self.vars
            .iter()
            .position(|v| v.hash == h && v.name == name)
            .map(VarRef)
    }

    /// Create an empty, unimplemented variable (arity unset, empty
    /// block). Used directly for forward declarations encountered during
    /// parsing; `get_or_create` wraps it for the common lookup-or-declare
    /// case.
    fn create_unimplemented(&mut self, name: &str) -> VarRef {
        let block_ref = self.arena.alloc(CodeBlock::new());
        let vref = VarRef(self.vars.len());
        self.owner_of.insert(block_ref, vref);
        self.vars.push(Variable {
            name: name.to_string(),
            hash: hash_name(name),
            block: block_ref,
            has_impl: false,
            deps: Vec::new(),
        });
        vref
    }

    /// `put(name)` (spec §4.G): look up `name`, or forward-declare it.
    pub fn get_or_create(&mut self, name: &str) -> VarRef {
        match self.get(name) {
            Some(vref) => vref,
            None => self.create_unimplemented(name),
        }
    }

    fn recompute_deps(&mut self, vref: VarRef) {
        let block_ref = self.vars[vref.0].block;
        let deps: Vec<VarRef> = self
            .arena
            .get(block_ref)
            .dep_list()
            .into_iter()
            .map(|callee| self.owner_of[&callee])
            .collect();
        self.vars[vref.0].deps = deps;
    }

    /// Breadth-first walk of the dependency graph from `root`, per spec
    /// §4.G: a back-pointer map records, for each first-discovered
    /// dependency, the variable that discovered it, forming a reverse
    /// spanning tree. Returns the printable chain (root, ..., root) when
    /// the walk reaches back to `root`.
    ///
    /// Walking `used_by` backward from `root` retraces the dependency
    /// edges forward (root depends on the first entry, which depends on
    /// the next, ...), so the chain built this way is already in print
    /// order — it must not be reversed afterward.
    fn detect_cycle(&self, root: VarRef) -> Option<Vec<VarRef>> {
        let mut used_by: HashMap<VarRef, VarRef> = HashMap::new();
        let mut queue: VecDeque<VarRef> = VecDeque::new();

        for &dep in self.vars[root.0].deps() {
            used_by.entry(dep).or_insert(root);
            queue.push_back(dep);
        }

        while let Some(v) = queue.pop_front() {
            if v == root {
                let mut chain = vec![root];
                let mut cur = root;
                loop {
                    cur = used_by[&cur];
                    chain.push(cur);
                    if cur == root {
                        break;
                    }
                }
                return Some(chain);
            }
            for &dep in self.vars[v.0].deps() {
                if let std::collections::hash_map::Entry::Vacant(e) = used_by.entry(dep) {
                    e.insert(v);
                    queue.push_back(dep);
                }
            }
        }
        None
    }

    /// `define(text)` (spec §4.G): parse an optional label, then attach
    /// the parsed expression to the named (or anonymous) variable.
    pub fn define(&mut self, text: &str) -> Result<VarRef, EngineError> {
        match try_parse_label(text) {
            Some((name, params, expr_start)) => {
                self.define_named(&name, &params, &text[expr_start..], expr_start)
            }
            None => self.define_anonymous(text),
        }
    }

    fn define_named(
        &mut self,
        name: &str,
        params: &[String],
        expr_text: &str,
        base_offset: usize,
    ) -> Result<VarRef, EngineError> {
        let declared_arity = params.len() as u8;
        let parsed_block = parser::parse_expression(expr_text, params, self)
            .map_err(|e| EngineError::new(e.kind, base_offset + e.position))?;

        match self.get(name) {
            None => {
                let vref = self.create_unimplemented(name);
                let block_ref = self.vars[vref.0].block;
                *self.arena.get_mut(block_ref) = parsed_block;
                self.vars[vref.0].has_impl = true;
                self.recompute_deps(vref);
                Ok(vref)
            }
            Some(vref) => {
                if self.vars[vref.0].has_impl {
                    self.last_redef = Some(vref);
                    return Err(EngineError::new(ErrorKind::Redef, base_offset));
                }
                let block_ref = self.vars[vref.0].block;
                if let Some(existing_arity) = self.arena.get(block_ref).get_arity() {
                    if existing_arity != declared_arity {
                        return Err(EngineError::new(ErrorKind::ArityMismatch, base_offset));
                    }
                }

                *self.arena.get_mut(block_ref) = parsed_block;
                self.vars[vref.0].has_impl = true;
                self.recompute_deps(vref);

                if let Some(chain) = self.detect_cycle(vref) {
                    self.arena.get_mut(block_ref).reset();
                    self.vars[vref.0].has_impl = false;
                    self.vars[vref.0].deps.clear();
                    self.cycle_chain = chain;
                    return Err(EngineError::new(ErrorKind::CircularDependency, base_offset));
                }
                Ok(vref)
            }
        }
    }

    /// A label-less `define` is a bare expression to evaluate: attached
    /// under a name no user identifier can ever spell (a leading space),
    /// so it can never be looked up, redefined, or depended upon — it
    /// only ever *consumes* other variables, so no cycle check is needed.
    fn define_anonymous(&mut self, text: &str) -> Result<VarRef, EngineError> {
        let block = parser::parse_expression(text, &[], self)?;
        let name = format!(" anon#{}", self.anon_counter);
        self.anon_counter += 1;

        let block_ref = self.arena.alloc(block);
        let vref = VarRef(self.vars.len());
        self.owner_of.insert(block_ref, vref);
        self.vars.push(Variable {
            name,
            hash: 0,
            block: block_ref,
            has_impl: true,
            deps: Vec::new(),
        });
        self.recompute_deps(vref);
        Ok(vref)
    }

    /// Evaluate a variable's block with no arguments. Only legal for
    /// arity-0 variables; a function variable fetched this way surfaces
    /// `MissingArgs` the same way a direct bytecode call would (spec
    /// §4.G "a defined failure").
    pub fn value(&mut self, vref: VarRef) -> Result<Scalar, ErrorKind> {
        if !self.vars[vref.0].has_impl {
            return Err(ErrorKind::IncompleteCode);
        }
        let block_ref = self.vars[vref.0].block;
        self.arena.eval(block_ref, &[])
    }

    pub fn var_name(&self, vref: VarRef) -> &str {
        &self.vars[vref.0].name
    }

    pub fn var_print(&mut self, vref: VarRef) -> String {
        match self.value(vref) {
            Ok(v) => v.print(),
            Err(e) => format!("ERR {}", e.strerror()),
        }
    }

    /// Walks the back-pointer chain recorded by the last rejected
    /// `define`, joined by " <- ", closing with the root again.
    pub fn format_cycle(&self) -> String {
        self.cycle_chain
            .iter()
            .map(|v| self.vars[v.0].name.as_str())
            .collect::<Vec<_>>()
            .join(" <- ")
    }

    pub fn format_redef(&self) -> String {
        self.last_redef
            .map(|v| self.vars[v.0].name.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_fetch_value() {
        let mut ns = Namespace::new(true);
        let vref = ns.define("x: 2 + 3").unwrap();
        assert_eq!(ns.var_name(vref), "x");
        assert_eq!(ns.value(vref).unwrap(), Scalar::Rational { num: 5, den: 1 });
    }

    #[test]
    fn forward_reference_then_definition() {
        let mut ns = Namespace::new(true);
        let y = ns.define("x: y + 1").unwrap();
        ns.define("y: 4").unwrap();
        assert_eq!(
            ns.value(y).unwrap(),
            Scalar::Rational { num: 5, den: 1 }
        );
    }

    #[test]
    fn redefinition_is_rejected() {
        let mut ns = Namespace::new(true);
        ns.define("x: 1").unwrap();
        let err = ns.define("x: 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Redef);
        assert_eq!(ns.format_redef(), "x");
    }

    #[test]
    fn arity_mismatch_on_forward_declared_redefinition() {
        let mut ns = Namespace::new(true);
        // Forward-declares "f" with arity 1 via the call inside g's body,
        // without implementing it.
        ns.define("g(x): f(x)").unwrap();
        let err = ns.define("f(x, y): x + y").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
    }

    #[test]
    fn direct_self_cycle_is_rejected() {
        let mut ns = Namespace::new(true);
        let err = ns.define("f(x): f(x - 1) + 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircularDependency);
        assert_eq!(ns.format_cycle(), "f <- f");
    }

    #[test]
    fn mutual_cycle_is_rejected_and_namespace_reverts() {
        let mut ns = Namespace::new(true);
        ns.define("a: b + 1").unwrap();
        let err = ns.define("b: a + 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircularDependency);
        assert_eq!(ns.format_cycle(), "b <- a <- b");
        let a = ns.get("a").unwrap();
        assert!(!ns.variable(a).has_impl());
    }

    #[test]
    fn anonymous_expression_does_not_collide() {
        let mut ns = Namespace::new(true);
        let first = ns.define("1 + 1").unwrap();
        let second = ns.define("2 + 2").unwrap();
        assert_eq!(ns.value(first).unwrap(), Scalar::Rational { num: 2, den: 1 });
        assert_eq!(ns.value(second).unwrap(), Scalar::Rational { num: 4, den: 1 });
    }

    #[test]
    fn user_function_call() {
        let mut ns = Namespace::new(true);
        ns.define("f(x): x^3 - sqrt(x)").unwrap();
        let q = ns.define("q: f(9)").unwrap();
        assert_eq!(ns.value(q).unwrap(), Scalar::Real(726.0));
    }
}
