//the lexical scope stack used while lowering.
//each scope maps names to stack slots and tracks the basic block new
//instructions go into; function roots may carry a return slot

use super::CodegenError;
use llvm_sys::prelude::{LLVMBasicBlockRef, LLVMTypeRef, LLVMValueRef};
use std::collections::HashMap;

/// A named local: the alloca holding it and the type stored through it.
/// For arrays the type is the element type and the slot holds a pointer to
/// the first element.
#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    pub slot: LLVMValueRef,
    pub ty: LLVMTypeRef,
}

struct Scope {
    locals: HashMap<String, Symbol>,
    block: LLVMBasicBlockRef,
    return_slot: Option<Symbol>,
    // function roots stop the outward return-slot walk
    boundary: bool,
}

impl Scope {
    fn new(block: LLVMBasicBlockRef, boundary: bool) -> Self {
        Self {
            locals: HashMap::new(),
            block,
            return_slot: None,
            boundary,
        }
    }
}

/// Innermost scope last. Not thread-safe; a single lowering pass owns it.
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self, block: LLVMBasicBlockRef) {
        self.scopes.push(Scope::new(block, false));
    }

    /// Push the root scope of a function body.
    pub fn push_function(&mut self, block: LLVMBasicBlockRef) {
        self.scopes.push(Scope::new(block, true));
    }

    pub fn pop(&mut self) -> Result<(), CodegenError> {
        self.scopes.pop().map(|_| ()).ok_or(CodegenError::NoScope)
    }

    /// Discard every scope above `depth`. Used on both the normal and the
    /// error exit path of function lowering.
    pub fn pop_to(&mut self, depth: usize) {
        self.scopes.truncate(depth);
    }

    /// Insert into the innermost scope; a name may be declared only once
    /// per scope.
    pub fn define(&mut self, name: &str, slot: LLVMValueRef, ty: LLVMTypeRef) -> Result<(), CodegenError> {
        let scope = self.scopes.last_mut().ok_or(CodegenError::NoScope)?;
        if scope.locals.contains_key(name) {
            return Err(CodegenError::Redeclared(name.to_string()));
        }
        scope.locals.insert(name.to_string(), Symbol { slot, ty });
        Ok(())
    }

    /// Walk the scopes from innermost outward; the first hit wins.
    pub fn lookup(&self, name: &str) -> Result<Symbol, CodegenError> {
        for scope in self.scopes.iter().rev() {
            if let Some(sym) = scope.locals.get(name) {
                return Ok(*sym);
            }
        }
        Err(CodegenError::Undeclared(name.to_string()))
    }

    pub fn current_block(&self) -> Result<LLVMBasicBlockRef, CodegenError> {
        self.scopes
            .last()
            .map(|s| s.block)
            .ok_or(CodegenError::NoScope)
    }

    pub fn set_current_block(&mut self, block: LLVMBasicBlockRef) -> Result<(), CodegenError> {
        let scope = self.scopes.last_mut().ok_or(CodegenError::NoScope)?;
        scope.block = block;
        Ok(())
    }

    /// Record the return slot on the innermost scope (a function root).
    pub fn set_return_slot(&mut self, sym: Symbol) -> Result<(), CodegenError> {
        let scope = self.scopes.last_mut().ok_or(CodegenError::NoScope)?;
        scope.return_slot = Some(sym);
        Ok(())
    }

    /// The return slot of the enclosing function, if it has one. The walk
    /// stops at the nearest function root so nested functions never see
    /// their caller's slot.
    pub fn return_slot(&self) -> Option<Symbol> {
        for scope in self.scopes.iter().rev() {
            if let Some(sym) = scope.return_slot {
                return Some(sym);
            }
            if scope.boundary {
                return None;
            }
        }
        None
    }
}
