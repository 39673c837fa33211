//this is the core compiler state for codegen.
//owns the llvm context/module/builder plus the scope stack,
//and exposes the builder primitives the lowering is written against

use super::scope::ScopeStack;
use super::{types, CodegenResult};
use llvm_sys::core::*;
use llvm_sys::prelude::*;
use llvm_sys::{LLVMLinkage, LLVMTypeKind};
use std::ffi::CString;

pub struct Codegen {
    pub context: LLVMContextRef,
    pub module: LLVMModuleRef,
    pub builder: LLVMBuilderRef,
    pub scopes: ScopeStack,
    pub entry_function: Option<LLVMValueRef>,
    string_counter: usize,
}

impl Codegen {
    pub fn new(module_name: &str) -> Self {
        unsafe {
            let context = LLVMContextCreate();
            let module_name = CString::new(module_name).unwrap();
            let module = LLVMModuleCreateWithNameInContext(module_name.as_ptr(), context);
            let builder = LLVMCreateBuilderInContext(context);
            Codegen {
                context,
                module,
                builder,
                scopes: ScopeStack::new(),
                entry_function: None,
                string_counter: 0,
            }
        }
    }

    pub fn ir_type(&self, name: &str) -> CodegenResult<LLVMTypeRef> {
        types::map_type(self.context, name)
    }

    /// Point the builder at the end of the innermost scope's block. Every
    /// primitive below does this first, so instructions always land in the
    /// block the scope stack says is current.
    pub fn position_at_current(&self) -> CodegenResult<()> {
        let block = self.scopes.current_block()?;
        unsafe { LLVMPositionBuilderAtEnd(self.builder, block) };
        Ok(())
    }

    /// A fresh basic block appended to the function that owns the current
    /// block.
    pub fn append_block(&mut self, name: &str) -> CodegenResult<LLVMBasicBlockRef> {
        let current = self.scopes.current_block()?;
        unsafe {
            let function = LLVMGetBasicBlockParent(current);
            let name_c = CString::new(name).unwrap();
            Ok(LLVMAppendBasicBlockInContext(
                self.context,
                function,
                name_c.as_ptr(),
            ))
        }
    }

    pub fn move_block_after(&self, block: LLVMBasicBlockRef, after: LLVMBasicBlockRef) {
        unsafe { LLVMMoveBasicBlockAfter(block, after) };
    }

    /// Stack slot in the entry block of the enclosing function. Locals live
    /// for the whole function no matter where they are declared, and
    /// entry-block allocas are what mem2reg promotes.
    pub fn entry_alloca(&mut self, ty: LLVMTypeRef, name: &str) -> CodegenResult<LLVMValueRef> {
        let current = self.scopes.current_block()?;
        unsafe {
            let function = LLVMGetBasicBlockParent(current);
            let entry = LLVMGetEntryBasicBlock(function);
            let first = LLVMGetFirstInstruction(entry);
            if first.is_null() {
                LLVMPositionBuilderAtEnd(self.builder, entry);
            } else {
                LLVMPositionBuilderBefore(self.builder, first);
            }
            let name_c = CString::new(name).unwrap();
            let slot = LLVMBuildAlloca(self.builder, ty, name_c.as_ptr());
            LLVMPositionBuilderAtEnd(self.builder, current);
            Ok(slot)
        }
    }

    pub fn load(&mut self, ty: LLVMTypeRef, ptr: LLVMValueRef, name: &str) -> CodegenResult<LLVMValueRef> {
        self.position_at_current()?;
        unsafe {
            let name_c = CString::new(name).unwrap();
            Ok(LLVMBuildLoad2(self.builder, ty, ptr, name_c.as_ptr()))
        }
    }

    pub fn store(&mut self, value: LLVMValueRef, ptr: LLVMValueRef) -> CodegenResult<LLVMValueRef> {
        self.position_at_current()?;
        unsafe {
            let value = self.coerce_pointer_for_store(value, ptr);
            Ok(LLVMBuildStore(self.builder, value, ptr))
        }
    }

    // Under LLVM's (pre-opaque-pointer) typed pointer representation, two
    // pointer types with different pointees are distinct even when the
    // addresses they hold are interchangeable (e.g. an array and its first
    // element). Bitcast the value to the slot's pointee type when needed so
    // the store type-checks; this changes no runtime value, only its static
    // LLVM type.
    unsafe fn coerce_pointer_for_store(
        &self,
        value: LLVMValueRef,
        ptr: LLVMValueRef,
    ) -> LLVMValueRef {
        let value_ty = LLVMTypeOf(value);
        if LLVMGetTypeKind(value_ty) != LLVMTypeKind::LLVMPointerTypeKind {
            return value;
        }
        let expected_ty = LLVMGetElementType(LLVMTypeOf(ptr));
        if expected_ty == value_ty {
            return value;
        }
        LLVMBuildBitCast(self.builder, value, expected_ty, b"\0".as_ptr() as *const _)
    }

    pub fn const_int(&self, value: i64) -> LLVMValueRef {
        unsafe { LLVMConstInt(LLVMInt64TypeInContext(self.context), value as u64, 1) }
    }

    pub fn const_double(&self, value: f64) -> LLVMValueRef {
        unsafe { LLVMConstReal(LLVMDoubleTypeInContext(self.context), value) }
    }

    pub fn const_bool(&self, value: bool) -> LLVMValueRef {
        unsafe { LLVMConstInt(LLVMInt1TypeInContext(self.context), value as u64, 0) }
    }

    /// A private constant global holding the unescaped bytes of `raw` plus
    /// a trailing NUL, as a pointer to the first byte. `raw` still carries
    /// its surrounding quotes.
    pub fn string_literal(&mut self, raw: &str) -> LLVMValueRef {
        let bytes = unescape(raw);
        unsafe {
            let const_str = LLVMConstStringInContext(
                self.context,
                bytes.as_ptr() as *const _,
                bytes.len() as u32,
                0,
            );
            let name_c = CString::new(format!(".str{}", self.string_counter)).unwrap();
            self.string_counter += 1;
            let global = LLVMAddGlobal(self.module, LLVMTypeOf(const_str), name_c.as_ptr());
            LLVMSetLinkage(global, LLVMLinkage::LLVMPrivateLinkage);
            LLVMSetInitializer(global, const_str);
            LLVMSetGlobalConstant(global, 1);
            let i32_ty = LLVMInt32TypeInContext(self.context);
            let mut zeros = [LLVMConstInt(i32_ty, 0, 0), LLVMConstInt(i32_ty, 0, 0)];
            LLVMConstInBoundsGEP2(LLVMTypeOf(const_str), global, zeros.as_mut_ptr(), 2)
        }
    }

    pub fn declare_function(
        &mut self,
        name: &str,
        ret: LLVMTypeRef,
        params: &[LLVMTypeRef],
        linkage: LLVMLinkage,
    ) -> LLVMValueRef {
        unsafe {
            let fn_ty = LLVMFunctionType(ret, params.as_ptr() as *mut _, params.len() as u32, 0);
            let name_c = CString::new(name).unwrap();
            let function = LLVMAddFunction(self.module, name_c.as_ptr(), fn_ty);
            LLVMSetLinkage(function, linkage);
            function
        }
    }

    /// Resolve a call target against the module's function table.
    pub fn function(&self, name: &str) -> Option<(LLVMValueRef, LLVMTypeRef)> {
        unsafe {
            let name_c = CString::new(name).unwrap();
            let function = LLVMGetNamedFunction(self.module, name_c.as_ptr());
            if function.is_null() {
                None
            } else {
                Some((function, LLVMGlobalGetValueType(function)))
            }
        }
    }

    pub fn dispose(self) {
        unsafe {
            LLVMDisposeBuilder(self.builder);
            LLVMDisposeModule(self.module);
            LLVMContextDispose(self.context);
        }
    }
}

// Strips the surrounding quotes and decodes `\n`. Any other backslash pair
// is copied through verbatim.
fn unescape(raw: &str) -> Vec<u8> {
    let inner = &raw.as_bytes()[1..raw.len() - 1];
    let mut out = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        if inner[i] == b'\\' && i + 1 < inner.len() && inner[i + 1] == b'n' {
            out.push(b'\n');
            i += 2;
        } else {
            out.push(inner[i]);
            i += 1;
        }
    }
    out
}
