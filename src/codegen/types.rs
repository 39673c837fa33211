//surface type names to llvm types

use super::CodegenError;
use llvm_sys::core::*;
use llvm_sys::prelude::{LLVMContextRef, LLVMTypeRef};

/// Returns an LLVM type based on the surface type name.
pub fn map_type(ctx: LLVMContextRef, name: &str) -> Result<LLVMTypeRef, CodegenError> {
    unsafe {
        match name {
            "void" => Ok(LLVMVoidTypeInContext(ctx)),
            "int" => Ok(LLVMInt64TypeInContext(ctx)),
            "double" => Ok(LLVMDoubleTypeInContext(ctx)),
            "string" => Ok(LLVMPointerType(LLVMInt8TypeInContext(ctx), 0)),
            "bool" => Ok(LLVMInt1TypeInContext(ctx)),
            _ => Err(CodegenError::UnknownType(name.to_string())),
        }
    }
}
