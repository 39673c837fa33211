//compiler kernel,
//all lowering modules are designated here, along with the module driver:
//the synthetic entry function, the optimization pipeline, IR emission
//and JIT execution

use crate::ast::{Block, Op};
use llvm_sys::analysis::{LLVMVerifierFailureAction, LLVMVerifyModule};
use llvm_sys::core::*;
use llvm_sys::error::{LLVMDisposeErrorMessage, LLVMGetErrorMessage};
use llvm_sys::execution_engine::{
    LLVMCreateExecutionEngineForModule, LLVMDisposeExecutionEngine, LLVMExecutionEngineRef,
    LLVMGetFunctionAddress, LLVMLinkInMCJIT,
};
use llvm_sys::target::{
    LLVM_InitializeNativeAsmParser, LLVM_InitializeNativeAsmPrinter, LLVM_InitializeNativeTarget,
};
use llvm_sys::transforms::pass_builder::{
    LLVMCreatePassBuilderOptions, LLVMDisposePassBuilderOptions, LLVMRunPasses,
};
use llvm_sys::LLVMLinkage;
use std::ffi::{c_char, CStr, CString};
use std::fmt;
use std::sync::Once;

pub mod context;
pub mod expr;
pub mod runtime;
pub mod scope;
pub mod stmt;
pub mod types;

use context::Codegen;

// promote memory to registers, combine instructions, reassociate, GVN,
// simplify the CFG
const PASS_PIPELINE: &[u8] = b"function(mem2reg,instcombine,reassociate,gvn,simplifycfg)\0";

#[derive(Debug)]
pub enum CodegenError {
    UnknownType(String),
    Undeclared(String),
    Redeclared(String),
    UnknownFunction(String),
    BadUnary(Op),
    BadBinary(Op),
    EmptyArrayLiteral,
    NoScope,
    Backend(String),
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodegenError::UnknownType(name) => write!(f, "nonexistent type {}", name),
            CodegenError::Undeclared(name) => write!(f, "undeclared variable {}", name),
            CodegenError::Redeclared(name) => write!(f, "variable already declared {}", name),
            CodegenError::UnknownFunction(name) => write!(f, "no such function {}", name),
            CodegenError::BadUnary(op) => write!(f, "{:?} is not a unary operator", op),
            CodegenError::BadBinary(op) => write!(f, "{:?} is not a binary operator", op),
            CodegenError::EmptyArrayLiteral => {
                write!(f, "array literal needs at least one element")
            }
            CodegenError::NoScope => write!(f, "no open scope"),
            CodegenError::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Lower a parsed program into a fresh module. The top-level block lands in
/// a synthetic void `main` with external linkage; runtime built-ins are
/// declared first so user code can call them.
pub fn lower_program(program: &Block) -> CodegenResult<Codegen> {
    let mut cg = Codegen::new("bee");
    let lowered = runtime::declare_builtins(&mut cg).and_then(|()| lower_entry(&mut cg, program));
    match lowered {
        Ok(()) => Ok(cg),
        Err(e) => {
            cg.dispose();
            Err(e)
        }
    }
}

fn lower_entry(cg: &mut Codegen, program: &Block) -> CodegenResult<()> {
    let void = cg.ir_type("void")?;
    let main = cg.declare_function("main", void, &[], LLVMLinkage::LLVMExternalLinkage);
    cg.entry_function = Some(main);

    let entry = unsafe {
        LLVMAppendBasicBlockInContext(cg.context, main, b"entry\0".as_ptr() as *const _)
    };
    let depth = cg.scopes.depth();
    cg.scopes.push_function(entry);
    let result = lower_top_level(cg, program);
    cg.scopes.pop_to(depth);
    result
}

fn lower_top_level(cg: &mut Codegen, program: &Block) -> CodegenResult<()> {
    stmt::lower_block(cg, program)?;
    cg.position_at_current()?;
    unsafe { LLVMBuildRetVoid(cg.builder) };
    Ok(())
}

pub fn verify(cg: &Codegen) -> CodegenResult<()> {
    unsafe {
        let mut error_msg: *mut c_char = std::ptr::null_mut();
        if LLVMVerifyModule(
            cg.module,
            LLVMVerifierFailureAction::LLVMReturnStatusAction,
            &mut error_msg,
        ) == 1
        {
            let msg = CStr::from_ptr(error_msg).to_string_lossy().into_owned();
            LLVMDisposeMessage(error_msg);
            return Err(CodegenError::Backend(format!(
                "module verification failed: {}",
                msg
            )));
        }
        if !error_msg.is_null() {
            LLVMDisposeMessage(error_msg);
        }
    }
    Ok(())
}

pub fn optimize(cg: &Codegen) -> CodegenResult<()> {
    unsafe {
        let options = LLVMCreatePassBuilderOptions();
        let err = LLVMRunPasses(
            cg.module,
            PASS_PIPELINE.as_ptr() as *const _,
            std::ptr::null_mut(),
            options,
        );
        LLVMDisposePassBuilderOptions(options);
        if !err.is_null() {
            let msg_ptr = LLVMGetErrorMessage(err);
            let msg = CStr::from_ptr(msg_ptr).to_string_lossy().into_owned();
            LLVMDisposeErrorMessage(msg_ptr);
            return Err(CodegenError::Backend(format!(
                "optimization pipeline failed: {}",
                msg
            )));
        }
    }
    Ok(())
}

/// Textual IR for the whole module.
pub fn ir_to_string(cg: &Codegen) -> String {
    unsafe {
        let ptr = LLVMPrintModuleToString(cg.module);
        let text = CStr::from_ptr(ptr).to_string_lossy().into_owned();
        LLVMDisposeMessage(ptr);
        text
    }
}

/// Write the module as textual IR, truncating any existing file.
pub fn write_ir(cg: &Codegen, path: &str) -> CodegenResult<()> {
    unsafe {
        let path_c = CString::new(path).unwrap();
        let mut error_msg: *mut c_char = std::ptr::null_mut();
        if LLVMPrintModuleToFile(cg.module, path_c.as_ptr(), &mut error_msg) != 0 {
            let msg = CStr::from_ptr(error_msg).to_string_lossy().into_owned();
            LLVMDisposeMessage(error_msg);
            return Err(CodegenError::Backend(format!(
                "failed to write {}: {}",
                path, msg
            )));
        }
    }
    Ok(())
}

static NATIVE_TARGET: Once = Once::new();

fn initialize_native_target() {
    NATIVE_TARGET.call_once(|| unsafe {
        LLVM_InitializeNativeTarget();
        LLVM_InitializeNativeAsmPrinter();
        LLVM_InitializeNativeAsmParser();
        LLVMLinkInMCJIT();
    });
}

/// Hand the module to an MCJIT execution engine and call the synthetic
/// entry function. The engine takes ownership of the module, so only the
/// builder and context are disposed here.
pub fn run_jit(cg: Codegen) -> CodegenResult<()> {
    if cg.entry_function.is_none() {
        cg.dispose();
        return Err(CodegenError::Backend(
            "module has no entry function".to_string(),
        ));
    }
    runtime::link_builtins();
    initialize_native_target();
    unsafe {
        let mut ee: LLVMExecutionEngineRef = std::ptr::null_mut();
        let mut error_msg: *mut c_char = std::ptr::null_mut();
        if LLVMCreateExecutionEngineForModule(&mut ee, cg.module, &mut error_msg) != 0 {
            let msg = CStr::from_ptr(error_msg).to_string_lossy().into_owned();
            LLVMDisposeMessage(error_msg);
            cg.dispose();
            return Err(CodegenError::Backend(format!(
                "failed to create JIT execution engine: {}",
                msg
            )));
        }

        let addr = LLVMGetFunctionAddress(ee, b"main\0".as_ptr() as *const _);
        let result = if addr == 0 {
            Err(CodegenError::Backend("entry function not found".to_string()))
        } else {
            type EntryFn = unsafe extern "C" fn();
            let entry: EntryFn = std::mem::transmute::<u64, EntryFn>(addr);
            entry();
            Ok(())
        };

        // the engine owns the module now
        LLVMDisposeExecutionEngine(ee);
        LLVMDisposeBuilder(cg.builder);
        LLVMContextDispose(cg.context);
        result
    }
}
