//the preloaded runtime built-ins.
//they are declared as ordinary externs in the module before user code is
//lowered, and their native implementations are registered with the JIT's
//symbol table so `bee run` resolves them in-process. In compile mode the
//object file keeps them as undefined symbols for the final link.

use super::context::Codegen;
use super::CodegenResult;
use llvm_sys::support::LLVMAddSymbol;
use llvm_sys::LLVMLinkage;
use std::ffi::{c_char, c_void, CStr};
use std::io::Write;
use std::sync::Once;

/// # Safety
/// `text` must be a valid NUL-terminated string or null.
pub unsafe extern "C" fn builtin_print(text: *const c_char) {
    if text.is_null() {
        return;
    }
    let s = unsafe { CStr::from_ptr(text) };
    print!("{}", s.to_string_lossy());
    std::io::stdout().flush().ok();
}

pub extern "C" fn builtin_printi(value: i64) {
    println!("{}", value);
}

pub extern "C" fn builtin_printd(value: f64) {
    println!("{}", value);
}

/// Declare the built-ins in the module so user programs can call them.
pub fn declare_builtins(cg: &mut Codegen) -> CodegenResult<()> {
    let void = cg.ir_type("void")?;
    let int = cg.ir_type("int")?;
    let double = cg.ir_type("double")?;
    let string = cg.ir_type("string")?;
    cg.declare_function("print", void, &[string], LLVMLinkage::LLVMExternalLinkage);
    cg.declare_function("printi", void, &[int], LLVMLinkage::LLVMExternalLinkage);
    cg.declare_function("printd", void, &[double], LLVMLinkage::LLVMExternalLinkage);
    Ok(())
}

/// Map an extern's name to a native address for JIT resolution. The
/// mapping is process-wide, so embedders (and tests) can add their own
/// recorders next to the built-ins.
pub fn register_symbol(name: &CStr, addr: *mut c_void) {
    unsafe { LLVMAddSymbol(name.as_ptr(), addr) };
}

static LINK: Once = Once::new();

pub fn link_builtins() {
    LINK.call_once(|| {
        register_symbol(c"print", builtin_print as usize as *mut c_void);
        register_symbol(c"printi", builtin_printi as usize as *mut c_void);
        register_symbol(c"printd", builtin_printd as usize as *mut c_void);
    });
}
