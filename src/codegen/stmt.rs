//llvm ir generation for statements: declarations, control flow and
//function bodies. Conditionals and loops stitch basic blocks together and
//leave a fresh `continue` block as the insertion point for whatever
//follows them.

use super::context::Codegen;
use super::scope::Symbol;
use super::{expr, CodegenResult};
use crate::ast::{Block, Expr, Op, Param, Stmt};
use llvm_sys::core::*;
use llvm_sys::prelude::{LLVMTypeRef, LLVMValueRef};
use llvm_sys::LLVMLinkage;
use std::ffi::CString;

pub fn lower_block(cg: &mut Codegen, block: &Block) -> CodegenResult<()> {
    for stmt in &block.stmts {
        lower_stmt(cg, stmt)?;
    }
    Ok(())
}

pub fn lower_stmt(cg: &mut Codegen, stmt: &Stmt) -> CodegenResult<()> {
    match stmt {
        Stmt::Expr(e) => expr::lower_expr(cg, e).map(|_| ()),
        Stmt::Return(e) => lower_return(cg, e),
        Stmt::VarDecl { ty, name, init } => lower_var_decl(cg, ty, name, init.as_ref()),
        Stmt::ArrayDecl {
            elem_ty,
            name,
            init,
        } => lower_array_decl(cg, elem_ty, name, init.as_ref()),
        Stmt::ExternDecl {
            ret_ty,
            name,
            params,
        } => lower_extern(cg, ret_ty, name, params),
        Stmt::FunctionDecl {
            ret_ty,
            name,
            params,
            body,
        } => lower_function(cg, ret_ty, name, params, body),
        Stmt::If {
            cond,
            then_block,
            else_block,
        } => lower_if(cg, cond, then_block, else_block),
        Stmt::Loop { cond, body } => lower_loop(cg, cond, body),
    }
}

// The value lands in the enclosing function's return slot; the actual
// `ret` is emitted by the function lowerer when the body is done. A return
// in the top-level block has no slot and is evaluated for its effects only.
fn lower_return(cg: &mut Codegen, e: &Expr) -> CodegenResult<()> {
    let value = expr::lower_expr(cg, e)?;
    if let Some(slot) = cg.scopes.return_slot() {
        cg.store(value, slot.slot)?;
    }
    Ok(())
}

fn lower_var_decl(
    cg: &mut Codegen,
    ty: &str,
    name: &str,
    init: Option<&Expr>,
) -> CodegenResult<()> {
    let ir_ty = cg.ir_type(ty)?;
    let slot = cg.entry_alloca(ir_ty, name)?;
    cg.scopes.define(name, slot, ir_ty)?;
    if let Some(init) = init {
        expr::lower_assign(cg, name, Op::Assign, init)?;
    }
    Ok(())
}

// The slot holds a pointer to the element type; the initializer (usually
// an array literal) stores the base pointer through it.
fn lower_array_decl(
    cg: &mut Codegen,
    elem_ty: &str,
    name: &str,
    init: Option<&Expr>,
) -> CodegenResult<()> {
    let ir_elem_ty = cg.ir_type(elem_ty)?;
    let ptr_ty = unsafe { LLVMPointerType(ir_elem_ty, 0) };
    let slot = cg.entry_alloca(ptr_ty, name)?;
    cg.scopes.define(name, slot, ir_elem_ty)?;
    if let Some(init) = init {
        expr::lower_assign(cg, name, Op::Assign, init)?;
    }
    Ok(())
}

fn lower_extern(
    cg: &mut Codegen,
    ret_ty: &str,
    name: &str,
    params: &[Param],
) -> CodegenResult<()> {
    let ret = cg.ir_type(ret_ty)?;
    let param_tys = params
        .iter()
        .map(|p| cg.ir_type(&p.ty))
        .collect::<CodegenResult<Vec<_>>>()?;
    cg.declare_function(name, ret, &param_tys, LLVMLinkage::LLVMExternalLinkage);
    Ok(())
}

fn lower_function(
    cg: &mut Codegen,
    ret_ty: &str,
    name: &str,
    params: &[Param],
    body: &Block,
) -> CodegenResult<()> {
    let ret = cg.ir_type(ret_ty)?;
    let is_void = ret_ty == "void";
    let param_tys = params
        .iter()
        .map(|p| cg.ir_type(&p.ty))
        .collect::<CodegenResult<Vec<_>>>()?;
    let function = cg.declare_function(name, ret, &param_tys, LLVMLinkage::LLVMInternalLinkage);

    let entry = unsafe {
        LLVMAppendBasicBlockInContext(cg.context, function, b"entry\0".as_ptr() as *const _)
    };
    let depth = cg.scopes.depth();
    cg.scopes.push_function(entry);
    let result = lower_function_body(cg, function, ret, is_void, params, &param_tys, body);
    // the body may have left conditional/loop scopes pushed
    cg.scopes.pop_to(depth);
    result
}

fn lower_function_body(
    cg: &mut Codegen,
    function: LLVMValueRef,
    ret: LLVMTypeRef,
    is_void: bool,
    params: &[Param],
    param_tys: &[LLVMTypeRef],
    body: &Block,
) -> CodegenResult<()> {
    let ret_slot = if is_void {
        None
    } else {
        let slot = cg.entry_alloca(ret, "retval")?;
        cg.scopes.set_return_slot(Symbol { slot, ty: ret })?;
        Some(slot)
    };

    for (i, param) in params.iter().enumerate() {
        let ty = param_tys[i];
        let slot = cg.entry_alloca(ty, &param.name)?;
        cg.scopes.define(&param.name, slot, ty)?;
        unsafe {
            let arg = LLVMGetParam(function, i as u32);
            let name_c = CString::new(param.name.as_str()).unwrap();
            LLVMSetValueName2(arg, name_c.as_ptr(), name_c.as_bytes().len());
            cg.store(arg, slot)?;
        }
    }

    lower_block(cg, body)?;

    // close whichever block is current when the body runs out
    cg.position_at_current()?;
    unsafe {
        match ret_slot {
            Some(slot) => {
                let value = LLVMBuildLoad2(cg.builder, ret, slot, b"retval\0".as_ptr() as *const _);
                LLVMBuildRet(cg.builder, value);
            }
            None => {
                LLVMBuildRetVoid(cg.builder);
            }
        }
    }
    Ok(())
}

// then/else/continue: both arms branch to `continue`, which becomes the
// insertion point for the statements after the conditional. Empty arms
// still get their terminator.
fn lower_if(
    cg: &mut Codegen,
    cond: &Expr,
    then_block: &Block,
    else_block: &Block,
) -> CodegenResult<()> {
    let then_bb = cg.append_block("then")?;
    let else_bb = cg.append_block("else")?;
    let continue_bb = cg.append_block("continue")?;

    let cond_value = expr::lower_expr(cg, cond)?;
    cg.position_at_current()?;
    unsafe { LLVMBuildCondBr(cg.builder, cond_value, then_bb, else_bb) };

    cg.scopes.push(then_bb);
    lower_block(cg, then_block)?;
    cg.position_at_current()?;
    unsafe { LLVMBuildBr(cg.builder, continue_bb) };

    cg.move_block_after(else_bb, cg.scopes.current_block()?);
    cg.scopes.push(else_bb);
    lower_block(cg, else_block)?;
    cg.position_at_current()?;
    unsafe { LLVMBuildBr(cg.builder, continue_bb) };

    cg.move_block_after(continue_bb, cg.scopes.current_block()?);
    cg.scopes.push(continue_bb);
    Ok(())
}

// Pre-test at entry, post-test at the end of the body: the condition is
// lowered twice and its side effects run once before the loop and once per
// iteration after the body.
fn lower_loop(cg: &mut Codegen, cond: &Expr, body: &Block) -> CodegenResult<()> {
    let loop_bb = cg.append_block("loop")?;
    let continue_bb = cg.append_block("continue")?;

    let cond_value = expr::lower_expr(cg, cond)?;
    cg.position_at_current()?;
    unsafe { LLVMBuildCondBr(cg.builder, cond_value, loop_bb, continue_bb) };

    cg.scopes.push(loop_bb);
    lower_block(cg, body)?;
    let cond_again = expr::lower_expr(cg, cond)?;
    cg.position_at_current()?;
    unsafe { LLVMBuildCondBr(cg.builder, cond_again, loop_bb, continue_bb) };

    cg.move_block_after(continue_bb, cg.scopes.current_block()?);
    cg.scopes.push(continue_bb);
    Ok(())
}
