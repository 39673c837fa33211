//llvm ir generation for expressions.
//every variant produces a value; operands are always lowered left to
//right because calls buried in them have observable side effects

use super::context::Codegen;
use super::{CodegenError, CodegenResult};
use crate::ast::{Expr, Op};
use llvm_sys::core::*;
use llvm_sys::prelude::{LLVMTypeRef, LLVMValueRef};
use llvm_sys::{LLVMIntPredicate, LLVMRealPredicate, LLVMTypeKind};

pub fn lower_expr(cg: &mut Codegen, expr: &Expr) -> CodegenResult<LLVMValueRef> {
    match expr {
        Expr::Integer(v) => Ok(cg.const_int(*v)),
        Expr::Double(v) => Ok(cg.const_double(*v)),
        Expr::Bool(v) => Ok(cg.const_bool(*v)),
        Expr::Str(raw) => Ok(cg.string_literal(raw)),
        Expr::Identifier(name) => {
            let sym = cg.scopes.lookup(name)?;
            cg.load(sym.ty, sym.slot, name)
        }
        Expr::Call { callee, args } => lower_call(cg, callee, args),
        Expr::Array(items) => lower_array_literal(cg, items),
        Expr::ArrayRead { array, index } => {
            let (addr, elem_ty) = array_element_addr(cg, array, index)?;
            cg.load(elem_ty, addr, "")
        }
        Expr::ArrayWrite {
            array,
            index,
            op,
            value,
        } => lower_array_write(cg, array, index, *op, value),
        Expr::Binary { lhs, op, rhs } => lower_binary(cg, lhs, *op, rhs),
        Expr::Unary { op, operand } => lower_unary(cg, *op, operand),
        Expr::Assign { target, op, value } => lower_assign(cg, target, *op, value),
    }
}

fn lower_call(cg: &mut Codegen, callee: &str, args: &[Expr]) -> CodegenResult<LLVMValueRef> {
    let (function, fn_ty) = cg
        .function(callee)
        .ok_or_else(|| CodegenError::UnknownFunction(callee.to_string()))?;
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(lower_expr(cg, arg)?);
    }
    cg.position_at_current()?;
    unsafe {
        Ok(LLVMBuildCall2(
            cg.builder,
            fn_ty,
            function,
            values.as_mut_ptr(),
            values.len() as u32,
            b"\0".as_ptr() as *const _,
        ))
    }
}

// Items land in a stack array in the current block; the element type is
// taken from the first item. The expression's value is the slot address.
fn lower_array_literal(cg: &mut Codegen, items: &[Expr]) -> CodegenResult<LLVMValueRef> {
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        values.push(lower_expr(cg, item)?);
    }
    if values.is_empty() {
        return Err(CodegenError::EmptyArrayLiteral);
    }
    cg.position_at_current()?;
    unsafe {
        let elem_ty = LLVMTypeOf(values[0]);
        let array_ty = LLVMArrayType(elem_ty, values.len() as u32);
        let slot = LLVMBuildAlloca(cg.builder, array_ty, b"arr\0".as_ptr() as *const _);
        for (i, value) in values.iter().enumerate() {
            let mut indices = [cg.const_int(i as i64)];
            let addr = LLVMBuildGEP2(
                cg.builder,
                elem_ty,
                slot,
                indices.as_mut_ptr(),
                1,
                b"\0".as_ptr() as *const _,
            );
            LLVMBuildStore(cg.builder, *value, addr);
        }
        Ok(slot)
    }
}

// The slot of an array local holds a pointer to the first element; the
// element address is that pointer offset by the index, element-strided.
fn array_element_addr(
    cg: &mut Codegen,
    array: &str,
    index: &Expr,
) -> CodegenResult<(LLVMValueRef, LLVMTypeRef)> {
    let sym = cg.scopes.lookup(array)?;
    let ptr_ty = unsafe { LLVMPointerType(sym.ty, 0) };
    let base = cg.load(ptr_ty, sym.slot, array)?;
    let idx = lower_expr(cg, index)?;
    cg.position_at_current()?;
    unsafe {
        let mut indices = [idx];
        let addr = LLVMBuildGEP2(
            cg.builder,
            sym.ty,
            base,
            indices.as_mut_ptr(),
            1,
            b"\0".as_ptr() as *const _,
        );
        Ok((addr, sym.ty))
    }
}

fn lower_array_write(
    cg: &mut Codegen,
    array: &str,
    index: &Expr,
    op: Op,
    value: &Expr,
) -> CodegenResult<LLVMValueRef> {
    let (addr, elem_ty) = array_element_addr(cg, array, index)?;
    match op.compound_base() {
        None => {
            let rhs = lower_expr(cg, value)?;
            cg.store(rhs, addr)
        }
        Some(base) => {
            let current = cg.load(elem_ty, addr, "")?;
            let rhs = lower_expr(cg, value)?;
            let combined = arith(cg, base, current, rhs)?;
            cg.store(combined, addr)
        }
    }
}

pub(super) fn lower_assign(
    cg: &mut Codegen,
    target: &str,
    op: Op,
    value: &Expr,
) -> CodegenResult<LLVMValueRef> {
    let sym = cg.scopes.lookup(target)?;
    match op.compound_base() {
        None => {
            let rhs = lower_expr(cg, value)?;
            cg.store(rhs, sym.slot)
        }
        Some(base) => {
            let current = cg.load(sym.ty, sym.slot, target)?;
            let rhs = lower_expr(cg, value)?;
            let combined = arith(cg, base, current, rhs)?;
            cg.store(combined, sym.slot)
        }
    }
}

fn lower_binary(cg: &mut Codegen, lhs: &Expr, op: Op, rhs: &Expr) -> CodegenResult<LLVMValueRef> {
    let left = lower_expr(cg, lhs)?;
    let right = lower_expr(cg, rhs)?;
    if op.is_arithmetic() {
        arith(cg, op, left, right)
    } else if op.is_comparison() {
        compare(cg, op, left, right)
    } else {
        Err(CodegenError::BadBinary(op))
    }
}

fn lower_unary(cg: &mut Codegen, op: Op, operand: &Expr) -> CodegenResult<LLVMValueRef> {
    let value = lower_expr(cg, operand)?;
    cg.position_at_current()?;
    unsafe {
        match op {
            Op::Minus => {
                if is_double(value) {
                    Ok(LLVMBuildFNeg(cg.builder, value, b"fneg\0".as_ptr() as *const _))
                } else {
                    Ok(LLVMBuildNeg(cg.builder, value, b"neg\0".as_ptr() as *const _))
                }
            }
            Op::Not => Ok(LLVMBuildNot(cg.builder, value, b"not\0".as_ptr() as *const _)),
            _ => Err(CodegenError::BadUnary(op)),
        }
    }
}

fn is_double(value: LLVMValueRef) -> bool {
    unsafe { LLVMGetTypeKind(LLVMTypeOf(value)) == LLVMTypeKind::LLVMDoubleTypeKind }
}

// Integer operands take the signed integer instructions; as soon as one
// side is a double both sides go through the float instructions, promoting
// the integer one.
pub(super) fn arith(
    cg: &mut Codegen,
    op: Op,
    left: LLVMValueRef,
    right: LLVMValueRef,
) -> CodegenResult<LLVMValueRef> {
    cg.position_at_current()?;
    unsafe {
        if is_double(left) || is_double(right) {
            let (left, right) = promote_to_double(cg, left, right);
            let value = match op {
                Op::Plus => LLVMBuildFAdd(cg.builder, left, right, b"fadd\0".as_ptr() as *const _),
                Op::Minus => LLVMBuildFSub(cg.builder, left, right, b"fsub\0".as_ptr() as *const _),
                Op::Mul => LLVMBuildFMul(cg.builder, left, right, b"fmul\0".as_ptr() as *const _),
                Op::Div => LLVMBuildFDiv(cg.builder, left, right, b"fdiv\0".as_ptr() as *const _),
                _ => return Err(CodegenError::BadBinary(op)),
            };
            Ok(value)
        } else {
            let value = match op {
                Op::Plus => LLVMBuildAdd(cg.builder, left, right, b"add\0".as_ptr() as *const _),
                Op::Minus => LLVMBuildSub(cg.builder, left, right, b"sub\0".as_ptr() as *const _),
                Op::Mul => LLVMBuildMul(cg.builder, left, right, b"mul\0".as_ptr() as *const _),
                Op::Div => LLVMBuildSDiv(cg.builder, left, right, b"sdiv\0".as_ptr() as *const _),
                _ => return Err(CodegenError::BadBinary(op)),
            };
            Ok(value)
        }
    }
}

fn compare(
    cg: &mut Codegen,
    op: Op,
    left: LLVMValueRef,
    right: LLVMValueRef,
) -> CodegenResult<LLVMValueRef> {
    cg.position_at_current()?;
    unsafe {
        if is_double(left) || is_double(right) {
            let (left, right) = promote_to_double(cg, left, right);
            let pred = match op {
                Op::Eq => LLVMRealPredicate::LLVMRealOEQ,
                Op::Ne => LLVMRealPredicate::LLVMRealONE,
                Op::Lt => LLVMRealPredicate::LLVMRealOLT,
                Op::Le => LLVMRealPredicate::LLVMRealOLE,
                Op::Gt => LLVMRealPredicate::LLVMRealOGT,
                Op::Ge => LLVMRealPredicate::LLVMRealOGE,
                _ => return Err(CodegenError::BadBinary(op)),
            };
            Ok(LLVMBuildFCmp(
                cg.builder,
                pred,
                left,
                right,
                b"fcmp\0".as_ptr() as *const _,
            ))
        } else {
            let pred = match op {
                Op::Eq => LLVMIntPredicate::LLVMIntEQ,
                Op::Ne => LLVMIntPredicate::LLVMIntNE,
                Op::Lt => LLVMIntPredicate::LLVMIntSLT,
                Op::Le => LLVMIntPredicate::LLVMIntSLE,
                Op::Gt => LLVMIntPredicate::LLVMIntSGT,
                Op::Ge => LLVMIntPredicate::LLVMIntSGE,
                _ => return Err(CodegenError::BadBinary(op)),
            };
            Ok(LLVMBuildICmp(
                cg.builder,
                pred,
                left,
                right,
                b"icmp\0".as_ptr() as *const _,
            ))
        }
    }
}

fn promote_to_double(
    cg: &Codegen,
    left: LLVMValueRef,
    right: LLVMValueRef,
) -> (LLVMValueRef, LLVMValueRef) {
    let double_ty = unsafe { LLVMDoubleTypeInContext(cg.context) };
    let promote = |v: LLVMValueRef| {
        if is_double(v) {
            v
        } else {
            unsafe { LLVMBuildSIToFP(cg.builder, v, double_ty, b"sitofp\0".as_ptr() as *const _) }
        }
    };
    (promote(left), promote(right))
}
