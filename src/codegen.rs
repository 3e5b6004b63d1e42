//! LLVM IR generation for crunch programs using Inkwell.
//!
//! The whole program becomes the body of `i32 main()`. Variables live in
//! stack slots registered in a [`ScopeStack`]; every emitted value carries its
//! semantic [`ValueType`] so promotion and type checks happen while walking
//! the tree.

use inkwell::{
    builder::Builder,
    context::Context as LlvmContext,
    module::{Linkage, Module},
    targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine, TargetTriple},
    types::{BasicType, BasicTypeEnum},
    values::{
        BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, IntValue, PointerValue,
    },
    AddressSpace, FloatPredicate, IntPredicate, OptimizationLevel,
};
use std::path::Path;
use tracing::{debug, info};

use crate::ast::{BinaryOp, DeclType, Expr, Program, Stmt, UnaryOp};
use crate::error::{CodegenError, CompileResult, SemanticError};
use crate::scope::{ScopeStack, Symbol};
use crate::token::Pos;
use crate::ty::ValueType;

/// An emitted value tagged with its crunch type.
#[derive(Debug, Clone, Copy)]
pub enum Value<'ctx> {
    Int(IntValue<'ctx>),    // i32
    Double(FloatValue<'ctx>), // f64
    Bool(IntValue<'ctx>),   // i1
    Str(PointerValue<'ctx>), // NUL-terminated buffer
}

impl<'ctx> Value<'ctx> {
    pub fn ty(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Double(_) => ValueType::Double,
            Value::Bool(_) => ValueType::Bool,
            Value::Str(_) => ValueType::Str,
        }
    }

    fn as_basic(&self) -> BasicValueEnum<'ctx> {
        match *self {
            Value::Int(v) | Value::Bool(v) => v.into(),
            Value::Double(v) => v.into(),
            Value::Str(v) => v.into(),
        }
    }
}

/// Stack slot backing a declared variable.
#[derive(Debug, Clone, Copy)]
pub struct Slot<'ctx> {
    ptr: PointerValue<'ctx>,
    llvm_ty: BasicTypeEnum<'ctx>,
}

#[derive(Clone, Copy)]
struct Formats<'ctx> {
    int: PointerValue<'ctx>,
    double: PointerValue<'ctx>,
    string: PointerValue<'ctx>,
    true_text: PointerValue<'ctx>,
    false_text: PointerValue<'ctx>,
}

/// Generates LLVM IR for one compilation unit and records its bindings.
pub struct Codegen<'ctx> {
    ctx: &'ctx LlvmContext,
    builder: Builder<'ctx>,
    module: Module<'ctx>,
    printf: FunctionValue<'ctx>,
    formats: Option<Formats<'ctx>>,
    scopes: ScopeStack<Slot<'ctx>>,
}

impl<'ctx> Codegen<'ctx> {
    /// Create a new code generator configured for the supplied target triple.
    pub fn new(ctx: &'ctx LlvmContext, name: &str, triple: &TargetTriple) -> Self {
        let module = ctx.create_module(name);
        module.set_triple(triple);
        let builder = ctx.create_builder();

        // declare i32 @printf(ptr, ...)
        let i8ptr_t = ctx.i8_type().ptr_type(AddressSpace::default());
        let printf_ty = ctx.i32_type().fn_type(&[i8ptr_t.into()], true);
        let printf = module.add_function("printf", printf_ty, Some(Linkage::External));

        Self {
            ctx,
            builder,
            module,
            printf,
            formats: None,
            scopes: ScopeStack::new(),
        }
    }

    /// Textual LLVM IR of everything emitted so far.
    pub fn ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// Walk the AST, build the `main` function, and verify the module.
    pub fn emit_program(&mut self, program: &Program) -> CompileResult<()> {
        let i32_t = self.ctx.i32_type();
        let main_fn = self.module.add_function("main", i32_t.fn_type(&[], false), None);
        let entry = self.ctx.append_basic_block(main_fn, "entry");
        self.builder.position_at_end(entry);

        // outermost scope for the whole unit
        self.in_scope(|cg| {
            for stmt in &program.statements {
                cg.emit_stmt(stmt)?;
            }
            Ok(())
        })?;

        self.builder.build_return(Some(&i32_t.const_zero()))?;
        self.module
            .verify()
            .map_err(|e| CodegenError::Verify(e.to_string()))?;
        info!(
            statements = program.statements.len(),
            "emitted module `{}`",
            self.module.get_name().to_string_lossy()
        );
        Ok(())
    }

    /// Runs `body` inside a fresh innermost scope. The scope is popped on every
    /// exit path, including an early error from `body`.
    fn in_scope<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> CompileResult<T>,
    ) -> CompileResult<T> {
        self.scopes.push_scope();
        let result = body(self);
        self.scopes.pop_scope();
        result
    }

    /// Emits one statement. Expression statements and blocks yield the last
    /// value they produced.
    fn emit_stmt(&mut self, stmt: &Stmt) -> CompileResult<Option<Value<'ctx>>> {
        match stmt {
            Stmt::Expression { expr, .. } => self.emit_expr(expr).map(Some),
            Stmt::VarDecl { ty, name, init, pos } => {
                self.emit_var_decl(*ty, name, init.as_ref(), *pos)?;
                Ok(None)
            }
            Stmt::Block { statements, .. } => self.in_scope(|cg| {
                let mut last = None;
                for stmt in statements {
                    last = cg.emit_stmt(stmt)?;
                }
                Ok(last)
            }),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                pos,
            } => {
                self.emit_if(condition, then_branch, else_branch.as_deref(), *pos)?;
                Ok(None)
            }
            Stmt::Print { value, .. } => {
                self.emit_print(value)?;
                Ok(None)
            }
        }
    }

    fn emit_var_decl(
        &mut self,
        ty: DeclType,
        name: &str,
        init: Option<&Expr>,
        pos: Pos,
    ) -> CompileResult<()> {
        let value_ty = ValueType::from_decl(ty).ok_or_else(|| SemanticError::UnsupportedInitializer {
            name: name.to_string(),
            reason: format!("`{ty}` variables are not supported"),
            pos,
        })?;

        let slot = match value_ty {
            ValueType::Str => self.alloc_string(name, init, pos)?,
            _ => {
                let value = match init {
                    Some(expr) => {
                        let value = self.emit_expr(expr)?;
                        self.coerce(value, value_ty, expr.pos())?
                    }
                    None => self.zero(value_ty),
                };
                let llvm_ty = self.llvm_type(value_ty);
                let ptr = self.entry_alloca(llvm_ty, name, pos)?;
                self.builder.build_store(ptr, value.as_basic())?;
                Slot { ptr, llvm_ty }
            }
        };

        if !self.scopes.declare(name, value_ty, slot) {
            return Err(SemanticError::DuplicateDeclaration {
                name: name.to_string(),
                pos,
            }
            .into());
        }
        debug!(name, ty = %value_ty, depth = self.scopes.depth(), "declared variable");
        Ok(())
    }

    /// Strings are fixed buffers sized by their literal initializer plus the
    /// terminator; anything else cannot size the buffer.
    fn alloc_string(&mut self, name: &str, init: Option<&Expr>, pos: Pos) -> CompileResult<Slot<'ctx>> {
        let text = match init {
            Some(Expr::Str { value, .. }) => value,
            Some(other) => {
                return Err(SemanticError::UnsupportedInitializer {
                    name: name.to_string(),
                    reason: "string variables must be initialized with a string literal".into(),
                    pos: other.pos(),
                }
                .into())
            }
            None => {
                return Err(SemanticError::UnsupportedInitializer {
                    name: name.to_string(),
                    reason: "string variables need a literal initializer".into(),
                    pos,
                }
                .into())
            }
        };

        let bytes = self.ctx.const_string(text.as_bytes(), true);
        let llvm_ty: BasicTypeEnum<'ctx> = bytes.get_type().into();
        let ptr = self.entry_alloca(llvm_ty, name, pos)?;
        self.builder.build_store(ptr, bytes)?;
        Ok(Slot { ptr, llvm_ty })
    }

    /// Stack slots all live at the top of the entry block so they dominate
    /// every use, whichever branch declared them.
    fn entry_alloca(
        &self,
        llvm_ty: BasicTypeEnum<'ctx>,
        name: &str,
        pos: Pos,
    ) -> CompileResult<PointerValue<'ctx>> {
        let current = self.current_block(pos)?;
        let entry = self
            .current_function(pos)?
            .get_first_basic_block()
            .unwrap_or(current);
        match entry.get_first_instruction() {
            Some(first) => self.builder.position_before(&first),
            None => self.builder.position_at_end(entry),
        }
        let ptr = self.builder.build_alloca(llvm_ty, name);
        self.builder.position_at_end(current);
        Ok(ptr?)
    }

    fn emit_if(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        pos: Pos,
    ) -> CompileResult<()> {
        let flag = self.emit_bool(condition)?;
        let function = self.current_function(pos)?;

        let then_bb = self.ctx.append_basic_block(function, "if.then");
        let else_bb = else_branch.map(|_| self.ctx.append_basic_block(function, "if.else"));
        let merge_bb = self.ctx.append_basic_block(function, "if.end");

        self.builder
            .build_conditional_branch(flag, then_bb, else_bb.unwrap_or(merge_bb))?;

        // each branch is its own scope, braced or not
        self.builder.position_at_end(then_bb);
        self.in_scope(|cg| cg.emit_stmt(then_branch))?;
        self.builder.build_unconditional_branch(merge_bb)?;

        if let (Some(stmt), Some(bb)) = (else_branch, else_bb) {
            self.builder.position_at_end(bb);
            self.in_scope(|cg| cg.emit_stmt(stmt))?;
            self.builder.build_unconditional_branch(merge_bb)?;
        }

        self.builder.position_at_end(merge_bb);
        Ok(())
    }

    fn emit_print(&mut self, expr: &Expr) -> CompileResult<()> {
        let value = self.emit_expr(expr)?;
        let formats = self.formats()?;
        let (format, arg): (PointerValue<'ctx>, BasicMetadataValueEnum<'ctx>) = match value {
            Value::Int(v) => (formats.int, v.into()),
            Value::Double(v) => (formats.double, v.into()),
            Value::Str(v) => (formats.string, v.into()),
            Value::Bool(v) => {
                let text =
                    self.builder
                        .build_select(v, formats.true_text, formats.false_text, "bool.text")?;
                (formats.string, text.into())
            }
        };
        self.builder
            .build_call(self.printf, &[format.into(), arg], "print")?;
        Ok(())
    }

    /// Format strings are created on first use, inside `main`.
    fn formats(&mut self) -> CompileResult<Formats<'ctx>> {
        if let Some(formats) = self.formats {
            return Ok(formats);
        }
        let global = |value: &str, name: &str| -> CompileResult<PointerValue<'ctx>> {
            Ok(self
                .builder
                .build_global_string_ptr(value, name)?
                .as_pointer_value())
        };
        let formats = Formats {
            int: global("%d\n", ".fmt.int")?,
            double: global("%f\n", ".fmt.double")?,
            string: global("%s\n", ".fmt.str")?,
            true_text: global("true", ".str.true")?,
            false_text: global("false", ".str.false")?,
        };
        self.formats = Some(formats);
        Ok(formats)
    }

    // ---- expressions ----

    /// Generate a typed value for the given expression.
    ///
    /// Every branch either returns a concrete value or fails with a semantic
    /// error; nothing is silently dropped.
    fn emit_expr(&mut self, expr: &Expr) -> CompileResult<Value<'ctx>> {
        Ok(match expr {
            Expr::Int { value, .. } => {
                Value::Int(self.ctx.i32_type().const_int(*value as i64 as u64, true))
            }
            Expr::Double { value, .. } => Value::Double(self.ctx.f64_type().const_float(*value)),
            Expr::Bool { value, .. } => {
                Value::Bool(self.ctx.bool_type().const_int(u64::from(*value), false))
            }
            Expr::Str { value, .. } => Value::Str(
                self.builder
                    .build_global_string_ptr(value, ".str")?
                    .as_pointer_value(),
            ),
            Expr::Identifier { name, pos } => {
                let symbol = self.resolve(name, *pos)?;
                self.load(name, &symbol)?
            }
            Expr::Assignment { target, value, pos } => {
                let symbol = self.resolve(target, *pos)?;
                if symbol.ty == ValueType::Str {
                    return Err(SemanticError::UnsupportedInitializer {
                        name: target.clone(),
                        reason: "string variables cannot be reassigned".into(),
                        pos: *pos,
                    }
                    .into());
                }
                let emitted = self.emit_expr(value)?;
                let stored = self.coerce(emitted, symbol.ty, value.pos())?;
                self.builder.build_store(symbol.storage.ptr, stored.as_basic())?;
                stored
            }
            Expr::Unary { op, operand, pos } => self.emit_unary(*op, operand, *pos)?,
            Expr::Binary {
                op,
                left,
                right,
                pos,
            } => self.emit_binary(*op, left, right, *pos)?,
            Expr::Call { pos, .. } => {
                return Err(CodegenError::Unsupported {
                    what: "function calls".into(),
                    pos: *pos,
                }
                .into())
            }
        })
    }

    fn resolve(&self, name: &str, pos: Pos) -> CompileResult<Symbol<Slot<'ctx>>> {
        self.scopes.lookup(name).cloned().ok_or_else(|| {
            SemanticError::UndeclaredIdentifier {
                name: name.to_string(),
                pos,
            }
            .into()
        })
    }

    fn load(&self, name: &str, symbol: &Symbol<Slot<'ctx>>) -> CompileResult<Value<'ctx>> {
        let Slot { ptr, llvm_ty } = symbol.storage;
        Ok(match symbol.ty {
            // the buffer itself is the value
            ValueType::Str => Value::Str(ptr),
            ValueType::Int => Value::Int(self.builder.build_load(llvm_ty, ptr, name)?.into_int_value()),
            ValueType::Bool => Value::Bool(self.builder.build_load(llvm_ty, ptr, name)?.into_int_value()),
            ValueType::Double => {
                Value::Double(self.builder.build_load(llvm_ty, ptr, name)?.into_float_value())
            }
        })
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: &Expr, pos: Pos) -> CompileResult<Value<'ctx>> {
        let value = self.emit_expr(operand)?;
        Ok(match (op, value) {
            (UnaryOp::Neg, Value::Int(v)) => Value::Int(self.builder.build_int_neg(v, "neg")?),
            (UnaryOp::Neg, Value::Double(v)) => Value::Double(self.builder.build_float_neg(v, "fneg")?),
            (UnaryOp::Neg, other) => return Err(mismatch("int or double", other.ty(), operand.pos())),
            (UnaryOp::Not, Value::Bool(v)) => Value::Bool(self.builder.build_not(v, "not")?),
            (UnaryOp::Not, other) => return Err(mismatch("bool", other.ty(), operand.pos())),
            (math, value) => {
                let arg = self.to_double(value, operand.pos())?;
                let function = self.math_function(math, pos)?;
                let call = self
                    .builder
                    .build_call(function, &[arg.into()], math.symbol())?;
                let result = call.try_as_basic_value().left().ok_or_else(|| {
                    CodegenError::Unsupported {
                        what: format!("void result from `{}`", math.symbol()),
                        pos,
                    }
                })?;
                Value::Double(result.into_float_value())
            }
        })
    }

    /// `f64 -> f64` declaration for a math prefix operator. Most map onto LLVM
    /// intrinsics; LLVM 16 has no `llvm.tan`, so `tan` comes from libm.
    fn math_function(&self, op: UnaryOp, pos: Pos) -> CompileResult<FunctionValue<'ctx>> {
        let name = match op {
            UnaryOp::Sin => "llvm.sin.f64",
            UnaryOp::Cos => "llvm.cos.f64",
            UnaryOp::Log => "llvm.log.f64",
            UnaryOp::Exp => "llvm.exp.f64",
            UnaryOp::Sqrt => "llvm.sqrt.f64",
            UnaryOp::Tan => "tan",
            UnaryOp::Neg | UnaryOp::Not => {
                return Err(CodegenError::Unsupported {
                    what: format!("math function `{}`", op.symbol()),
                    pos,
                }
                .into())
            }
        };
        let f64_t = self.ctx.f64_type();
        Ok(self.module.get_function(name).unwrap_or_else(|| {
            self.module
                .add_function(name, f64_t.fn_type(&[f64_t.into()], false), None)
        }))
    }

    fn emit_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        pos: Pos,
    ) -> CompileResult<Value<'ctx>> {
        match op {
            BinaryOp::Comma => {
                self.emit_expr(left)?;
                self.emit_expr(right)
            }
            BinaryOp::And | BinaryOp::Or => self.emit_logical(op, left, right, pos),
            _ => {
                let lhs = self.emit_expr(left)?;
                let rhs = self.emit_expr(right)?;
                self.emit_operator(op, lhs, rhs, pos)
            }
        }
    }

    /// `&&` and `||` only evaluate the right operand when it decides the result.
    fn emit_logical(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        pos: Pos,
    ) -> CompileResult<Value<'ctx>> {
        let lhs = self.emit_bool(left)?;
        let function = self.current_function(pos)?;
        let lhs_end = self.current_block(pos)?;
        let rhs_bb = self.ctx.append_basic_block(function, "logic.rhs");
        let merge_bb = self.ctx.append_basic_block(function, "logic.end");

        let short_circuit = match op {
            BinaryOp::And => {
                self.builder.build_conditional_branch(lhs, rhs_bb, merge_bb)?;
                false
            }
            _ => {
                self.builder.build_conditional_branch(lhs, merge_bb, rhs_bb)?;
                true
            }
        };

        self.builder.position_at_end(rhs_bb);
        let rhs = self.emit_bool(right)?;
        // the right operand may have opened blocks of its own
        let rhs_end = self.current_block(pos)?;
        self.builder.build_unconditional_branch(merge_bb)?;

        self.builder.position_at_end(merge_bb);
        let bool_t = self.ctx.bool_type();
        let decided = bool_t.const_int(u64::from(short_circuit), false);
        let phi = self.builder.build_phi(bool_t, "logic")?;
        phi.add_incoming(&[(&decided, lhs_end), (&rhs, rhs_end)]);
        Ok(Value::Bool(phi.as_basic_value().into_int_value()))
    }

    fn emit_operator(
        &mut self,
        op: BinaryOp,
        lhs: Value<'ctx>,
        rhs: Value<'ctx>,
        pos: Pos,
    ) -> CompileResult<Value<'ctx>> {
        if let (Value::Bool(l), Value::Bool(r)) = (lhs, rhs) {
            let predicate = match op {
                BinaryOp::Eq => IntPredicate::EQ,
                BinaryOp::Ne => IntPredicate::NE,
                _ => return Err(operand_mismatch(op, lhs, rhs, pos)),
            };
            return Ok(Value::Bool(self.builder.build_int_compare(predicate, l, r, "cmp")?));
        }

        let common = lhs
            .ty()
            .promote(rhs.ty())
            .ok_or_else(|| operand_mismatch(op, lhs, rhs, pos))?;

        match common {
            ValueType::Int => {
                let (Value::Int(l), Value::Int(r)) = (lhs, rhs) else {
                    return Err(operand_mismatch(op, lhs, rhs, pos));
                };
                self.int_operator(op, l, r, pos)
            }
            _ => {
                let l = self.to_double(lhs, pos)?;
                let r = self.to_double(rhs, pos)?;
                self.float_operator(op, l, r, pos)
            }
        }
    }

    /// Integer arithmetic is signed; `/` and `%` truncate toward zero.
    fn int_operator(
        &self,
        op: BinaryOp,
        l: IntValue<'ctx>,
        r: IntValue<'ctx>,
        pos: Pos,
    ) -> CompileResult<Value<'ctx>> {
        let b = &self.builder;
        let compare = |predicate| -> CompileResult<Value<'ctx>> {
            Ok(Value::Bool(b.build_int_compare(predicate, l, r, "cmp")?))
        };
        Ok(match op {
            BinaryOp::Add => Value::Int(b.build_int_add(l, r, "add")?),
            BinaryOp::Sub => Value::Int(b.build_int_sub(l, r, "sub")?),
            BinaryOp::Mul => Value::Int(b.build_int_mul(l, r, "mul")?),
            BinaryOp::Div => Value::Int(b.build_int_signed_div(l, r, "div")?),
            BinaryOp::Rem => Value::Int(b.build_int_signed_rem(l, r, "rem")?),
            BinaryOp::Eq => compare(IntPredicate::EQ)?,
            BinaryOp::Ne => compare(IntPredicate::NE)?,
            BinaryOp::Lt => compare(IntPredicate::SLT)?,
            BinaryOp::Gt => compare(IntPredicate::SGT)?,
            BinaryOp::Le => compare(IntPredicate::SLE)?,
            BinaryOp::Ge => compare(IntPredicate::SGE)?,
            BinaryOp::Comma | BinaryOp::And | BinaryOp::Or => {
                return Err(unsupported_operator(op, "int", pos))
            }
        })
    }

    fn float_operator(
        &self,
        op: BinaryOp,
        l: FloatValue<'ctx>,
        r: FloatValue<'ctx>,
        pos: Pos,
    ) -> CompileResult<Value<'ctx>> {
        let b = &self.builder;
        let compare = |predicate| -> CompileResult<Value<'ctx>> {
            Ok(Value::Bool(b.build_float_compare(predicate, l, r, "fcmp")?))
        };
        Ok(match op {
            BinaryOp::Add => Value::Double(b.build_float_add(l, r, "fadd")?),
            BinaryOp::Sub => Value::Double(b.build_float_sub(l, r, "fsub")?),
            BinaryOp::Mul => Value::Double(b.build_float_mul(l, r, "fmul")?),
            BinaryOp::Div => Value::Double(b.build_float_div(l, r, "fdiv")?),
            BinaryOp::Rem => Value::Double(b.build_float_rem(l, r, "frem")?),
            BinaryOp::Eq => compare(FloatPredicate::OEQ)?,
            BinaryOp::Ne => compare(FloatPredicate::UNE)?,
            BinaryOp::Lt => compare(FloatPredicate::OLT)?,
            BinaryOp::Gt => compare(FloatPredicate::OGT)?,
            BinaryOp::Le => compare(FloatPredicate::OLE)?,
            BinaryOp::Ge => compare(FloatPredicate::OGE)?,
            BinaryOp::Comma | BinaryOp::And | BinaryOp::Or => {
                return Err(unsupported_operator(op, "double", pos))
            }
        })
    }

    // ---- conversions ----

    fn emit_bool(&mut self, expr: &Expr) -> CompileResult<IntValue<'ctx>> {
        match self.emit_expr(expr)? {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch("bool", other.ty(), expr.pos())),
        }
    }

    fn to_double(&self, value: Value<'ctx>, pos: Pos) -> CompileResult<FloatValue<'ctx>> {
        match value {
            Value::Double(v) => Ok(v),
            Value::Int(v) => Ok(self
                .builder
                .build_signed_int_to_float(v, self.ctx.f64_type(), "promote")?),
            other => Err(mismatch("int or double", other.ty(), pos)),
        }
    }

    /// Fits a value to a declared type: exact matches pass, `int -> double`
    /// promotes, `double -> int` truncates, everything else is a mismatch.
    fn coerce(&self, value: Value<'ctx>, target: ValueType, pos: Pos) -> CompileResult<Value<'ctx>> {
        match (value, target) {
            (v, t) if v.ty() == t => Ok(v),
            (Value::Int(_), ValueType::Double) => Ok(Value::Double(self.to_double(value, pos)?)),
            (Value::Double(v), ValueType::Int) => Ok(Value::Int(self.builder.build_float_to_signed_int(
                v,
                self.ctx.i32_type(),
                "narrow",
            )?)),
            (v, t) => Err(mismatch(&t.to_string(), v.ty(), pos)),
        }
    }

    fn llvm_type(&self, ty: ValueType) -> BasicTypeEnum<'ctx> {
        match ty {
            ValueType::Int => self.ctx.i32_type().as_basic_type_enum(),
            ValueType::Double => self.ctx.f64_type().as_basic_type_enum(),
            ValueType::Bool => self.ctx.bool_type().as_basic_type_enum(),
            ValueType::Str => self
                .ctx
                .i8_type()
                .ptr_type(AddressSpace::default())
                .as_basic_type_enum(),
        }
    }

    fn zero(&self, ty: ValueType) -> Value<'ctx> {
        match ty {
            ValueType::Int => Value::Int(self.ctx.i32_type().const_zero()),
            ValueType::Double => Value::Double(self.ctx.f64_type().const_float(0.0)),
            ValueType::Bool => Value::Bool(self.ctx.bool_type().const_zero()),
            ValueType::Str => Value::Str(
                self.ctx
                    .i8_type()
                    .ptr_type(AddressSpace::default())
                    .const_null(),
            ),
        }
    }

    fn current_block(&self, pos: Pos) -> CompileResult<inkwell::basic_block::BasicBlock<'ctx>> {
        self.builder.get_insert_block().ok_or_else(|| {
            CodegenError::Unsupported {
                what: "code outside of a function".into(),
                pos,
            }
            .into()
        })
    }

    fn current_function(&self, pos: Pos) -> CompileResult<FunctionValue<'ctx>> {
        self.current_block(pos)?.get_parent().ok_or_else(|| {
            CodegenError::Unsupported {
                what: "code outside of a function".into(),
                pos,
            }
            .into()
        })
    }

    /// Verify the module and write out an object file using the host target machine.
    pub fn write_object(&self, triple: &TargetTriple, out_obj: &Path) -> CompileResult<()> {
        self.module
            .verify()
            .map_err(|e| CodegenError::Verify(e.to_string()))?;
        Target::initialize_all(&InitializationConfig::default());
        let target = Target::from_triple(triple).map_err(|e| CodegenError::Target(e.to_string()))?;
        let tm = target
            .create_target_machine(
                triple,
                "generic",
                "",
                OptimizationLevel::None,
                RelocMode::PIC,
                CodeModel::Default,
            )
            .ok_or_else(|| CodegenError::Target("create target machine failed".into()))?;
        tm.write_to_file(&self.module, FileType::Object, out_obj)
            .map_err(|e| CodegenError::Target(e.to_string()))?;
        Ok(())
    }

    /// Write the textual IR to `path`.
    pub fn write_ir(&self, path: &Path) -> CompileResult<()> {
        self.module
            .print_to_file(path)
            .map_err(|e| CodegenError::Target(e.to_string()))?;
        Ok(())
    }
}

fn mismatch(expected: &str, found: ValueType, pos: Pos) -> crate::error::CompileError {
    SemanticError::TypeMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
        pos,
    }
    .into()
}

fn operand_mismatch(op: BinaryOp, lhs: Value<'_>, rhs: Value<'_>, pos: Pos) -> crate::error::CompileError {
    let expected = match op {
        BinaryOp::Eq | BinaryOp::Ne => "numeric or bool operands",
        _ => "numeric operands",
    };
    SemanticError::TypeMismatch {
        expected: expected.to_string(),
        found: format!("{} {} {}", lhs.ty(), op.symbol(), rhs.ty()),
        pos,
    }
    .into()
}

fn unsupported_operator(op: BinaryOp, ty: &str, pos: Pos) -> crate::error::CompileError {
    CodegenError::Unsupported {
        what: format!("operator `{}` on {ty}", op.symbol()),
        pos,
    }
    .into()
}

/// Grab the default target triple for the build machine.
pub fn host_triple() -> TargetTriple {
    TargetMachine::get_default_triple()
}
