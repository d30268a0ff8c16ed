//! Code generator for the Lore language.
//!
//! Walks the statement sequence twice: a first pass interns every distinct
//! string literal, a second pass emits the assembly. Output is streamed to
//! the writer as it is produced, so whatever was emitted before a generation
//! error stays written.

mod runtime;
mod scope;

use std::{
    error::Error,
    fmt::Display,
    io::{self, Write},
};

use Instruction::*;
use InstructionOperand::*;
use Reg::*;

use crate::{
    asm::{
        Instruction, InstructionOperand, Reg, ARGUMENT_REGISTERS, EXIT_SYSCALL, WRITE_SYSCALL,
    },
    ast::{Expr, Param, Stmt},
    lexer::{Token, TokenKind},
};

use self::{
    runtime::{PRINT_INTEGER, STRLEN},
    scope::{ScopeStack, VariableInfo},
};

#[derive(Debug)]
pub struct CodegenError(String);

pub type CodegenResult<T = ()> = Result<T, CodegenError>;

impl Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Error for CodegenError {}

impl From<io::Error> for CodegenError {
    fn from(error: io::Error) -> Self {
        CodegenError(error.to_string())
    }
}

pub struct CodeGenerator<W: Write> {
    out: W,
    scopes: ScopeStack,
    break_labels: Vec<String>,
    string_literals: Vec<String>,
    stack_offset: usize,
    label_counter: usize,
}

impl<W: Write> CodeGenerator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            scopes: ScopeStack::default(),
            break_labels: vec![],
            string_literals: vec![],
            stack_offset: 0,
            label_counter: 0,
        }
    }

    /// Returns the underlying writer, e.g. to inspect generated assembly in
    /// tests.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Generates the whole program: `.rodata` with interned strings, `.bss`
    /// with the integer print buffer, and `.text` with the runtime helpers,
    /// all procedures, and `_start`.
    pub fn generate(&mut self, statements: &[Stmt]) -> CodegenResult {
        self.find_string_literals(statements);

        writeln!(self.out, "section .rodata")?;
        self.emit_label("NL")?;
        writeln!(self.out, "    db 10")?;
        for (index, literal) in self.string_literals.iter().enumerate() {
            writeln!(self.out, "  str{index}: db `{literal}`, 0")?;
        }

        writeln!(self.out, "\nsection .bss")?;
        self.emit_label("int_buffer")?;
        writeln!(self.out, "    resb 21")?;

        writeln!(self.out, "\nsection .text")?;
        writeln!(self.out, "; --- Helper Functions ---")?;
        self.emit(Literal(PRINT_INTEGER.to_owned()))?;
        self.emit(Literal(STRLEN.to_owned()))?;

        writeln!(self.out, "\n; --- Procedures ---")?;
        for statement in statements {
            if matches!(statement, Stmt::ProcedureDecl { .. }) {
                self.gen_statement(statement)?;
            }
        }

        writeln!(self.out, "\n; --- Main Program ---")?;
        writeln!(self.out, "global _start")?;
        self.emit_label("_start")?;
        self.scopes.push();
        self.stack_offset = 0;
        self.emit(Push(Rbp))?;
        self.emit(Mov(Register(Rbp), Register(Rsp)))?;

        let total_stack_size = count_declarations(statements) * 8;
        if total_stack_size > 0 {
            let aligned_size = (total_stack_size + 15) & !15;
            self.emit(Sub(Register(Rsp), Immediate(aligned_size as i64)))?;
        }

        for statement in statements {
            if !matches!(statement, Stmt::ProcedureDecl { .. }) {
                self.gen_statement(statement)?;
            }
        }

        writeln!(self.out, "    \n; Exit program")?;
        self.emit(Mov(Register(Rsp), Register(Rbp)))?;
        self.emit(Pop(Rbp))?;
        self.emit(Mov(Register(Rax), Immediate(EXIT_SYSCALL)))?;
        self.emit(Xor(Register(Rdi), Register(Rdi)))?;
        self.emit(Syscall)?;
        self.scopes.pop();

        Ok(())
    }

    fn emit(&mut self, instruction: Instruction) -> CodegenResult {
        writeln!(self.out, "{instruction}")?;
        Ok(())
    }

    fn emit_label(&mut self, label: &str) -> CodegenResult {
        writeln!(self.out, "{label}:")?;
        Ok(())
    }

    fn new_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    // Pass 1: collect distinct string literals in insertion order. The index
    // in `string_literals` becomes the `str<i>` label.

    fn find_string_literals(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.collect_strings_stmt(statement);
        }
    }

    fn collect_strings_stmt(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Declaration { initializer, .. } => self.collect_strings_expr(initializer),
            Stmt::Expression(expression) | Stmt::Print(expression) | Stmt::Return(expression) => {
                self.collect_strings_expr(expression)
            }
            Stmt::If {
                condition,
                then_branch,
            } => {
                self.collect_strings_expr(condition);
                self.collect_strings_stmt(then_branch);
            }
            Stmt::While { condition, body } => {
                self.collect_strings_expr(condition);
                self.collect_strings_stmt(body);
            }
            Stmt::Block(statements) => {
                for statement in statements {
                    self.collect_strings_stmt(statement);
                }
            }
            Stmt::ProcedureDecl { body, .. } => self.collect_strings_stmt(body),
            Stmt::ProcedureCall { arguments, .. } => {
                for argument in arguments {
                    self.collect_strings_expr(argument);
                }
            }
            Stmt::Newline | Stmt::Break => {}
        }
    }

    fn collect_strings_expr(&mut self, expression: &Expr) {
        match expression {
            Expr::Literal { value } => {
                if value.kind == TokenKind::StringLiteral
                    && !self.string_literals.contains(&value.literal_value)
                {
                    self.string_literals.push(value.literal_value.clone());
                }
            }
            Expr::Binary { left, right, .. } | Expr::Comparison { left, right, .. } => {
                self.collect_strings_expr(left);
                self.collect_strings_expr(right);
            }
            Expr::Assign { value, .. } => self.collect_strings_expr(value),
            Expr::Unary { right, .. } => self.collect_strings_expr(right),
            Expr::FunctionCall { arguments, .. } => {
                for argument in arguments {
                    self.collect_strings_expr(argument);
                }
            }
            Expr::Variable { .. } => {}
        }
    }

    // Pass 2: emission.

    fn gen_statement(&mut self, statement: &Stmt) -> CodegenResult {
        match statement {
            Stmt::Declaration {
                name,
                ty,
                initializer,
                ..
            } => {
                if self.scopes.declared_in_innermost(&name.text) {
                    return Err(CodegenError(format!(
                        "Variable '{}' already declared in this scope.",
                        name.text
                    )));
                }

                self.stack_offset += 8;
                let offset = self.stack_offset;
                self.scopes.declare(
                    name.text.clone(),
                    VariableInfo {
                        offset,
                        ty: ty.text.clone(),
                    },
                );
                self.gen_expression(initializer)?;
                self.emit(Mov(Memory(format!("rbp - {offset}")), Register(Rax)))
            }
            Stmt::Expression(expression) => self.gen_expression(expression),
            Stmt::If {
                condition,
                then_branch,
            } => {
                let end_label = self.new_label();

                self.gen_expression(condition)?;
                self.emit(Cmp(Register(Rax), Immediate(0)))?;
                self.emit(Je(end_label.clone()))?;
                self.gen_statement(then_branch)?;
                self.emit_label(&end_label)
            }
            Stmt::While { condition, body } => {
                let start_label = self.new_label();
                let end_label = self.new_label();

                self.break_labels.push(end_label.clone());

                self.emit_label(&start_label)?;
                self.gen_expression(condition)?;
                self.emit(Cmp(Register(Rax), Immediate(0)))?;
                self.emit(Je(end_label.clone()))?;
                self.gen_statement(body)?;
                self.emit(Jmp(start_label))?;
                self.emit_label(&end_label)?;

                self.break_labels.pop();

                Ok(())
            }
            Stmt::Block(statements) => {
                for statement in statements {
                    self.gen_statement(statement)?;
                }

                Ok(())
            }
            Stmt::Print(expression) => self.gen_print(expression),
            Stmt::Newline => {
                self.emit(Mov(Register(Rax), Immediate(WRITE_SYSCALL)))?;
                self.emit(Mov(Register(Rdi), Immediate(1)))?;
                self.emit(Mov(Register(Rsi), Identifier("NL".to_owned())))?;
                self.emit(Mov(Register(Rdx), Immediate(1)))?;
                self.emit(Syscall)
            }
            Stmt::ProcedureDecl {
                name, params, body, ..
            } => self.gen_procedure(name, params, body),
            Stmt::ProcedureCall { callee, arguments } => self.gen_call(callee, arguments),
            Stmt::Return(value) => {
                self.gen_expression(value)?;
                self.emit(Mov(Register(Rsp), Register(Rbp)))?;
                self.emit(Pop(Rbp))?;
                self.emit(Ret)
            }
            Stmt::Break => {
                let Some(label) = self.break_labels.last() else {
                    return Err(CodegenError(
                        "'the story ends at this moment' can only be used inside a loop."
                            .to_owned(),
                    ));
                };

                self.emit(Jmp(label.clone()))
            }
        }
    }

    fn gen_procedure(&mut self, name: &Token, params: &[Param], body: &Stmt) -> CodegenResult {
        self.scopes.push();
        self.emit_label(&format!("proc_{}", name.text))?;
        self.emit(Push(Rbp))?;
        self.emit(Mov(Register(Rbp), Register(Rsp)))?;

        // One slot per parameter on top of the body's declarations.
        let local_stack_size = (params.len() + count_declarations_stmt(body)) * 8;
        if local_stack_size > 0 {
            let aligned_size = (local_stack_size + 15) & !15;
            self.emit(Sub(Register(Rsp), Immediate(aligned_size as i64)))?;
        }

        self.stack_offset = 0;
        for (index, param) in params.iter().enumerate() {
            let reg = argument_register(index)?;
            self.stack_offset += 8;
            self.scopes.declare(
                param.name.text.clone(),
                VariableInfo {
                    offset: self.stack_offset,
                    ty: param.ty.text.clone(),
                },
            );
            self.emit(Mov(
                Memory(format!("rbp - {}", self.stack_offset)),
                Register(reg),
            ))?;
        }

        self.gen_statement(body)?;

        self.emit(Mov(Register(Rsp), Register(Rbp)))?;
        self.emit(Pop(Rbp))?;
        self.emit(Ret)?;
        self.scopes.pop();

        Ok(())
    }

    /// Shared lowering of statement- and expression-context calls. Arguments
    /// are evaluated left to right, each moved into its convention register
    /// immediately, so a later argument that itself performs a call clobbers
    /// the registers set before it.
    fn gen_call(&mut self, callee: &Token, arguments: &[Expr]) -> CodegenResult {
        if arguments.len() > 6 {
            return Err(CodegenError(
                "More than 6 arguments are not supported.".to_owned(),
            ));
        }

        for (index, argument) in arguments.iter().enumerate() {
            let reg = argument_register(index)?;
            self.gen_expression(argument)?;
            self.emit(Mov(Register(reg), Register(Rax)))?;
        }

        self.emit(Call(format!("proc_{}", callee.text)))
    }

    fn gen_print(&mut self, expression: &Expr) -> CodegenResult {
        // The operand's type is inferred from the tree shape alone: string
        // and bool literals directly, variables from their declared type,
        // everything else prints as an integer.
        let mut expr_type = "int".to_owned();
        match expression {
            Expr::Literal { value } => {
                if value.kind == TokenKind::StringLiteral {
                    expr_type = "string".to_owned();
                } else if value.kind == TokenKind::BoolLiteral {
                    expr_type = "bool".to_owned();
                }
            }
            Expr::Variable { name } => match self.scopes.lookup(&name.text) {
                Some(variable) => expr_type = variable.ty.clone(),
                None => {
                    return Err(CodegenError(format!(
                        "Undeclared variable '{}' in print statement.",
                        name.text
                    )));
                }
            },
            _ => {}
        }

        self.gen_expression(expression)?;

        if expr_type == "string" {
            self.emit(Push(Rax))?;
            self.emit(Mov(Register(Rdi), Register(Rax)))?;
            self.emit(Call("_strlen".to_owned()))?;
            self.emit(Mov(Register(Rdx), Register(Rax)))?;
            self.emit(Pop(Rsi))?;
            self.emit(Mov(Register(Rax), Immediate(WRITE_SYSCALL)))?;
            self.emit(Mov(Register(Rdi), Immediate(1)))?;
            self.emit(Syscall)
        } else {
            self.emit(Mov(Register(R11), Immediate(0)))?;
            self.emit(Call("_print_integer".to_owned()))
        }
    }

    fn gen_expression(&mut self, expression: &Expr) -> CodegenResult {
        match expression {
            Expr::Literal { value } => match value.kind {
                TokenKind::IntLiteral => {
                    self.emit(Mov(Register(Rax), Identifier(value.literal_value.clone())))
                }
                TokenKind::BoolLiteral => {
                    let flag = i64::from(value.text == "true");
                    self.emit(Mov(Register(Rax), Immediate(flag)))
                }
                TokenKind::StringLiteral => {
                    let Some(index) = self
                        .string_literals
                        .iter()
                        .position(|literal| literal == &value.literal_value)
                    else {
                        return Err(CodegenError(
                            "Internal compiler error: string literal not found.".to_owned(),
                        ));
                    };

                    self.emit(Mov(Register(Rax), Identifier(format!("str{index}"))))
                }
                // Float literals have no lowering.
                _ => Ok(()),
            },
            Expr::Variable { name } => {
                let Some(variable) = self.scopes.lookup(&name.text) else {
                    return Err(CodegenError(format!(
                        "Undeclared variable '{}'.",
                        name.text
                    )));
                };
                let offset = variable.offset;

                self.emit(Mov(Register(Rax), Memory(format!("rbp - {offset}"))))
            }
            Expr::Assign { name, value } => {
                let Some(variable) = self.scopes.lookup(&name.text) else {
                    return Err(CodegenError(format!(
                        "Undeclared variable '{}'.",
                        name.text
                    )));
                };
                let offset = variable.offset;

                self.gen_expression(value)?;
                self.emit(Mov(Memory(format!("rbp - {offset}")), Register(Rax)))
            }
            Expr::Binary { left, op, right } => {
                self.gen_expression(left)?;
                self.emit(Push(Rax))?;
                self.gen_expression(right)?;
                self.emit(Pop(Rbx))?;

                match op.text.as_str() {
                    "plus" => self.emit(Add(Register(Rax), Register(Rbx))),
                    "minus" => {
                        // Left operand ended up in rbx.
                        self.emit(Sub(Register(Rbx), Register(Rax)))?;
                        self.emit(Mov(Register(Rax), Register(Rbx)))
                    }
                    "multiplied" => self.emit(Imul(Register(Rax), Register(Rbx))),
                    "divided" => {
                        self.emit(Mov(Register(R8), Register(Rax)))?;
                        self.emit(Mov(Register(Rax), Register(Rbx)))?;
                        self.emit(Cqo)?;
                        self.emit(Idiv(Register(R8)))
                    }
                    "and" => self.emit(And(Register(Rax), Register(Rbx))),
                    "or" => self.emit(Or(Register(Rax), Register(Rbx))),
                    _ => Ok(()),
                }
            }
            Expr::Comparison { left, op, right } => {
                self.gen_expression(left)?;
                self.emit(Push(Rax))?;
                self.gen_expression(right)?;
                self.emit(Pop(Rbx))?;

                self.emit(Cmp(Register(Rbx), Register(Rax)))?;

                match op.text.as_str() {
                    "is equal to" => self.emit(Sete(Register(Al)))?,
                    "is greater than" => self.emit(Setg(Register(Al)))?,
                    "is less than" => self.emit(Setl(Register(Al)))?,
                    _ => {
                        return Err(CodegenError(
                            "Unsupported comparison operator.".to_owned(),
                        ));
                    }
                }

                self.emit(Movzx(Register(Rax), Register(Al)))
            }
            Expr::Unary { op, right } => {
                self.gen_expression(right)?;

                if op.text == "not" {
                    self.emit(Xor(Register(Rax), Immediate(1)))?;
                }

                Ok(())
            }
            Expr::FunctionCall { callee, arguments } => self.gen_call(callee, arguments),
        }
    }
}

fn argument_register(index: usize) -> CodegenResult<Reg> {
    ARGUMENT_REGISTERS.get(index).copied().ok_or_else(|| {
        CodegenError("More than 6 arguments are not supported.".to_owned())
    })
}

/// Counts the stack slots a statement sequence needs: every reachable
/// declaration through `if`/`while` bodies and blocks, but not through nested
/// procedure declarations. Declarations in disjoint branches each get their
/// own slot, matching the monotonic offset allocator.
fn count_declarations(statements: &[Stmt]) -> usize {
    statements.iter().map(count_declarations_stmt).sum()
}

fn count_declarations_stmt(statement: &Stmt) -> usize {
    match statement {
        Stmt::Declaration { .. } => 1,
        Stmt::If { then_branch, .. } => count_declarations_stmt(then_branch),
        Stmt::While { body, .. } => count_declarations_stmt(body),
        Stmt::Block(statements) => count_declarations(statements),
        _ => 0,
    }
}
