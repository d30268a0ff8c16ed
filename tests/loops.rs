use lore_lang::{
    compiler::{CodeGenerator, CodegenError},
    lexer::Lexer,
    parser::Parser,
};

fn compile(source: &str) -> String {
    let tokens = Lexer::new(source).scan_tokens();
    let statements = Parser::new(tokens).parse();
    let mut generator = CodeGenerator::new(Vec::new());
    generator
        .generate(&statements)
        .expect("code generation failed");
    String::from_utf8(generator.into_inner()).expect("generated assembly is valid UTF-8")
}

fn compile_error(source: &str) -> CodegenError {
    let tokens = Lexer::new(source).scan_tokens();
    let statements = Parser::new(tokens).parse();
    let mut generator = CodeGenerator::new(Vec::new());
    generator
        .generate(&statements)
        .expect_err("expected code generation to fail")
}

#[test]
fn while_with_break_jumps_to_the_loop_exit() {
    let asm = compile(
        "while 1 is equal to 1 holds, tell the following story: \
         beginning of the story the story ends at this moment . end of the story.",
    );

    assert!(asm.contains(
        "L0:\n    mov rax, 1\n    push rax\n    mov rax, 1\n    pop rbx\n    cmp rbx, rax\n    sete al\n    movzx rax, al\n    cmp rax, 0\n    je L1\n    jmp L1\n    jmp L0\nL1:\n"
    ));
}

#[test]
fn if_statement_skips_its_body_when_false() {
    let asm = compile(
        "if 1 is less than 2 is met, tell the following story: \
         beginning of the story the story tells: \"yes\" . end of the story.",
    );

    assert!(asm.contains(
        "    cmp rbx, rax\n    setl al\n    movzx rax, al\n    cmp rax, 0\n    je L0\n"
    ));
    assert!(asm.contains("    call _strlen\n"));
    assert!(asm.contains("\nL0:\n"));
}

#[test]
fn break_outside_a_loop_fails() {
    let error = compile_error("the story ends at this moment .");

    assert_eq!(
        error.to_string(),
        "'the story ends at this moment' can only be used inside a loop."
    );
}

#[test]
fn break_targets_the_innermost_loop() {
    let asm = compile(
        "while true holds, tell the following story: \
         beginning of the story \
         while true holds, tell the following story: \
         beginning of the story the story ends at this moment . end of the story. \
         end of the story.",
    );

    // Outer loop gets L0/L1, inner gets L2/L3; the break must use L3.
    assert!(asm.contains("    je L3\n    jmp L3\n    jmp L2\nL3:\n"));
}

#[test]
fn loop_condition_is_reevaluated_each_iteration() {
    let asm = compile(
        "a value n, type int, begins at 0 . \
         while n is less than 3 holds, tell the following story: \
         beginning of the story \
         the value n continues as n plus 1 . \
         end of the story.",
    );

    assert!(asm.contains("L0:\n    mov rax, [rbp - 8]\n"));
    assert!(asm.contains("    jmp L0\nL1:\n"));
}
