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

const IDENTITY: &str = "for procedure named 'id' accepting (n as int) and yielding int, \
                        tell the following story: beginning of the story \
                        the result shall be n . end of the story. \
                        perform the story of 'id' using (7) .";

#[test]
fn procedures_are_emitted_before_start() {
    let asm = compile(IDENTITY);

    let proc_position = asm.find("proc_id:").expect("proc_id label missing");
    let start_position = asm.find("_start:").expect("_start label missing");
    assert!(proc_position < start_position);
}

#[test]
fn parameters_spill_from_convention_registers() {
    let asm = compile(IDENTITY);

    assert!(asm.contains("proc_id:\n    push rbp\n    mov rbp, rsp\n    sub rsp, 16\n    mov [rbp - 8], rdi\n"));
}

#[test]
fn arguments_are_moved_into_convention_registers() {
    let asm = compile(IDENTITY);

    assert!(asm.contains("    mov rax, 7\n    mov rdi, rax\n    call proc_id\n"));
}

#[test]
fn return_emits_the_epilogue_inline() {
    let asm = compile(IDENTITY);

    assert!(asm.contains("    mov rax, [rbp - 8]\n    mov rsp, rbp\n    pop rbp\n    ret\n"));
}

#[test]
fn later_arguments_use_later_registers() {
    let asm = compile(
        "perform the story of 'add' using (1, 2, 3) .",
    );

    assert!(asm.contains("    mov rax, 1\n    mov rdi, rax\n"));
    assert!(asm.contains("    mov rax, 2\n    mov rsi, rax\n"));
    assert!(asm.contains("    mov rax, 3\n    mov rdx, rax\n    call proc_add\n"));
}

#[test]
fn more_than_six_arguments_fail() {
    let error = compile_error("perform the story of 'f' using (1, 2, 3, 4, 5, 6, 7) .");

    assert_eq!(error.to_string(), "More than 6 arguments are not supported.");
}

#[test]
fn call_expressions_feed_declarations() {
    let asm = compile(
        "for procedure named 'double' accepting (n as int) and yielding int, \
         tell the following story: beginning of the story \
         the result shall be n multiplied by 2 . end of the story. \
         a value answer, type int, begins at the story of 'double' using (21) .",
    );

    assert!(asm.contains("    call proc_double\n    mov [rbp - 8], rax\n"));
}

#[test]
fn procedure_without_parameters_has_no_spills() {
    let asm = compile(
        "for procedure named 'greet' accepting (), tell the following story: \
         beginning of the story the story tells: \"hi\" . end of the story. \
         perform the story of 'greet' using () .",
    );

    assert!(asm.contains("proc_greet:\n    push rbp\n    mov rbp, rsp\n"));
    assert!(!asm.contains("proc_greet:\n    push rbp\n    mov rbp, rsp\n    sub rsp,"));
    assert!(asm.contains("    call proc_greet\n"));
}
