use lore_lang::{compiler::CodeGenerator, lexer::Lexer, parser::Parser};

fn compile(source: &str) -> String {
    let tokens = Lexer::new(source).scan_tokens();
    let statements = Parser::new(tokens).parse();
    let mut generator = CodeGenerator::new(Vec::new());
    generator
        .generate(&statements)
        .expect("code generation failed");
    String::from_utf8(generator.into_inner()).expect("generated assembly is valid UTF-8")
}

#[test]
fn addition_pops_left_operand_into_rbx() {
    let asm = compile("1 plus 2 .");

    assert!(asm.contains(
        "    mov rax, 1\n    push rax\n    mov rax, 2\n    pop rbx\n    add rax, rbx\n"
    ));
}

#[test]
fn subtraction_computes_left_minus_right() {
    let asm = compile("5 minus 3 .");

    assert!(asm.contains("    pop rbx\n    sub rbx, rax\n    mov rax, rbx\n"));
}

#[test]
fn multiplication_uses_imul() {
    let asm = compile("6 multiplied by 7 .");

    assert!(asm.contains("    pop rbx\n    imul rax, rbx\n"));
}

#[test]
fn division_sign_extends_before_idiv() {
    let asm = compile("6 divided by 3 .");

    assert!(asm.contains(
        "    pop rbx\n    mov r8, rax\n    mov rax, rbx\n    cqo\n    idiv r8\n"
    ));
}

#[test]
fn logic_operators_lower_bitwise() {
    let asm = compile("true and false .");
    assert!(asm.contains("    mov rax, 1\n    push rax\n    mov rax, 0\n    pop rbx\n    and rax, rbx\n"));

    let asm = compile("true or false .");
    assert!(asm.contains("    or rax, rbx\n"));
}

#[test]
fn equality_comparison_emits_sete() {
    let asm = compile("1 is equal to 2 .");

    assert!(asm.contains("    cmp rbx, rax\n    sete al\n    movzx rax, al\n"));
}

#[test]
fn ordering_comparisons_emit_setg_and_setl() {
    let asm = compile("2 is greater than 1 .");
    assert!(asm.contains("    cmp rbx, rax\n    setg al\n    movzx rax, al\n"));

    let asm = compile("1 is less than 2 .");
    assert!(asm.contains("    cmp rbx, rax\n    setl al\n    movzx rax, al\n"));
}

#[test]
fn not_flips_the_low_bit() {
    let asm = compile("not true .");

    assert!(asm.contains("    mov rax, 1\n    xor rax, 1\n"));
}

#[test]
fn float_literals_have_no_lowering() {
    let asm = compile("3.14 .");

    assert!(!asm.contains("3.14"));
}
