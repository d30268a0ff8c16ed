use std::{error::Error, path::Path};

use test_utils::{compile_file, run_compiler};

const LOREC: &str = env!("CARGO_BIN_EXE_lorec");

#[test]
fn missing_arguments_print_usage() -> Result<(), Box<dyn Error>> {
    let result = run_compiler(LOREC, &[])?;

    assert_eq!(result.status, Some(1));
    assert!(result.stdout.starts_with("Usage: "));
    assert!(result.stdout.trim_end().ends_with("<filename.lr>"));
    Ok(())
}

#[test]
fn extra_arguments_print_usage() -> Result<(), Box<dyn Error>> {
    let result = run_compiler(LOREC, &["one.lr", "two.lr"])?;

    assert_eq!(result.status, Some(1));
    assert!(result.stdout.starts_with("Usage: "));
    Ok(())
}

#[test]
fn unreadable_file_reports_and_exits_cleanly() -> Result<(), Box<dyn Error>> {
    let result = run_compiler(LOREC, &["no-such-story.lr"])?;

    assert_eq!(result.status, Some(0));
    assert_eq!(result.stdout, "");
    assert_eq!(result.stderr, "Error: Could not open file no-such-story.lr\n");
    Ok(())
}

#[test]
fn compiles_the_hello_demo() -> Result<(), Box<dyn Error>> {
    let result = compile_file(LOREC, Path::new("./demos/hello.lr"))?;

    assert_eq!(result.status, Some(0));
    assert_eq!(result.stderr, "");
    assert!(result.stdout.contains("global _start"));
    assert!(result.stdout.contains("  str0: db `Hello, World!`, 0"));
    assert!(result.stdout.contains("    mov rsi, NL"));
    Ok(())
}

#[test]
fn compiles_the_counting_demo() -> Result<(), Box<dyn Error>> {
    let result = compile_file(LOREC, Path::new("./demos/counting.lr"))?;

    assert_eq!(result.status, Some(0));
    assert_eq!(result.stderr, "");
    assert!(result.stdout.contains("    sub rsp, 16"));
    assert!(result.stdout.contains("    jmp L0"));
    Ok(())
}

#[test]
fn compiles_the_procedures_demo() -> Result<(), Box<dyn Error>> {
    let result = compile_file(LOREC, Path::new("./demos/procedures.lr"))?;

    assert_eq!(result.status, Some(0));
    assert_eq!(result.stderr, "");
    assert!(result.stdout.contains("proc_double:"));
    assert!(result.stdout.contains("    call proc_double"));
    Ok(())
}

#[test]
fn generation_errors_leave_partial_output() -> Result<(), Box<dyn Error>> {
    let result = compile_file(LOREC, Path::new("./demos/hello.lr"))?;
    assert!(result.stderr.is_empty());

    // A break outside any loop aborts generation mid-stream; the sections
    // emitted before the error stay on stdout and the process still exits 0.
    let broken = run_compiler(LOREC, &["./demos/unfinished.lr"])?;
    assert_eq!(broken.status, Some(0));
    assert!(broken.stdout.contains("section .rodata"));
    assert!(broken
        .stderr
        .contains("Runtime Error during code generation: 'the story ends at this moment' can only be used inside a loop."));
    Ok(())
}
