//! # Lorec
//!
//! This binary is the compiler of Lore. It drives the lexer, parser, and code
//! generator in sequence, streaming the generated assembly to standard
//! output.

mod cli;

use std::{fs, io};

use log::info;

use cli::Cli;
use lore_lang::{compiler::CodeGenerator, lexer::Lexer, parser::Parser};

fn main() {
    let args = Cli::init();

    simple_logger::init_with_level(args.verbosity.into()).unwrap();

    let Ok(source) = fs::read_to_string(&args.file) else {
        eprintln!("Error: Could not open file {}", args.file.display());
        return;
    };

    let tokens = Lexer::new(&source).scan_tokens();
    let statements = Parser::new(tokens).parse();

    info!("Generating code...");

    let stdout = io::stdout();
    let mut generator = CodeGenerator::new(stdout.lock());

    if let Err(error) = generator.generate(&statements) {
        eprintln!("Runtime Error during code generation: {error}");
    }
}
