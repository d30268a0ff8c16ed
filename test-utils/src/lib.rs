//! Helpers for end-to-end tests of the lorec binary.

use std::{
    error::Error,
    path::Path,
    process::{Command, Output},
    str,
};

/// Captured result of one compiler invocation.
pub struct Compilation {
    pub stdout: String,
    pub stderr: String,
    pub status: Option<i32>,
}

impl TryFrom<Output> for Compilation {
    type Error = Box<dyn Error>;

    fn try_from(output: Output) -> Result<Self, Self::Error> {
        Ok(Compilation {
            stdout: str::from_utf8(&output.stdout)?.to_owned(),
            stderr: str::from_utf8(&output.stderr)?.to_owned(),
            status: output.status.code(),
        })
    }
}

/// Runs the compiler binary at `lorec` on a single source file.
pub fn compile_file(lorec: &str, src_path: &Path) -> Result<Compilation, Box<dyn Error>> {
    let output = Command::new(lorec).arg(src_path).output()?;
    Compilation::try_from(output)
}

/// Runs the compiler binary at `lorec` with arbitrary arguments.
pub fn run_compiler(lorec: &str, args: &[&str]) -> Result<Compilation, Box<dyn Error>> {
    let output = Command::new(lorec).args(args).output()?;
    Compilation::try_from(output)
}
