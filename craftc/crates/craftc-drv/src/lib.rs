//! craftc-drv - Compiler driver.
//!
//! Orchestrates the whole pipeline for one compile:
//!
//! ```text
//! source text -> walker -> CST (parser) -> datapack files (code generator)
//! ```
//!
//! There is no intermediate representation and no second pass: the code
//! generator walks the CST once, emitting command text as it goes. The
//! compiler is a pure function from one source file to one output tree;
//! existing files are overwritten, and on error the partially written tree
//! is undefined.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use craftc_gen::{compile_file, FsWriter};
use craftc_par::parse_file;
use craftc_walk::Walker;

/// Compiles CraftLang source text into a datapack at `out_dir`.
pub fn compile_source(source: &str, out_dir: &Path) -> Result<()> {
    let mut walker = Walker::new(source);
    let file = parse_file(&mut walker).context("parse error")?;
    debug!(
        namespace = %file.namespace,
        functions = file.func_defs.len(),
        "parsed source file"
    );

    let mut writer = FsWriter::new(out_dir);
    compile_file(&file, &mut writer).context("compile error")?;
    debug!(out_dir = %out_dir.display(), "datapack written");

    Ok(())
}

/// Reads `source_path` and compiles it into a datapack at `out_dir`.
pub fn compile_path(source_path: &Path, out_dir: &Path) -> Result<()> {
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("cannot read '{}'", source_path.display()))?;
    compile_source(&source, out_dir)
}
