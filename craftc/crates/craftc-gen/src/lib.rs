//! craftc-gen - Code generation for the CraftLang compiler.
//!
//! Consumes a parsed [`File`](craftc_par::cst::File) and writes a complete
//! Minecraft datapack through a [`PackWriter`]: the fixed packaging files
//! (`pack.mcmeta`, the load tag, the `.load` function) plus one
//! `.mcfunction` file per source function and one per generated branch or
//! loop body.

mod codegen;
mod datapack;
mod error;
mod names;
mod writer;

pub use codegen::compile_file;
pub use error::CompileError;
pub use writer::{FsWriter, MemWriter, PackWriter};
