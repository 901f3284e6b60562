//! The fixed datapack files written at the start of every compile.
//!
//! All three are bit-exact: CRLF line endings, tab indentation, pack format
//! 4. The `.load` function raises the command chain limit (loop bodies
//! re-invoke themselves through it) and creates the one scoreboard
//! objective every variable lives on.

use std::io::Write;

use crate::error::CompileError;
use crate::names::PackNames;
use crate::writer::PackWriter;

const PACK_MCMETA: &[u8] = b"{\r\n\
\t\"pack\": {\r\n\
\t\t\"pack_format\": 4,\r\n\
\t\t\"description\": \"\"\r\n\
\t}\r\n\
}\r\n";

const LOAD_MCFUNCTION: &[u8] = b"gamerule maxCommandChainLength 2147483647\r\n\
scoreboard objectives add craftlang dummy\r\n";

pub(crate) fn emit(names: &PackNames, writer: &mut dyn PackWriter) -> Result<(), CompileError> {
    let mut out = writer.create("pack.mcmeta")?;
    out.write_all(PACK_MCMETA)?;
    out.flush()?;

    let mut out = writer.create(&names.mcfunction_path(".load"))?;
    out.write_all(LOAD_MCFUNCTION)?;
    out.flush()?;

    let mut out = writer.create("data/minecraft/tags/functions/load.json")?;
    write!(
        out,
        "{{\r\n\t\"values\": [\r\n\t\t\"{}\"\r\n\t]\r\n}}\r\n",
        names.function_id(".load")
    )?;
    out.flush()?;

    Ok(())
}
