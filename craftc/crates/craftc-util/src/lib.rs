//! craftc-util - Shared leaf types for the CraftLang compiler.
//!
//! This crate holds the pieces every other phase needs: the closed set of
//! CraftLang variable types and the ASCII folding used for everything that
//! ends up in a Minecraft identifier or a datapack path.

use unicode_normalization::UnicodeNormalization;

/// The closed set of CraftLang variable types.
///
/// `Score` is a 32-bit signed integer living on the scoreboard; `Boolean` is
/// a score constrained to 0 or 1; `Entity` is a set of entities identified at
/// runtime by a shared tag. `Void` only occurs as a function return type.
///
/// # Example
///
/// ```
/// use craftc_util::VarType;
///
/// assert_eq!(VarType::from_keyword("score"), Some(VarType::Score));
/// assert_eq!(VarType::from_keyword("float"), None);
/// assert_eq!(VarType::Entity.keyword(), "entity");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    Void,
    Boolean,
    Score,
    Entity,
}

impl VarType {
    /// Maps a source-level type keyword to its `VarType`.
    ///
    /// Returns `None` for anything outside the fixed table; callers turn
    /// that into their own error.
    pub fn from_keyword(keyword: &str) -> Option<VarType> {
        match keyword {
            "void" => Some(VarType::Void),
            "boolean" => Some(VarType::Boolean),
            "score" => Some(VarType::Score),
            "entity" => Some(VarType::Entity),
            _ => None,
        }
    }

    /// The source keyword for this type.
    pub fn keyword(self) -> &'static str {
        match self {
            VarType::Void => "void",
            VarType::Boolean => "boolean",
            VarType::Score => "score",
            VarType::Entity => "entity",
        }
    }
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Folds a string to ASCII: NFKD normalization, then every non-ASCII
/// character is dropped.
///
/// Minecraft identifiers and datapack paths are ASCII; CraftLang identifiers
/// are full Unicode. Distinct identifiers may fold to the same ASCII form;
/// collisions are not detected.
///
/// # Example
///
/// ```
/// use craftc_util::asciify;
///
/// assert_eq!(asciify("héllo"), "hello");
/// assert_eq!(asciify("main"), "main");
/// ```
pub fn asciify(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}
