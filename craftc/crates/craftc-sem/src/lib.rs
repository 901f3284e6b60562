//! craftc-sem - Name resolution for the CraftLang code generator.
//!
//! Variables have no declarations in CraftLang; a name springs into
//! existence on first assignment and carries exactly one type at a time.
//! The scope tree tracks, per name, the internal id used in emitted
//! commands (the scoreboard "player" name, or the entity tag name) together
//! with the current type.

mod scope;

pub use scope::{Binding, ScopeId, ScopeTree};
