//! Builders for every identifier and path the generator emits.
//!
//! Minecraft only accepts ASCII in identifiers and paths, so every
//! namespace or function component is folded first. The naming scheme, for
//! namespace `n0.n1...` and function `f`:
//!
//! - function id: `n0:n1/.../f`, auxiliary id: `n0:n1/.../f.k`
//! - local variable: `locals.n0.n1.....f.k`
//! - parameter slot: `args.n0.n1.....f.i`
//! - return slot: `rets.n0.n1.....f.0`
//! - file path: `data/n0/functions/n1/.../f.mcfunction`

use craftc_par::cst::NamespaceDecl;
use craftc_util::asciify;

/// The single scoreboard objective everything lives on.
pub(crate) const OBJECTIVE: &str = "craftlang";

/// ASCII-folded namespace components, split head/tail: the head becomes the
/// datapack namespace, the tail becomes directories.
pub(crate) struct PackNames {
    head: String,
    tail: Vec<String>,
    dotted: String,
}

impl PackNames {
    pub fn new(namespace: &NamespaceDecl<'_>) -> Self {
        let mut components = namespace.components.iter().map(|c| asciify(c.lexeme()));
        let head = components.next().unwrap_or_default();
        let tail: Vec<String> = components.collect();
        let dotted = if tail.is_empty() {
            head.clone()
        } else {
            format!("{}.{}", head, tail.join("."))
        };
        PackNames { head, tail, dotted }
    }

    /// `n0:n1/.../name`.
    pub fn function_id(&self, name: &str) -> String {
        let mut segments: Vec<&str> = self.tail.iter().map(String::as_str).collect();
        segments.push(name);
        format!("{}:{}", self.head, segments.join("/"))
    }

    /// `n0:n1/.../func.k`.
    pub fn aux_id(&self, func: &str, k: u32) -> String {
        format!("{}.{}", self.function_id(func), k)
    }

    /// `data/n0/functions/n1/.../name.mcfunction`.
    pub fn mcfunction_path(&self, name: &str) -> String {
        let mut path = format!("data/{}/functions", self.head);
        for segment in &self.tail {
            path.push('/');
            path.push_str(segment);
        }
        path.push('/');
        path.push_str(name);
        path.push_str(".mcfunction");
        path
    }

    pub fn locals_iid(&self, func: &str, k: u32) -> String {
        format!("locals.{}.{}.{}", self.dotted, func, k)
    }

    pub fn args_iid(&self, func: &str, i: usize) -> String {
        format!("args.{}.{}.{}", self.dotted, func, i)
    }

    pub fn rets_iid(&self, func: &str) -> String {
        format!("rets.{}.{}.0", self.dotted, func)
    }
}
