//! AST debugging hook.
//!
//! [`maybe_debug_ast`] is invoked from the parsing stage. When the file path
//! ends with the suffix in `ORCA_AST_TARGET_SUFFIX`, the tree is printed for
//! inspection.
//!
//! # Environment
//! - `ORCA_AST_TARGET_SUFFIX`: optional suffix (file name or relative path).
//!   If not set or empty, the hook is a no-op.

use std::path::Path;

use tree_sitter_orca::{Node, Tree};

/// Maximum snippet size when dumping node text.
const MAX_SNIPPET: usize = 100;

/// Dump the tree of `path` if it matches `ORCA_AST_TARGET_SUFFIX`.
pub fn maybe_debug_ast(path: &Path, tree: &Tree) {
    let suffix = match std::env::var("ORCA_AST_TARGET_SUFFIX") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return,
    };
    if !path.to_string_lossy().ends_with(suffix.trim()) {
        return;
    }
    println!(
        "========== AST S-EXPR (named nodes only) ==========\n{}",
        tree.root_node().to_sexp()
    );
    println!("========== AST FULL DUMP (named + unnamed) ==========");
    print!("{}", dump_lines(tree));
}

/// Line-per-node dump of the whole tree, indented by depth.
pub fn dump_lines(tree: &Tree) -> String {
    let mut out = String::new();
    let mut stack: Vec<(Node<'_>, usize)> = vec![(tree.root_node(), 0)];

    while let Some((n, depth)) = stack.pop() {
        let missing = if n.is_missing() { " MISSING" } else { "" };
        out.push_str(&format!(
            "{}{} [{}..{}] named={}{} text=`{}`\n",
            "  ".repeat(depth),
            n.kind(),
            n.start_byte(),
            n.end_byte(),
            n.is_named(),
            missing,
            snippet(n.utf8_text())
        ));
        for i in (0..n.child_count()).rev() {
            if let Some(ch) = n.child(i) {
                stack.push((ch, depth + 1));
            }
        }
    }
    out
}

fn snippet(text: &str) -> String {
    let mut t = text
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    if t.len() > MAX_SNIPPET {
        let mut cut = MAX_SNIPPET;
        while !t.is_char_boundary(cut) {
            cut -= 1;
        }
        t.truncate(cut);
        t.push('…');
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_lists_every_node_in_order() {
        let tree = tree_sitter_orca::parse("! Opt\n").unwrap();
        let dump = dump_lines(&tree);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "source_file [0..6] named=true text=`! Opt\\n`");
        assert_eq!(lines[1], "  simple_line [0..6] named=true text=`! Opt\\n`");
        assert_eq!(lines[2], "    ! [0..1] named=false text=`!`");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn long_text_is_truncated() {
        let s = snippet(&"x".repeat(150));
        assert!(s.ends_with('…'));
        assert_eq!(s.chars().count(), MAX_SNIPPET + 1);
    }
}
