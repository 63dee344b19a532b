use std::fmt::Write;

use super::node::Node;

/// Renders a node and its descendants one per line, indented by depth.
///
/// Each line reads `desc@start..stop "text"`; untagged nodes print `_`.
///
/// ```text
/// query@0..3 "a&b"
///   entity@0..1 "a"
///   and@1..2 "&"
///   entity@2..3 "b"
/// ```
pub fn render_tree(node: &Node) -> String {
    let mut out = String::new();
    render_into(&mut out, node, 0);
    out
}

fn render_into(out: &mut String, node: &Node, depth: usize) {
    let _ = writeln!(
        out,
        "{}{}@{}..{} {:?}",
        "  ".repeat(depth),
        node.desc().unwrap_or("_"),
        node.start(),
        node.stop(),
        node.text()
    );
    for child in node.children() {
        render_into(out, child, depth + 1);
    }
}
