use super::node::Node;

/// Validates the structural invariants of a node tree.
///
/// Asserts that, at every level:
/// - Spans are ordered and within the source
/// - Children lie within their parent
/// - Siblings are in document order and do not overlap
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(node: &Node) {
    let n = node.source().len();
    for current in node.walk() {
        let sp = current.span();
        assert!(
            sp.start <= sp.stop && sp.stop <= n,
            "span out of bounds: {sp:?} (source len: {n})"
        );
        for child in current.children() {
            assert!(
                sp.contains(child.span()),
                "child {:?} not contained in parent {sp:?}",
                child.span()
            );
        }
        for pair in current.children().windows(2) {
            assert!(
                pair[0].stop() <= pair[1].start(),
                "siblings out of order or overlapping: {:?} then {:?}",
                pair[0].span(),
                pair[1].span()
            );
        }
    }
}
