/// What an insertion into a subtree did to that subtree's height. The parent uses this to decide
/// whether its own balance factor changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Growth {
    /// The subtree is one level taller than before. The parent must adjust its balance factor.
    Taller,
    /// The subtree kept its height (a revival, or a rebalance absorbed the new node) so no
    /// ancestor needs to change.
    Settled,
}
