use quickcheck::{Arbitrary, Gen};

/// The operations a quicktest runs against an AVL tree of `(K, V)` records ordered by `K`.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Op<K, V> {
    /// Insert the record, creating or reviving the node for `K`
    Insert(K, V),
    /// Lazily remove the record keyed by `K`
    Remove(K),
    /// Look up the live record keyed by `K`
    Lookup(K),
    /// Compare the live records, in order, against the model
    Iter,
}

impl<K, V> Arbitrary for Op<K, V>
where
    K: Arbitrary,
    V: Arbitrary,
{
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 1, 2, 3]).unwrap() {
            0 => Op::Insert(K::arbitrary(g), V::arbitrary(g)),
            1 => Op::Remove(K::arbitrary(g)),
            2 => Op::Lookup(K::arbitrary(g)),
            3 => Op::Iter,
            _ => unreachable!(),
        }
    }
}
