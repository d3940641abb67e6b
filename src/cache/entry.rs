use crate::cache::recency_list::NodeRef;

/// The value stored in the hash map, with a back-link to the node that
/// carries its key in the shard's recency list.
#[derive(Debug)]
pub(crate) struct Entry<V> {
    value: V,
    node: NodeRef,
}

impl<V> Entry<V> {
    pub(crate) fn new(value: V, node: NodeRef) -> Self {
        Self { value, node }
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn node(&self) -> NodeRef {
        self.node
    }
}
