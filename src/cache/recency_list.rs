const HEAD: usize = 0;
const TAIL: usize = 1;

// Marks a slot that is allocated but not currently linked into the list,
// and doubles as the "no neighbour" link of the sentinels.
const UNLINKED: usize = usize::MAX;

/// Stable handle to a node owned by a [`RecencyList`].
///
/// The generation is bumped every time a slot is freed, so a handle taken
/// before a concurrent eviction fails to resolve instead of reaching a
/// recycled node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeRef {
    slot: usize,
    generation: u64,
}

#[derive(Debug)]
struct Slot<K> {
    key: Option<K>,
    prev: usize,
    next: usize,
    generation: u64,
}

/// Doubly linked list ordering keys from least- (front) to most-recently
/// used (back), backed by a slab of slots with head/tail sentinels.
///
/// Slots are reused through a free list; nodes are only reachable through
/// a [`NodeRef`] carrying the matching generation.
#[derive(Debug)]
pub(crate) struct RecencyList<K> {
    slots: Vec<Slot<K>>,
    free: Vec<usize>,
    linked: usize,
}

impl<K> RecencyList<K> {
    pub(crate) fn new() -> RecencyList<K> {
        RecencyList {
            slots: vec![
                Slot {
                    key: None,
                    prev: UNLINKED,
                    next: TAIL,
                    generation: 0,
                },
                Slot {
                    key: None,
                    prev: HEAD,
                    next: UNLINKED,
                    generation: 0,
                },
            ],
            free: Vec::new(),
            linked: 0,
        }
    }

    /// Creates a detached node carrying `key`. The node joins the list only
    /// once it is passed to [`RecencyList::push_back`].
    pub(crate) fn allocate(&mut self, key: K) -> NodeRef {
        let slot = match self.free.pop() {
            Some(slot) => {
                let node = &mut self.slots[slot];
                node.key = Some(key);
                node.prev = UNLINKED;
                node.next = UNLINKED;
                slot
            }
            None => {
                self.slots.push(Slot {
                    key: Some(key),
                    prev: UNLINKED,
                    next: UNLINKED,
                    generation: 0,
                });
                self.slots.len() - 1
            }
        };

        NodeRef {
            slot,
            generation: self.slots[slot].generation,
        }
    }

    /// Links a detached node at the most-recently-used end. A stale or
    /// already linked reference is left untouched.
    pub(crate) fn push_back(&mut self, node: NodeRef) {
        match self.resolve(node) {
            Some(slot) if !self.is_linked(slot) => self.link_before_tail(slot),
            _ => {}
        }
    }

    /// Moves a linked node to the most-recently-used end. A stale reference
    /// or a node that was evicted since the reference was taken is left
    /// untouched.
    pub(crate) fn promote(&mut self, node: NodeRef) {
        if let Some(slot) = self.resolve(node) {
            if self.is_linked(slot) {
                self.unlink(slot);
                self.link_before_tail(slot);
            }
        }
    }

    /// Unlinks and frees a linked node. Returns false for a stale reference
    /// or a node that is currently detached.
    pub(crate) fn remove(&mut self, node: NodeRef) -> bool {
        match self.resolve(node) {
            Some(slot) if self.is_linked(slot) => {
                self.unlink(slot);
                self.free_slot(slot);
                true
            }
            _ => false,
        }
    }

    /// Frees a node that never made it into the list.
    pub(crate) fn release(&mut self, node: NodeRef) {
        if let Some(slot) = self.resolve(node) {
            if !self.is_linked(slot) {
                self.free_slot(slot);
            }
        }
    }

    /// Unlinks and frees the least-recently-used node, handing its key back
    /// to the caller. Returns `None` when the list is empty.
    pub(crate) fn pop_front(&mut self) -> Option<K> {
        let candidate = self.slots[HEAD].next;
        if candidate == TAIL {
            return None;
        }

        self.unlink(candidate);
        self.free_slot(candidate)
    }

    /// Drains every allocated slot, including detached ones, and restores
    /// the empty head↔tail linkage.
    pub(crate) fn clear(&mut self) {
        for slot in 2..self.slots.len() {
            if self.slots[slot].key.is_some() {
                self.free_slot(slot);
            }
        }

        self.slots[HEAD].next = TAIL;
        self.slots[TAIL].prev = HEAD;
        self.linked = 0;
    }

    pub(crate) fn linked_len(&self) -> usize {
        self.linked
    }

    fn resolve(&self, node: NodeRef) -> Option<usize> {
        match self.slots.get(node.slot) {
            Some(slot) if slot.generation == node.generation && slot.key.is_some() => {
                Some(node.slot)
            }
            _ => None,
        }
    }

    fn is_linked(&self, slot: usize) -> bool {
        self.slots[slot].prev != UNLINKED
    }

    fn link_before_tail(&mut self, slot: usize) {
        let mru = self.slots[TAIL].prev;

        self.slots[slot].next = TAIL;
        self.slots[slot].prev = mru;

        self.slots[TAIL].prev = slot;
        self.slots[mru].next = slot;

        self.linked += 1;
    }

    fn unlink(&mut self, slot: usize) {
        let prev = self.slots[slot].prev;
        let next = self.slots[slot].next;

        self.slots[prev].next = next;
        self.slots[next].prev = prev;

        self.slots[slot].prev = UNLINKED;
        self.linked -= 1;
    }

    fn free_slot(&mut self, slot: usize) -> Option<K> {
        let key = self.slots[slot].key.take();
        self.slots[slot].generation += 1;
        self.slots[slot].prev = UNLINKED;
        self.free.push(slot);
        key
    }
}

impl<K: Clone> RecencyList<K> {
    /// Keys from least- to most-recently used.
    pub(crate) fn ordered_keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.linked);

        let mut slot = self.slots[HEAD].next;
        while slot != TAIL {
            if let Some(key) = &self.slots[slot].key {
                keys.push(key.clone());
            }
            slot = self.slots[slot].next;
        }

        keys
    }
}
