//! Intrusive MRU list used for the reverse page index.
//!
//! Entries are linked through indices into a node arena rather than pointers,
//! so a handle stays valid until the entry it names is erased. Insertion
//! returns the handle needed to erase or promote the entry in constant time.

/// A stable reference to a list entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Handle(u32);

impl Handle {
    pub const NONE: Handle = Handle(NIL);
}

const NIL: u32 = u32::MAX;

struct Node<T> {
    val: T,
    prev: u32,
    next: u32,
}

pub struct MruList<T> {
    nodes: Vec<Node<T>>,
    head: u32,
    free: Vec<u32>,
}

impl<T: Copy> MruList<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: NIL,
            free: Vec::new(),
        }
    }

    pub fn insert_front(&mut self, val: T) -> Handle {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx as usize].val = val;
                idx
            }
            None => {
                self.nodes.push(Node { val, prev: NIL, next: NIL });
                (self.nodes.len() - 1) as u32
            }
        };
        self.link_front(idx);
        Handle(idx)
    }

    pub fn move_front(&mut self, handle: Handle) {
        if self.head == handle.0 {
            return;
        }
        self.unlink(handle.0);
        self.link_front(handle.0);
    }

    pub fn erase(&mut self, handle: Handle) {
        self.unlink(handle.0);
        self.free.push(handle.0);
    }

    /// Iterate front to back, most recently used first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { list: self, cur: self.head }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
    }

    fn link_front(&mut self, idx: u32) {
        self.nodes[idx as usize].prev = NIL;
        self.nodes[idx as usize].next = self.head;
        if self.head != NIL {
            self.nodes[self.head as usize].prev = idx;
        }
        self.head = idx;
    }

    fn unlink(&mut self, idx: u32) {
        let (prev, next) = {
            let node = &self.nodes[idx as usize];
            (node.prev, node.next)
        };
        if prev != NIL {
            self.nodes[prev as usize].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next as usize].prev = prev;
        }
    }
}

pub struct Iter<'a, T> {
    list: &'a MruList<T>,
    cur: u32,
}

impl<T: Copy> Iterator for Iter<'_, T> {
    type Item = (Handle, T);

    fn next(&mut self) -> Option<(Handle, T)> {
        if self.cur == NIL {
            return None;
        }
        let node = &self.list.nodes[self.cur as usize];
        let item = (Handle(self.cur), node.val);
        self.cur = node.next;
        Some(item)
    }
}
