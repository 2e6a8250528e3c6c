use crate::menu::slot::WedgeAddress;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    prev: Option<WedgeAddress>,
    next: Option<WedgeAddress>,
}

/// Wedges that currently contribute to a panel's composed style, in the
/// order they became active.
///
/// A doubly-linked list threaded through a hash map: every insert, remove
/// and step of iteration touches at most three entries.
#[derive(Debug, Clone, Default)]
pub struct ActiveSet {
    links: HashMap<WedgeAddress, Link>,
    head: Option<WedgeAddress>,
    tail: Option<WedgeAddress>,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `addr` at the tail. Returns `false` if it was already present.
    pub fn insert(&mut self, addr: WedgeAddress) -> bool {
        if self.links.contains_key(&addr) {
            return false;
        }

        self.links.insert(
            addr,
            Link {
                prev: self.tail,
                next: None,
            },
        );
        match self.tail.and_then(|tail| self.links.get_mut(&tail)) {
            Some(link) => link.next = Some(addr),
            None => self.head = Some(addr),
        }
        self.tail = Some(addr);
        true
    }

    /// Unlinks `addr` wherever it sits. Returns `false` if it was absent.
    pub fn remove(&mut self, addr: WedgeAddress) -> bool {
        let Some(link) = self.links.remove(&addr) else {
            return false;
        };

        match link.prev.and_then(|prev| self.links.get_mut(&prev)) {
            Some(prev) => prev.next = link.next,
            None => self.head = link.next,
        }
        match link.next.and_then(|next| self.links.get_mut(&next)) {
            Some(next) => next.prev = link.prev,
            None => self.tail = link.prev,
        }
        true
    }

    pub fn contains(&self, addr: WedgeAddress) -> bool {
        self.links.contains_key(&addr)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            set: self,
            cursor: self.head,
        }
    }

    pub fn ordered_values(&self) -> Vec<WedgeAddress> {
        self.iter().collect()
    }
}

pub struct Iter<'a> {
    set: &'a ActiveSet,
    cursor: Option<WedgeAddress>,
}

impl Iterator for Iter<'_> {
    type Item = WedgeAddress;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = self.set.links.get(&current).and_then(|link| link.next);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.set.len()))
    }
}

impl<'a> IntoIterator for &'a ActiveSet {
    type Item = WedgeAddress;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
