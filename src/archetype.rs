// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Archetype bitsets and component tags
//!
//! An archetype is the set of component kinds an entity carries, packed
//! into one machine word. Bit algebra on archetypes doubles as column
//! index arithmetic: the popcount below a tag is that tag's column
//! position inside a bucket.

use std::fmt;

/// Maximum number of component kinds a schema may declare.
pub const MAX_COMPONENTS: usize = 64;

/// Index of a component kind in the schema, `0..MAX_COMPONENTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag(u8);

impl Tag {
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < MAX_COMPONENTS, "tag index {index} out of range");
        Tag(index as u8)
    }

    /// Position of this kind in the schema's declaration order.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn bit(self) -> u64 {
        1 << self.0
    }
}

/// Set of component kinds, one bit per schema tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Archetype(u64);

impl Archetype {
    /// The set with no components.
    pub const EMPTY: Archetype = Archetype(0);

    /// Set containing exactly `tag`.
    pub fn just(tag: Tag) -> Self {
        Archetype(tag.bit())
    }

    /// Copy of `self` with `tag` set.
    #[must_use]
    pub fn with(self, tag: Tag) -> Self {
        Archetype(self.0 | tag.bit())
    }

    /// Copy of `self` with `tag` cleared.
    #[must_use]
    pub fn without(self, tag: Tag) -> Self {
        Archetype(self.0 & !tag.bit())
    }

    /// Set union.
    #[must_use]
    pub fn merge(self, other: Archetype) -> Self {
        Archetype(self.0 | other.0)
    }

    /// Set intersection.
    #[must_use]
    pub fn intersection(self, other: Archetype) -> Self {
        Archetype(self.0 & other.0)
    }

    /// Tags in `self` that are not in `other`.
    #[must_use]
    pub fn difference(self, other: Archetype) -> Self {
        Archetype(self.0 & !other.0)
    }

    /// Supertype test: every tag of `other` is present in `self`.
    pub fn contains(self, other: Archetype) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn has(self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of tags in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Rank of `tag` within the set: the number of set bits below it.
    /// `tag` must be present.
    pub fn position(self, tag: Tag) -> usize {
        debug_assert!(self.has(tag), "tag {} not in {:?}", tag.index(), self);
        (self.0 & (tag.bit() - 1)).count_ones() as usize
    }

    /// Checked form of [`position`](Self::position).
    pub fn position_of(self, tag: Tag) -> Option<usize> {
        if self.has(tag) {
            Some(self.position(tag))
        } else {
            None
        }
    }

    /// Iterate the set's tags in ascending order.
    pub fn tags(self) -> Tags {
        Tags(self.0)
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Archetype[")?;
        let mut first = true;
        for tag in self.tags() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", tag.index())?;
            first = false;
        }
        write!(f, "]")
    }
}

/// Iterator over set bits, low to high, consuming a copy of the word.
pub struct Tags(u64);

impl Iterator for Tags {
    type Item = Tag;

    fn next(&mut self) -> Option<Tag> {
        if self.0 == 0 {
            return None;
        }
        let trailing = self.0.trailing_zeros();
        self.0 &= !(1 << trailing); // Clear the bit we just found
        Some(Tag(trailing as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_and_without() {
        let t0 = Tag::new(0);
        let t5 = Tag::new(5);

        let arch = Archetype::EMPTY.with(t0).with(t5);
        assert!(arch.has(t0));
        assert!(arch.has(t5));
        assert!(!arch.without(t5).has(t5));
        assert!(arch.without(t5).has(t0));
        assert_eq!(arch.len(), 2);
    }

    #[test]
    fn contains_is_a_supertype_test() {
        let a = Tag::new(1);
        let b = Tag::new(3);
        let c = Tag::new(7);

        let superset = Archetype::EMPTY.with(a).with(b).with(c);
        let subset = Archetype::EMPTY.with(a).with(c);

        assert!(superset.contains(subset));
        assert!(!subset.contains(superset));
        assert!(superset.contains(Archetype::EMPTY));
        // contains(A ∪ B) == contains(A) && contains(B)
        assert!(superset.contains(subset.merge(Archetype::just(b))));
    }

    #[test]
    fn set_algebra() {
        let a = Archetype::EMPTY.with(Tag::new(0)).with(Tag::new(2));
        let b = Archetype::EMPTY.with(Tag::new(2)).with(Tag::new(4));

        assert_eq!(a.merge(b).len(), 3);
        assert_eq!(a.intersection(b), Archetype::just(Tag::new(2)));
        assert_eq!(a.difference(b), Archetype::just(Tag::new(0)));
        assert_eq!(a.difference(a), Archetype::EMPTY);
    }

    #[test]
    fn position_counts_bits_below() {
        let arch = Archetype::EMPTY
            .with(Tag::new(1))
            .with(Tag::new(4))
            .with(Tag::new(9));

        assert_eq!(arch.position(Tag::new(1)), 0);
        assert_eq!(arch.position(Tag::new(4)), 1);
        assert_eq!(arch.position(Tag::new(9)), 2);
        assert_eq!(arch.position_of(Tag::new(3)), None);
    }

    #[test]
    fn tags_iterate_ascending() {
        let arch = Archetype::EMPTY
            .with(Tag::new(63))
            .with(Tag::new(0))
            .with(Tag::new(17));

        let order: Vec<usize> = arch.tags().map(Tag::index).collect();
        assert_eq!(order, vec![0, 17, 63]);
    }

    #[test]
    fn empty_iterates_nothing() {
        assert_eq!(Archetype::EMPTY.tags().count(), 0);
    }
}
