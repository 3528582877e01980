//! Element unlock offers granted at milestone waves.

use std::collections::BTreeSet;

use rand::{seq::SliceRandom, Rng};
use realm_defence_core::{Element, ElementError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ElementState {
    unlocked: BTreeSet<Element>,
    offer: Vec<Element>,
}

impl ElementState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Draws up to `size` still-locked elements and makes them the pending
    /// offer. Returns the offer, empty once every element is unlocked.
    pub(crate) fn offer<R: Rng>(&mut self, rng: &mut R, size: usize) -> &[Element] {
        let mut candidates: Vec<Element> = Element::ALL
            .into_iter()
            .filter(|element| !self.unlocked.contains(element))
            .collect();
        candidates.shuffle(rng);
        candidates.truncate(size);
        self.offer = candidates;
        &self.offer
    }

    /// Unlocks an offered element and clears the offer.
    pub(crate) fn choose(&mut self, element: Element) -> Result<(), ElementError> {
        if self.unlocked.contains(&element) {
            return Err(ElementError::AlreadyUnlocked(element));
        }
        if !self.offer.contains(&element) {
            return Err(ElementError::NotOffered(element));
        }
        let _ = self.unlocked.insert(element);
        self.offer.clear();
        Ok(())
    }

    pub(crate) fn is_unlocked(&self, element: Element) -> bool {
        self.unlocked.contains(&element)
    }

    pub(crate) fn pending(&self) -> &[Element] {
        &self.offer
    }

    pub(crate) fn unlocked(&self) -> impl Iterator<Item = Element> + '_ {
        self.unlocked.iter().copied()
    }
}
