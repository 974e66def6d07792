//! The player's spell book
//!
//! Known spells are stored by value in learn order. `learn` is idempotent
//! by id: learning a spell twice is a no-op, not an error.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::presets::{SpellLibrary, STARTING_SPELLS};
use super::types::Spell;

/// Resource holding every spell the player knows, in learn order.
#[derive(Resource, Default, Debug, Clone, Serialize, Deserialize)]
pub struct SpellBook {
    spells: Vec<Spell>,
}

impl SpellBook {
    /// A spell book seeded with the starting spells from the library.
    pub fn with_starting_spells(library: &SpellLibrary) -> Self {
        let mut book = Self::default();
        for id in STARTING_SPELLS {
            match library.get(id) {
                Some(spell) => {
                    book.learn(spell.clone());
                }
                None => warn!("Starting spell '{}' missing from library", id),
            }
        }
        book
    }

    /// Add a spell. Returns false (and changes nothing) if a spell with
    /// the same id is already known.
    pub fn learn(&mut self, spell: Spell) -> bool {
        if self.knows(&spell.id) {
            return false;
        }
        self.spells.push(spell);
        true
    }

    pub fn knows(&self, id: &str) -> bool {
        self.spells.iter().any(|s| s.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Spell> {
        self.spells.iter().find(|s| s.id == id)
    }

    /// Known spells in learn order.
    pub fn known_spells(&self) -> &[Spell] {
        &self.spells
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spells::types::SpellSchool;

    fn spell(id: &str) -> Spell {
        Spell {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            school: SpellSchool::Arcane,
            mana_cost: 10,
            cooldown: 1.0,
            damage: Some(5),
            healing: None,
            effects: Vec::new(),
            components: None,
            is_custom: false,
        }
    }

    #[test]
    fn test_learn_is_idempotent_by_id() {
        let mut book = SpellBook::default();
        assert!(book.learn(spell("fireball")));
        assert!(!book.learn(spell("fireball")));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_known_spells_preserve_learn_order() {
        let mut book = SpellBook::default();
        book.learn(spell("a"));
        book.learn(spell("c"));
        book.learn(spell("b"));
        let ids: Vec<_> = book.known_spells().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "b"]);
    }
}
