//! Spell system: catalog, composition, presets, the spell book, and the
//! cooldown/mana cast gate.

pub mod catalog;
pub mod composer;
pub mod cooldowns;
pub mod presets;
pub mod registry;
pub mod types;

pub use catalog::available_components;
pub use composer::{compose, estimated_mana_cost, CasterProfile};
pub use cooldowns::CooldownTable;
pub use presets::{SpellLibrary, SpellLibraryPlugin};
pub use registry::SpellBook;
pub use types::{
    ComponentValue, EffectKind, EffectTarget, EffectWord, Element, Power, Shape, Spell,
    SpellComponent, SpellEffect, SpellSchool,
};
