//! Component catalog and level gating
//!
//! The catalog is fixed data: every component the composer understands,
//! with its weight and the caster level at which it unlocks. Browsing and
//! creation are independent gates; a level-1 character can inspect the
//! base catalog but composition is rejected until level 10.

use super::types::{ComponentValue, Element, EffectWord, Power, Shape, SpellComponent};

/// Minimum caster level to compose spells at all.
pub const CREATION_LEVEL: u32 = 10;

/// Maximum components a single spell can bind.
pub const MAX_COMPONENTS: usize = 4;

/// Base mana cost before any component contributions.
pub const BASE_MANA_COST: f32 = 15.0;

/// Mana added per point of component modifier.
pub const MANA_PER_MODIFIER: f32 = 8.0;

/// Base cooldown in seconds before shape contributions.
pub const BASE_COOLDOWN: f32 = 3.0;

/// Every catalog entry: (component, unlock level).
const CATALOG: &[(ComponentValue, f32, u32)] = &[
    (ComponentValue::Element(Element::Fire), 2.0, 1),
    (ComponentValue::Element(Element::Ice), 1.5, 1),
    (ComponentValue::Element(Element::Lightning), 2.5, 1),
    (ComponentValue::Element(Element::Earth), 1.8, 1),
    (ComponentValue::Element(Element::Air), 1.3, 1),
    (ComponentValue::Element(Element::Arcane), 3.0, 15),
    (ComponentValue::Shape(Shape::Bolt), 1.0, 1),
    (ComponentValue::Shape(Shape::Orb), 1.2, 1),
    (ComponentValue::Shape(Shape::Cone), 1.5, 1),
    (ComponentValue::Shape(Shape::Aura), 2.0, 12),
    (ComponentValue::Shape(Shape::Beam), 1.8, 18),
    (ComponentValue::Power(Power::Minor), 0.5, 1),
    (ComponentValue::Power(Power::Normal), 1.0, 1),
    (ComponentValue::Power(Power::Major), 1.5, 1),
    (ComponentValue::Power(Power::Greater), 2.0, 16),
    (ComponentValue::Power(Power::Supreme), 3.0, 22),
    (ComponentValue::Effect(EffectWord::Damage), 1.0, 1),
    (ComponentValue::Effect(EffectWord::Healing), 1.2, 1),
    (ComponentValue::Effect(EffectWord::Buff), 1.5, 14),
    (ComponentValue::Effect(EffectWord::Debuff), 1.3, 14),
    (ComponentValue::Effect(EffectWord::Utility), 2.0, 20),
];

/// The catalog weight for a component value.
pub fn modifier_for(value: ComponentValue) -> f32 {
    CATALOG
        .iter()
        .find(|(v, _, _)| *v == value)
        .map(|(_, m, _)| *m)
        .unwrap_or(1.0)
}

/// The level at which a component value unlocks.
pub fn unlock_level(value: ComponentValue) -> u32 {
    CATALOG
        .iter()
        .find(|(v, _, _)| *v == value)
        .map(|(_, _, lvl)| *lvl)
        .unwrap_or(1)
}

/// Construct a catalog component with its canonical modifier.
pub fn component(value: ComponentValue) -> SpellComponent {
    SpellComponent::new(value, modifier_for(value))
}

/// The component lists available at a given caster level, grouped by kind.
///
/// Pure function of level. Non-empty even below the creation gate so the
/// catalog can be browsed before level 10.
pub struct AvailableComponents {
    pub elements: Vec<SpellComponent>,
    pub shapes: Vec<SpellComponent>,
    pub powers: Vec<SpellComponent>,
    pub effects: Vec<SpellComponent>,
}

pub fn available_components(level: u32) -> AvailableComponents {
    let mut out = AvailableComponents {
        elements: Vec::new(),
        shapes: Vec::new(),
        powers: Vec::new(),
        effects: Vec::new(),
    };
    for &(value, modifier, unlock) in CATALOG {
        if level < unlock {
            continue;
        }
        let c = SpellComponent::new(value, modifier);
        match value {
            ComponentValue::Element(_) => out.elements.push(c),
            ComponentValue::Shape(_) => out.shapes.push(c),
            ComponentValue::Power(_) => out.powers.push(c),
            ComponentValue::Effect(_) => out.effects.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_catalog_is_browsable_at_level_one() {
        let available = available_components(1);
        assert_eq!(available.elements.len(), 5);
        assert_eq!(available.shapes.len(), 3);
        assert_eq!(available.powers.len(), 3);
        assert_eq!(available.effects.len(), 2);
    }

    #[test]
    fn test_full_catalog_at_max_threshold() {
        let available = available_components(22);
        assert_eq!(available.elements.len(), 6);
        assert_eq!(available.shapes.len(), 5);
        assert_eq!(available.powers.len(), 5);
        assert_eq!(available.effects.len(), 5);
    }

    #[test]
    fn test_unlock_thresholds() {
        assert_eq!(unlock_level(ComponentValue::Shape(Shape::Aura)), 12);
        assert_eq!(unlock_level(ComponentValue::Effect(EffectWord::Buff)), 14);
        assert_eq!(unlock_level(ComponentValue::Element(Element::Arcane)), 15);
        assert_eq!(unlock_level(ComponentValue::Power(Power::Greater)), 16);
        assert_eq!(unlock_level(ComponentValue::Shape(Shape::Beam)), 18);
        assert_eq!(unlock_level(ComponentValue::Effect(EffectWord::Utility)), 20);
        assert_eq!(unlock_level(ComponentValue::Power(Power::Supreme)), 22);
    }

    #[test]
    fn test_arcane_element_gated_below_fifteen() {
        let available = available_components(14);
        assert!(!available
            .elements
            .iter()
            .any(|c| c.value == ComponentValue::Element(Element::Arcane)));
    }
}
