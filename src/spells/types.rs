//! Spell data model
//!
//! Components, schools, and effects are closed enums so effect dispatch is
//! an exhaustive match rather than a string comparison. A `Spell` is an
//! immutable value: presets come from config, custom spells from the
//! composer, and neither is mutated after creation.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Elemental building blocks. Each element maps to a spell school.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Ice,
    Lightning,
    Earth,
    Air,
    Arcane,
}

impl Element {
    /// The school a spell built on this element belongs to.
    pub fn school(self) -> SpellSchool {
        match self {
            Element::Fire => SpellSchool::Fire,
            Element::Ice => SpellSchool::Ice,
            Element::Lightning => SpellSchool::Lightning,
            Element::Earth | Element::Air | Element::Arcane => SpellSchool::Arcane,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Ice => "ice",
            Element::Lightning => "lightning",
            Element::Earth => "earth",
            Element::Air => "air",
            Element::Arcane => "arcane",
        }
    }
}

/// Delivery shapes. Cone and aura spells hit an area instead of a single
/// target.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Shape {
    Bolt,
    Orb,
    Cone,
    Aura,
    Beam,
}

impl Shape {
    /// Damage multiplier applied when this shape is folded into a
    /// composition.
    pub fn damage_multiplier(self) -> f32 {
        match self {
            Shape::Bolt => 1.0,
            Shape::Orb => 1.1,
            Shape::Cone => 1.3,
            Shape::Aura => 0.8,
            Shape::Beam => 1.2,
        }
    }

    /// Whether this shape targets an area rather than a single enemy.
    pub fn is_area(self) -> bool {
        matches!(self, Shape::Cone | Shape::Aura)
    }

    pub fn label(self) -> &'static str {
        match self {
            Shape::Bolt => "bolt",
            Shape::Orb => "orb",
            Shape::Cone => "cone",
            Shape::Aura => "aura",
            Shape::Beam => "beam",
        }
    }
}

/// Power intensities. Scales damage, healing, and mana cost together.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Power {
    Minor,
    Normal,
    Major,
    Greater,
    Supreme,
}

impl Power {
    pub fn multiplier(self) -> f32 {
        match self {
            Power::Minor => 0.7,
            Power::Normal => 1.0,
            Power::Major => 1.4,
            Power::Greater => 1.8,
            Power::Supreme => 2.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Power::Minor => "minor",
            Power::Normal => "normal",
            Power::Major => "major",
            Power::Greater => "greater",
            Power::Supreme => "supreme",
        }
    }
}

/// Effect words steer what the finished spell does.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EffectWord {
    Damage,
    Healing,
    Buff,
    Debuff,
    Utility,
}

impl EffectWord {
    pub fn label(self) -> &'static str {
        match self {
            EffectWord::Damage => "damage",
            EffectWord::Healing => "healing",
            EffectWord::Buff => "buff",
            EffectWord::Debuff => "debuff",
            EffectWord::Utility => "utility",
        }
    }
}

/// A component's typed value. One variant per component kind.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub enum ComponentValue {
    Element(Element),
    Shape(Shape),
    Power(Power),
    Effect(EffectWord),
}

impl ComponentValue {
    pub fn label(self) -> &'static str {
        match self {
            ComponentValue::Element(e) => e.label(),
            ComponentValue::Shape(s) => s.label(),
            ComponentValue::Power(p) => p.label(),
            ComponentValue::Effect(e) => e.label(),
        }
    }
}

/// A typed, weighted spell-building primitive drawn from the catalog.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct SpellComponent {
    pub value: ComponentValue,
    /// Positive weight; scales the component's contribution.
    pub modifier: f32,
}

impl SpellComponent {
    pub fn new(value: ComponentValue, modifier: f32) -> Self {
        Self { value, modifier }
    }
}

/// Working list of components during composition. Spells bind at most four.
pub type ComponentList = SmallVec<[SpellComponent; 4]>;

/// The thematic category a spell belongs to, derived from its components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SpellSchool {
    Fire,
    Ice,
    Lightning,
    Healing,
    Buff,
    Debuff,
    Arcane,
}

impl SpellSchool {
    pub fn name(self) -> &'static str {
        match self {
            SpellSchool::Fire => "Fire",
            SpellSchool::Ice => "Ice",
            SpellSchool::Lightning => "Lightning",
            SpellSchool::Healing => "Healing",
            SpellSchool::Buff => "Buff",
            SpellSchool::Debuff => "Debuff",
            SpellSchool::Arcane => "Arcane",
        }
    }
}

/// What kind of effect a spell entry applies.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EffectKind {
    Damage,
    Healing,
    Buff,
    Debuff,
    Utility,
}

/// Who an effect applies to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The caster.
    Caster,
    /// A single enemy.
    Enemy,
    /// A friendly target.
    Ally,
    /// Every enemy in the impact area.
    Area,
}

/// One concrete effect of a finished spell.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct SpellEffect {
    pub kind: EffectKind,
    pub magnitude: i32,
    #[serde(default)]
    pub duration: Option<f32>,
    pub target: EffectTarget,
}

/// An immutable spell stat block.
///
/// Presets carry no source components; custom spells keep the exact list
/// they were composed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub id: String,
    pub name: String,
    pub description: String,
    pub school: SpellSchool,
    pub mana_cost: u32,
    /// Minimum seconds between successive casts.
    pub cooldown: f32,
    #[serde(default)]
    pub damage: Option<i32>,
    #[serde(default)]
    pub healing: Option<i32>,
    pub effects: Vec<SpellEffect>,
    #[serde(default)]
    pub components: Option<Vec<SpellComponent>>,
    #[serde(default)]
    pub is_custom: bool,
}

impl Spell {
    /// Returns true if this spell deals direct damage.
    pub fn is_damage(&self) -> bool {
        self.damage.is_some()
    }

    /// Returns true if this spell heals.
    pub fn is_heal(&self) -> bool {
        self.healing.is_some()
    }
}
