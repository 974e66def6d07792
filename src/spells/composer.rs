//! Freeform spell composition
//!
//! `compose` turns a list of catalog components into a finished `Spell`.
//! The accumulation order is load-bearing: mana is added per component in
//! list order, and shape/power components multiply the running totals
//! accumulated so far, so the same components in a different order can
//! produce a different spell. This matches the reference behavior and is
//! covered by golden-value tests.

use std::sync::atomic::{AtomicU64, Ordering};

use super::catalog::{
    self, BASE_COOLDOWN, BASE_MANA_COST, CREATION_LEVEL, MANA_PER_MODIFIER, MAX_COMPONENTS,
};
use super::types::{
    ComponentValue, EffectKind, EffectTarget, EffectWord, Element, Shape, Spell, SpellComponent,
    SpellEffect, SpellSchool,
};
use crate::error::ComposeError;

/// The caster attributes composition depends on.
#[derive(Clone, Copy, Debug)]
pub struct CasterProfile {
    pub level: u32,
    pub intelligence: u32,
    pub current_mana: u32,
}

static NEXT_CUSTOM_ID: AtomicU64 = AtomicU64::new(1);

fn next_custom_id() -> String {
    let n = NEXT_CUSTOM_ID.fetch_add(1, Ordering::Relaxed);
    format!("custom_{n}")
}

/// Validate and build a custom spell from components.
///
/// Validation runs in a fixed order and the first failure wins: count,
/// required kinds (element, shape, effect), unlock gating, the level-10
/// creation gate, then an advisory mana check against the final cost. The
/// mana check is repeated authoritatively at cast time.
///
/// School tie-break: an element sets the school, a healing effect forces
/// it to healing; when both appear the later component in list order wins.
pub fn compose(
    components: &[SpellComponent],
    name: &str,
    caster: &CasterProfile,
) -> Result<Spell, ComposeError> {
    if components.is_empty() {
        return Err(ComposeError::Empty);
    }
    if components.len() > MAX_COMPONENTS {
        return Err(ComposeError::TooManyComponents {
            count: components.len(),
            max: MAX_COMPONENTS,
        });
    }
    let has = |pred: fn(&ComponentValue) -> bool| components.iter().any(|c| pred(&c.value));
    if !has(|v| matches!(v, ComponentValue::Element(_))) {
        return Err(ComposeError::MissingElement);
    }
    if !has(|v| matches!(v, ComponentValue::Shape(_))) {
        return Err(ComposeError::MissingShape);
    }
    if !has(|v| matches!(v, ComponentValue::Effect(_))) {
        return Err(ComposeError::MissingEffect);
    }
    for c in components {
        let unlock = catalog::unlock_level(c.value);
        if caster.level < unlock {
            return Err(ComposeError::ComponentLocked {
                label: c.value.label(),
                unlock_level: unlock,
            });
        }
    }
    if caster.level < CREATION_LEVEL {
        return Err(ComposeError::CreationLevelTooLow {
            level: caster.level,
            required: CREATION_LEVEL,
        });
    }

    let props = calculate_properties(components, caster.intelligence);

    if props.mana_cost > caster.current_mana {
        return Err(ComposeError::NotEnoughMana {
            cost: props.mana_cost,
            available: caster.current_mana,
        });
    }

    let name = if name.trim().is_empty() {
        "Custom Spell".to_string()
    } else {
        name.to_string()
    };

    Ok(Spell {
        id: next_custom_id(),
        name,
        description: generate_description(components),
        school: props.school,
        mana_cost: props.mana_cost,
        cooldown: props.cooldown,
        damage: (props.damage > 0).then_some(props.damage),
        healing: (props.healing > 0).then_some(props.healing),
        effects: props.effects,
        components: Some(components.to_vec()),
        is_custom: true,
    })
}

struct SpellProperties {
    mana_cost: u32,
    damage: i32,
    healing: i32,
    cooldown: f32,
    school: SpellSchool,
    effects: Vec<SpellEffect>,
}

fn calculate_properties(components: &[SpellComponent], intelligence: u32) -> SpellProperties {
    let mut mana_cost = BASE_MANA_COST;
    let mut damage = 0.0f32;
    let mut healing = 0.0f32;
    let mut cooldown = BASE_COOLDOWN;
    let mut school = SpellSchool::Arcane;

    let int_bonus = (intelligence / 5) as f32;

    for component in components {
        mana_cost += component.modifier * MANA_PER_MODIFIER;

        match component.value {
            ComponentValue::Element(element) => {
                school = element.school();
                damage += component.modifier * (15.0 + int_bonus);
            }
            ComponentValue::Shape(shape) => {
                damage = (damage * shape.damage_multiplier()).floor();
                cooldown += component.modifier * 0.5;
            }
            ComponentValue::Power(power) => {
                let mult = power.multiplier();
                damage = (damage * mult).floor();
                healing = (healing * mult).floor();
                mana_cost = (mana_cost * mult).floor();
            }
            ComponentValue::Effect(EffectWord::Healing) => {
                healing += component.modifier * (20.0 + int_bonus);
                school = SpellSchool::Healing;
            }
            ComponentValue::Effect(EffectWord::Damage) => {
                damage += component.modifier * (10.0 + int_bonus);
            }
            ComponentValue::Effect(_) => {}
        }
    }

    let damage = damage.floor() as i32;
    let healing = healing.floor() as i32;
    let mana_cost = mana_cost.floor().max(5.0) as u32;
    let cooldown = cooldown.max(1.0);

    let target = target_from_shape(components);
    let mut effects = Vec::new();
    if damage > 0 {
        effects.push(SpellEffect {
            kind: EffectKind::Damage,
            magnitude: damage,
            duration: None,
            target,
        });
    }
    if healing > 0 {
        effects.push(SpellEffect {
            kind: EffectKind::Healing,
            magnitude: healing,
            duration: None,
            target: EffectTarget::Caster,
        });
    }
    add_special_effects(components, &mut effects);

    SpellProperties {
        mana_cost,
        damage,
        healing,
        cooldown,
        school,
        effects,
    }
}

fn find_shape(components: &[SpellComponent]) -> Option<Shape> {
    components.iter().find_map(|c| match c.value {
        ComponentValue::Shape(s) => Some(s),
        _ => None,
    })
}

fn target_from_shape(components: &[SpellComponent]) -> EffectTarget {
    match find_shape(components) {
        Some(shape) if shape.is_area() => EffectTarget::Area,
        _ => EffectTarget::Enemy,
    }
}

fn add_special_effects(components: &[SpellComponent], effects: &mut Vec<SpellEffect>) {
    let has_ice = components
        .iter()
        .any(|c| c.value == ComponentValue::Element(Element::Ice));
    let has_area_shape = components
        .iter()
        .any(|c| matches!(c.value, ComponentValue::Shape(s) if s.is_area()));

    // Ice chills whatever it touches.
    if has_ice {
        effects.push(SpellEffect {
            kind: EffectKind::Debuff,
            magnitude: 25,
            duration: Some(5.0),
            target: EffectTarget::Enemy,
        });
    }

    // Cone and aura deliveries hit everything in the impact zone.
    if has_area_shape {
        for effect in effects.iter_mut() {
            if effect.kind == EffectKind::Damage {
                effect.target = EffectTarget::Area;
            }
        }
    }
}

/// Quick cost preview for the composer UI: base plus per-component mana,
/// without the power multiplier pass.
pub fn estimated_mana_cost(components: &[SpellComponent]) -> u32 {
    let total = components
        .iter()
        .fold(BASE_MANA_COST, |acc, c| acc + c.modifier * MANA_PER_MODIFIER);
    total.floor().max(5.0) as u32
}

fn generate_description(components: &[SpellComponent]) -> String {
    let element = components.iter().find_map(|c| match c.value {
        ComponentValue::Element(e) => Some(e),
        _ => None,
    });
    let shape = find_shape(components);
    let power = components.iter().find_map(|c| match c.value {
        ComponentValue::Power(p) => Some(p),
        _ => None,
    });
    let heals = components
        .iter()
        .any(|c| c.value == ComponentValue::Effect(EffectWord::Healing));

    let mut description = String::from("A custom spell that ");
    description.push_str(if heals { "restores health" } else { "deals damage" });
    if let Some(element) = element {
        description.push_str(&format!(" using {} magic", element.label()));
    }
    if let Some(shape) = shape {
        description.push_str(&format!(" in a {} pattern", shape.label()));
    }
    if let Some(power) = power {
        if power != super::types::Power::Normal {
            description.push_str(&format!(" with {} intensity", power.label()));
        }
    }
    description.push('.');
    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spells::catalog::component;
    use crate::spells::types::Power;

    fn caster(level: u32, intelligence: u32, mana: u32) -> CasterProfile {
        CasterProfile {
            level,
            intelligence,
            current_mana: mana,
        }
    }

    #[test]
    fn test_fire_bolt_golden_values() {
        let components = [
            component(ComponentValue::Element(Element::Fire)),
            component(ComponentValue::Shape(Shape::Bolt)),
            component(ComponentValue::Effect(EffectWord::Damage)),
        ];
        let spell = compose(&components, "Test Bolt", &caster(10, 10, 200)).unwrap();

        // fire adds 2*(15+2)=34, bolt multiplies by 1.0, damage adds 1*(10+2)=12
        assert_eq!(spell.damage, Some(46));
        // 15 base + 8 per modifier point (2 + 1 + 1)
        assert_eq!(spell.mana_cost, 47);
        assert_eq!(spell.cooldown, 3.5);
        assert_eq!(spell.school, SpellSchool::Fire);
        assert_eq!(spell.effects[0].target, EffectTarget::Enemy);
        assert!(spell.is_custom);
    }

    #[test]
    fn test_ice_always_adds_one_slow_debuff() {
        let components = [
            component(ComponentValue::Element(Element::Ice)),
            component(ComponentValue::Shape(Shape::Orb)),
            component(ComponentValue::Effect(EffectWord::Damage)),
        ];
        let spell = compose(&components, "Frost", &caster(10, 10, 200)).unwrap();

        let debuffs: Vec<_> = spell
            .effects
            .iter()
            .filter(|e| e.kind == EffectKind::Debuff)
            .collect();
        assert_eq!(debuffs.len(), 1);
        assert_eq!(debuffs[0].magnitude, 25);
        assert_eq!(debuffs[0].duration, Some(5.0));
        assert_eq!(debuffs[0].target, EffectTarget::Enemy);
    }

    #[test]
    fn test_cone_retargets_damage_to_area() {
        let components = [
            component(ComponentValue::Element(Element::Fire)),
            component(ComponentValue::Shape(Shape::Cone)),
            component(ComponentValue::Effect(EffectWord::Damage)),
        ];
        let spell = compose(&components, "Flame Fan", &caster(10, 10, 200)).unwrap();

        for effect in spell.effects.iter().filter(|e| e.kind == EffectKind::Damage) {
            assert_eq!(effect.target, EffectTarget::Area);
        }
    }

    #[test]
    fn test_mana_and_cooldown_clamps() {
        // minor power can push the cost below the floor
        let components = [
            component(ComponentValue::Element(Element::Air)),
            component(ComponentValue::Shape(Shape::Bolt)),
            SpellComponent::new(ComponentValue::Power(Power::Minor), 0.5),
            component(ComponentValue::Effect(EffectWord::Damage)),
        ];
        let spell = compose(&components, "", &caster(10, 5, 200)).unwrap();
        assert!(spell.mana_cost >= 5);
        assert!(spell.cooldown >= 1.0);
        assert_eq!(spell.name, "Custom Spell");
    }

    #[test]
    fn test_validation_order_first_failure_wins() {
        let profile = caster(5, 10, 200);

        assert_eq!(compose(&[], "x", &profile), Err(ComposeError::Empty));

        // missing-kind failures are reported before the creation gate
        let only_element = [component(ComponentValue::Element(Element::Fire))];
        assert_eq!(
            compose(&only_element, "x", &profile),
            Err(ComposeError::MissingShape)
        );

        let full = [
            component(ComponentValue::Element(Element::Fire)),
            component(ComponentValue::Shape(Shape::Bolt)),
            component(ComponentValue::Effect(EffectWord::Damage)),
        ];
        assert_eq!(
            compose(&full, "x", &profile),
            Err(ComposeError::CreationLevelTooLow {
                level: 5,
                required: 10
            })
        );
    }

    #[test]
    fn test_locked_component_rejected() {
        let components = [
            component(ComponentValue::Element(Element::Fire)),
            component(ComponentValue::Shape(Shape::Beam)),
            component(ComponentValue::Effect(EffectWord::Damage)),
        ];
        assert_eq!(
            compose(&components, "x", &caster(12, 10, 200)),
            Err(ComposeError::ComponentLocked {
                label: "beam",
                unlock_level: 18
            })
        );
    }

    #[test]
    fn test_advisory_mana_check() {
        let components = [
            component(ComponentValue::Element(Element::Fire)),
            component(ComponentValue::Shape(Shape::Bolt)),
            component(ComponentValue::Effect(EffectWord::Damage)),
        ];
        let result = compose(&components, "x", &caster(10, 10, 10));
        assert_eq!(
            result,
            Err(ComposeError::NotEnoughMana {
                cost: 47,
                available: 10
            })
        );
    }

    #[test]
    fn test_healing_effect_overrides_school() {
        let components = [
            component(ComponentValue::Element(Element::Fire)),
            component(ComponentValue::Shape(Shape::Bolt)),
            component(ComponentValue::Effect(EffectWord::Healing)),
        ];
        let spell = compose(&components, "Warm Light", &caster(10, 10, 200)).unwrap();
        assert_eq!(spell.school, SpellSchool::Healing);
        assert!(spell.healing.is_some());
        assert!(spell.description.contains("restores health"));
    }

    #[test]
    fn test_power_multiplies_accumulated_mana_in_order() {
        // supreme at the end multiplies everything accumulated before it
        let components = [
            component(ComponentValue::Element(Element::Fire)),
            component(ComponentValue::Shape(Shape::Bolt)),
            component(ComponentValue::Effect(EffectWord::Damage)),
            SpellComponent::new(ComponentValue::Power(Power::Supreme), 3.0),
        ];
        let spell = compose(&components, "Big", &caster(22, 10, 500)).unwrap();
        // mana: (15 + 16 + 8 + 8 + 24) * 2.5 = 177 (floored)
        assert_eq!(spell.mana_cost, 177);
        // damage: (34 * 1.0 + 12) * 2.5 = 115
        assert_eq!(spell.damage, Some(115));
    }

    #[test]
    fn test_custom_ids_are_unique() {
        let components = [
            component(ComponentValue::Element(Element::Fire)),
            component(ComponentValue::Shape(Shape::Bolt)),
            component(ComponentValue::Effect(EffectWord::Damage)),
        ];
        let a = compose(&components, "a", &caster(10, 10, 200)).unwrap();
        let b = compose(&components, "b", &caster(10, 10, 200)).unwrap();
        assert_ne!(a.id, b.id);
    }
}
