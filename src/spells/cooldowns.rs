//! Cooldown tracking and the cast gate
//!
//! A spell id has an entry in the table only while its cooldown is
//! running; absence means ready. `cast` is the single mutation point that
//! deducts mana and starts the cooldown, and it either applies both or
//! neither.

use std::collections::HashMap;

use bevy::prelude::*;

use super::types::Spell;
use crate::error::CastError;

/// Resource mapping spell id to seconds of cooldown remaining.
#[derive(Resource, Default, Debug, Clone)]
pub struct CooldownTable {
    remaining: HashMap<String, f32>,
}

impl CooldownTable {
    pub fn on_cooldown(&self, spell_id: &str) -> bool {
        self.remaining.contains_key(spell_id)
    }

    /// Seconds until the spell is ready, 0.0 if ready now.
    pub fn remaining(&self, spell_id: &str) -> f32 {
        self.remaining.get(spell_id).copied().unwrap_or(0.0)
    }

    /// Advance all cooldowns by `delta` seconds, dropping expired entries.
    pub fn tick(&mut self, delta: f32) {
        self.remaining.retain(|_, remaining| {
            *remaining -= delta;
            *remaining > 0.0
        });
    }

    /// Whether a cast would currently be accepted. Mana regenerates
    /// fractionally, so the pool is compared as a float.
    pub fn can_cast(&self, spell: &Spell, caster_mana: f32) -> bool {
        !self.on_cooldown(&spell.id) && caster_mana >= spell.mana_cost as f32
    }

    /// Attempt a cast: deducts the spell's cost from `caster_mana` and
    /// starts the cooldown together, or rejects leaving both untouched.
    pub fn cast(&mut self, spell: &Spell, caster_mana: &mut f32) -> Result<(), CastError> {
        if self.on_cooldown(&spell.id) {
            return Err(CastError::OnCooldown {
                remaining: self.remaining(&spell.id),
            });
        }
        if *caster_mana < spell.mana_cost as f32 {
            return Err(CastError::NotEnoughMana {
                cost: spell.mana_cost,
                available: *caster_mana as u32,
            });
        }

        *caster_mana -= spell.mana_cost as f32;
        if spell.cooldown > 0.0 {
            self.remaining.insert(spell.id.clone(), spell.cooldown);
        }
        Ok(())
    }

    /// Clear every running cooldown (area transitions, test setup).
    pub fn reset(&mut self) {
        self.remaining.clear();
    }
}
