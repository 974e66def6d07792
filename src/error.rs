//! Error types for the simulation core.
//!
//! No error here is fatal to the game loop: every failure mode degrades to
//! "the operation did not happen" plus a diagnostic. Composition errors are
//! reported back to the caller with no state mutated; cast rejections leave
//! mana and cooldowns untouched; capacity rejections leave the item where
//! it was.

use thiserror::Error;

/// Errors from spell composition validation.
///
/// Checked in a fixed order; the first failure wins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    /// No components selected.
    #[error("a spell needs at least one component")]
    Empty,

    /// More components than a single spell can bind.
    #[error("too many components: {count} (maximum {max})")]
    TooManyComponents { count: usize, max: usize },

    /// Every spell needs an element component.
    #[error("a spell needs an element component")]
    MissingElement,

    /// Every spell needs a shape component.
    #[error("a spell needs a shape component")]
    MissingShape,

    /// Every spell needs an effect component.
    #[error("a spell needs an effect component")]
    MissingEffect,

    /// A selected component hasn't been unlocked yet.
    #[error("component '{label}' unlocks at level {unlock_level}")]
    ComponentLocked { label: &'static str, unlock_level: u32 },

    /// Spell creation itself is gated by caster level.
    #[error("spell creation requires level {required}, caster is level {level}")]
    CreationLevelTooLow { level: u32, required: u32 },

    /// Advisory check: the finished spell would cost more mana than the
    /// caster currently has. The authoritative check happens again at cast
    /// time.
    #[error("not enough mana: spell costs {cost}, caster has {available}")]
    NotEnoughMana { cost: u32, available: u32 },
}

/// Reasons a cast is rejected. The cast is a no-op in both cases.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    #[error("spell is on cooldown ({remaining:.1}s remaining)")]
    OnCooldown { remaining: f32 },

    #[error("not enough mana: spell costs {cost}, caster has {available}")]
    NotEnoughMana { cost: u32, available: u32 },
}

/// Errors from inventory and equipment operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemError {
    #[error("unknown item id '{0}'")]
    UnknownItem(String),

    #[error("inventory is full")]
    InventoryFull,

    #[error("too heavy: would carry {would_be:.1} of {max:.1}")]
    OverWeight { would_be: f32, max: f32 },

    #[error("not carrying item '{0}'")]
    NotCarried(String),

    #[error("item '{0}' cannot be used")]
    NotUsable(String),

    #[error("item '{0}' cannot be equipped")]
    NotEquippable(String),

    #[error("requirements not met for '{0}'")]
    RequirementsNotMet(String),

    #[error("not enough gold: costs {cost}, have {available}")]
    NotEnoughGold { cost: u32, available: u32 },
}

/// Errors that can occur when loading static game data from RON.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read '{path}': {details}")]
    ReadError { path: String, details: String },

    #[error("parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    #[error("'{path}' is missing required entries: {missing:?}")]
    MissingEntries { path: String, missing: Vec<String> },
}
