//! Keybinding system for remappable controls
//!
//! Allows players to customize game controls. Raw keyboard state is
//! resolved once per tick into a `PlayerInput` resource so the
//! simulation systems never read the keyboard directly (the headless
//! runner writes `PlayerInput` itself).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All possible actions that can be bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameAction {
    // Navigation
    Back,
    Confirm,

    // Movement
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,

    // Combat
    Attack,
    CastSlot1,
    CastSlot2,
    CastSlot3,
    CastSlot4,

    // Panels
    ToggleInventory,
    ToggleQuests,
    ToggleSpellCrafting,
    ToggleCharacter,
}

impl GameAction {
    pub fn description(&self) -> &'static str {
        match self {
            GameAction::Back => "Back / Cancel",
            GameAction::Confirm => "Confirm / Select",
            GameAction::MoveUp => "Move Up",
            GameAction::MoveDown => "Move Down",
            GameAction::MoveLeft => "Move Left",
            GameAction::MoveRight => "Move Right",
            GameAction::Attack => "Melee Attack",
            GameAction::CastSlot1 => "Cast Spell 1",
            GameAction::CastSlot2 => "Cast Spell 2",
            GameAction::CastSlot3 => "Cast Spell 3",
            GameAction::CastSlot4 => "Cast Spell 4",
            GameAction::ToggleInventory => "Inventory",
            GameAction::ToggleQuests => "Quest Log",
            GameAction::ToggleSpellCrafting => "Spell Crafting",
            GameAction::ToggleCharacter => "Character Sheet",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            GameAction::Back | GameAction::Confirm => "Navigation",
            GameAction::MoveUp
            | GameAction::MoveDown
            | GameAction::MoveLeft
            | GameAction::MoveRight => "Movement",
            GameAction::Attack
            | GameAction::CastSlot1
            | GameAction::CastSlot2
            | GameAction::CastSlot3
            | GameAction::CastSlot4 => "Combat",
            GameAction::ToggleInventory
            | GameAction::ToggleQuests
            | GameAction::ToggleSpellCrafting
            | GameAction::ToggleCharacter => "Panels",
        }
    }

    pub fn all() -> Vec<GameAction> {
        vec![
            GameAction::Back,
            GameAction::Confirm,
            GameAction::MoveUp,
            GameAction::MoveDown,
            GameAction::MoveLeft,
            GameAction::MoveRight,
            GameAction::Attack,
            GameAction::CastSlot1,
            GameAction::CastSlot2,
            GameAction::CastSlot3,
            GameAction::CastSlot4,
            GameAction::ToggleInventory,
            GameAction::ToggleQuests,
            GameAction::ToggleSpellCrafting,
            GameAction::ToggleCharacter,
        ]
    }
}

/// Key binding with primary and optional secondary key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyBinding {
    #[serde(with = "keycode_serde")]
    pub primary: KeyCode,
    #[serde(with = "option_keycode_serde")]
    pub secondary: Option<KeyCode>,
}

/// Serializable wrapper for KeyCode (stores as string)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SerializableKeyCode(String);

impl From<KeyCode> for SerializableKeyCode {
    fn from(key: KeyCode) -> Self {
        Self(format!("{:?}", key))
    }
}

impl From<SerializableKeyCode> for KeyCode {
    fn from(sk: SerializableKeyCode) -> Self {
        match sk.0.as_str() {
            "Escape" => KeyCode::Escape,
            "Enter" => KeyCode::Enter,
            "Space" => KeyCode::Space,
            "Tab" => KeyCode::Tab,
            "KeyA" => KeyCode::KeyA,
            "KeyC" => KeyCode::KeyC,
            "KeyD" => KeyCode::KeyD,
            "KeyE" => KeyCode::KeyE,
            "KeyI" => KeyCode::KeyI,
            "KeyJ" => KeyCode::KeyJ,
            "KeyK" => KeyCode::KeyK,
            "KeyQ" => KeyCode::KeyQ,
            "KeyS" => KeyCode::KeyS,
            "KeyW" => KeyCode::KeyW,
            "Digit1" => KeyCode::Digit1,
            "Digit2" => KeyCode::Digit2,
            "Digit3" => KeyCode::Digit3,
            "Digit4" => KeyCode::Digit4,
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            _ => KeyCode::Escape, // Default fallback
        }
    }
}

mod keycode_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(key: &KeyCode, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sk: SerializableKeyCode = (*key).into();
        sk.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<KeyCode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sk = SerializableKeyCode::deserialize(deserializer)?;
        Ok(sk.into())
    }
}

mod option_keycode_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(key: &Option<KeyCode>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match key {
            Some(k) => {
                let sk: SerializableKeyCode = (*k).into();
                serializer.serialize_some(&sk)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<KeyCode>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt_sk: Option<SerializableKeyCode> = Option::deserialize(deserializer)?;
        Ok(opt_sk.map(|sk| sk.into()))
    }
}

impl KeyBinding {
    pub fn new(primary: KeyCode) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn with_secondary(primary: KeyCode, secondary: KeyCode) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    pub fn matches(&self, key: KeyCode) -> bool {
        self.primary == key || self.secondary == Some(key)
    }
}

/// Complete keybindings configuration
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
pub struct Keybindings {
    bindings: HashMap<GameAction, KeyBinding>,
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::create_defaults()
    }
}

impl Keybindings {
    /// Create default keybindings
    pub fn create_defaults() -> Self {
        let mut bindings = HashMap::new();

        bindings.insert(GameAction::Back, KeyBinding::new(KeyCode::Escape));
        bindings.insert(GameAction::Confirm, KeyBinding::new(KeyCode::Enter));

        bindings.insert(
            GameAction::MoveUp,
            KeyBinding::with_secondary(KeyCode::KeyW, KeyCode::ArrowUp),
        );
        bindings.insert(
            GameAction::MoveDown,
            KeyBinding::with_secondary(KeyCode::KeyS, KeyCode::ArrowDown),
        );
        bindings.insert(
            GameAction::MoveLeft,
            KeyBinding::with_secondary(KeyCode::KeyA, KeyCode::ArrowLeft),
        );
        bindings.insert(
            GameAction::MoveRight,
            KeyBinding::with_secondary(KeyCode::KeyD, KeyCode::ArrowRight),
        );

        bindings.insert(GameAction::Attack, KeyBinding::new(KeyCode::Space));
        bindings.insert(GameAction::CastSlot1, KeyBinding::new(KeyCode::Digit1));
        bindings.insert(GameAction::CastSlot2, KeyBinding::new(KeyCode::Digit2));
        bindings.insert(GameAction::CastSlot3, KeyBinding::new(KeyCode::Digit3));
        bindings.insert(GameAction::CastSlot4, KeyBinding::new(KeyCode::Digit4));

        bindings.insert(GameAction::ToggleInventory, KeyBinding::new(KeyCode::KeyI));
        bindings.insert(GameAction::ToggleQuests, KeyBinding::new(KeyCode::KeyJ));
        bindings.insert(
            GameAction::ToggleSpellCrafting,
            KeyBinding::new(KeyCode::KeyK),
        );
        bindings.insert(GameAction::ToggleCharacter, KeyBinding::new(KeyCode::KeyC));

        Self { bindings }
    }

    /// Get the binding for an action
    pub fn get(&self, action: GameAction) -> Option<&KeyBinding> {
        self.bindings.get(&action)
    }

    /// Set a new binding for an action
    pub fn set(&mut self, action: GameAction, binding: KeyBinding) {
        self.bindings.insert(action, binding);
    }

    /// Reset all bindings to defaults
    pub fn reset_to_defaults(&mut self) {
        *self = Self::create_defaults();
    }

    /// Check if an action is currently pressed
    pub fn action_pressed(&self, action: GameAction, keyboard: &ButtonInput<KeyCode>) -> bool {
        if let Some(binding) = self.get(action) {
            keyboard.pressed(binding.primary)
                || binding.secondary.map_or(false, |key| keyboard.pressed(key))
        } else {
            false
        }
    }

    /// Check if an action was just pressed this frame
    pub fn action_just_pressed(&self, action: GameAction, keyboard: &ButtonInput<KeyCode>) -> bool {
        if let Some(binding) = self.get(action) {
            keyboard.just_pressed(binding.primary)
                || binding
                    .secondary
                    .map_or(false, |key| keyboard.just_pressed(key))
        } else {
            false
        }
    }

    /// Check if a key is already bound to any action (for conflict detection)
    pub fn is_key_bound(
        &self,
        key: KeyCode,
        exclude_action: Option<GameAction>,
    ) -> Option<GameAction> {
        self.bindings
            .iter()
            .find(|(action, binding)| {
                if let Some(excluded) = exclude_action {
                    if **action == excluded {
                        return false;
                    }
                }
                binding.matches(key)
            })
            .map(|(action, _)| *action)
    }

    /// Get a human-readable string for a key
    pub fn key_name(key: KeyCode) -> &'static str {
        match key {
            KeyCode::Escape => "ESC",
            KeyCode::Enter => "ENTER",
            KeyCode::Space => "SPACE",
            KeyCode::Tab => "TAB",
            KeyCode::KeyA => "A",
            KeyCode::KeyC => "C",
            KeyCode::KeyD => "D",
            KeyCode::KeyE => "E",
            KeyCode::KeyI => "I",
            KeyCode::KeyJ => "J",
            KeyCode::KeyK => "K",
            KeyCode::KeyQ => "Q",
            KeyCode::KeyS => "S",
            KeyCode::KeyW => "W",
            KeyCode::Digit1 => "1",
            KeyCode::Digit2 => "2",
            KeyCode::Digit3 => "3",
            KeyCode::Digit4 => "4",
            KeyCode::ArrowUp => "UP",
            KeyCode::ArrowDown => "DOWN",
            KeyCode::ArrowLeft => "LEFT",
            KeyCode::ArrowRight => "RIGHT",
            _ => "???",
        }
    }

    /// Get display string for a binding
    pub fn binding_display(&self, action: GameAction) -> String {
        if let Some(binding) = self.get(action) {
            let primary = Self::key_name(binding.primary);
            if let Some(secondary) = binding.secondary {
                format!("{} / {}", primary, Self::key_name(secondary))
            } else {
                primary.to_string()
            }
        } else {
            "Unbound".to_string()
        }
    }
}

/// Resolved per-tick input. The simulation reads this, never the keyboard.
#[derive(Resource, Default, Clone, Debug)]
pub struct PlayerInput {
    pub move_up: bool,
    pub move_down: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub attack_held: bool,
    /// Spell slot pressed this tick (0-based), if any.
    pub cast_slot: Option<usize>,
}

impl PlayerInput {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Resolves keyboard state into `PlayerInput` at the start of the tick.
pub fn capture_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    bindings: Res<Keybindings>,
    mut input: ResMut<PlayerInput>,
) {
    input.move_up = bindings.action_pressed(GameAction::MoveUp, &keyboard);
    input.move_down = bindings.action_pressed(GameAction::MoveDown, &keyboard);
    input.move_left = bindings.action_pressed(GameAction::MoveLeft, &keyboard);
    input.move_right = bindings.action_pressed(GameAction::MoveRight, &keyboard);
    input.attack_held = bindings.action_pressed(GameAction::Attack, &keyboard);

    input.cast_slot = None;
    let slots = [
        GameAction::CastSlot1,
        GameAction::CastSlot2,
        GameAction::CastSlot3,
        GameAction::CastSlot4,
    ];
    for (index, action) in slots.into_iter().enumerate() {
        if bindings.action_just_pressed(action, &keyboard) {
            input.cast_slot = Some(index);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_action() {
        let bindings = Keybindings::create_defaults();
        for action in GameAction::all() {
            assert!(bindings.get(action).is_some(), "{:?} unbound", action);
        }
    }

    #[test]
    fn test_secondary_key_matches() {
        let bindings = Keybindings::create_defaults();
        let up = bindings.get(GameAction::MoveUp).unwrap();
        assert!(up.matches(KeyCode::KeyW));
        assert!(up.matches(KeyCode::ArrowUp));
        assert!(!up.matches(KeyCode::KeyS));
    }

    #[test]
    fn test_conflict_detection() {
        let bindings = Keybindings::create_defaults();
        assert_eq!(
            bindings.is_key_bound(KeyCode::Space, None),
            Some(GameAction::Attack)
        );
        assert_eq!(
            bindings.is_key_bound(KeyCode::Space, Some(GameAction::Attack)),
            None
        );
    }

    #[test]
    fn test_bindings_serialize_round_trip() {
        let bindings = Keybindings::create_defaults();
        let json = serde_json::to_string(&bindings).unwrap();
        let restored: Keybindings = serde_json::from_str(&json).unwrap();
        assert_eq!(
            restored.get(GameAction::Attack),
            bindings.get(GameAction::Attack)
        );
    }
}
