//! Items, inventory, and equipment
//!
//! Item definitions are data in `assets/config/items.ron`, loaded into an
//! immutable `ItemRegistry` at startup. The `Inventory` resource holds the
//! player's carried stacks and equipped items; every operation that can
//! fail returns an `ItemError` and leaves the inventory untouched.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entities::PlayerStats;
use crate::error::{DataLoadError, ItemError};

const CONFIG_PATH: &str = "assets/config/items.ron";

/// Maximum distinct stacks the inventory can hold.
pub const MAX_SLOTS: usize = 30;

/// Maximum total carried weight.
pub const MAX_WEIGHT: f32 = 100.0;

/// Fraction of an item's value received when selling.
pub const SELL_VALUE_FRACTION: f32 = 0.5;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ItemKind {
    Consumable,
    Weapon,
    Armor,
    Accessory,
    Material,
}

impl ItemKind {
    /// Consumables and materials stack; gear occupies one slot per item.
    pub fn stackable(self) -> bool {
        matches!(self, ItemKind::Consumable | ItemKind::Material)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Stat bonuses granted while an item is equipped.
#[derive(Clone, Copy, Default, Debug, Serialize, Deserialize)]
pub struct ItemStats {
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub intelligence: u32,
    #[serde(default)]
    pub dexterity: u32,
    #[serde(default)]
    pub spell_power: u32,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub mana: f32,
}

impl ItemStats {
    pub fn add(&mut self, other: &ItemStats) {
        self.strength += other.strength;
        self.intelligence += other.intelligence;
        self.dexterity += other.dexterity;
        self.spell_power += other.spell_power;
        self.health += other.health;
        self.mana += other.mana;
    }
}

/// Minimum player attributes needed to equip an item.
#[derive(Clone, Copy, Default, Debug, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub intelligence: u32,
    #[serde(default)]
    pub dexterity: u32,
}

impl Requirements {
    pub fn met_by(&self, stats: &PlayerStats) -> bool {
        stats.level >= self.level
            && stats.strength >= self.strength
            && stats.intelligence >= self.intelligence
            && stats.dexterity >= self.dexterity
    }
}

/// What happens when a consumable is used.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub enum UseEffect {
    RestoreHealth(i32),
    RestoreMana(f32),
}

/// One item definition as loaded from config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ItemKind,
    pub rarity: Rarity,
    /// Base gold value; sell price is half this.
    pub value: u32,
    pub weight: f32,
    #[serde(default)]
    pub stats: Option<ItemStats>,
    #[serde(default)]
    pub requirements: Option<Requirements>,
    #[serde(default)]
    pub use_effect: Option<UseEffect>,
}

/// Equipment slots. Armor pieces infer their slot from the item id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Helmet,
    Boots,
    Accessory1,
    Accessory2,
}

impl EquipSlot {
    pub fn label(self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Armor => "armor",
            EquipSlot::Helmet => "helmet",
            EquipSlot::Boots => "boots",
            EquipSlot::Accessory1 => "accessory1",
            EquipSlot::Accessory2 => "accessory2",
        }
    }
}

/// Root structure for the items.ron file.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemRegistryConfig {
    pub items: Vec<ItemDef>,
}

/// Resource containing all item definitions.
#[derive(Resource)]
pub struct ItemRegistry {
    items: Vec<ItemDef>,
}

impl Default for ItemRegistry {
    /// Load from the default config file.
    /// Panics if the file cannot be loaded - use for tests only.
    fn default() -> Self {
        load_item_registry().expect("Failed to load item registry in Default impl")
    }
}

impl ItemRegistry {
    pub fn new(config: ItemRegistryConfig) -> Self {
        Self {
            items: config.items,
        }
    }

    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check that the items the starting kit and shops depend on exist.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let expected = [
            "health_potion",
            "mana_potion",
            "wooden_staff",
            "cloth_robe",
            "crystal_shard",
        ];
        let missing: Vec<String> = expected
            .into_iter()
            .filter(|id| self.get(id).is_none())
            .map(String::from)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

/// One carried stack.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InventorySlot {
    pub item_id: String,
    pub quantity: u32,
}

/// The player's carried items and equipped gear.
#[derive(Resource, Default, Clone, Debug, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<InventorySlot>,
    equipment: HashMap<EquipSlot, String>,
}

impl Inventory {
    /// The starting kit every new character carries.
    pub fn with_starting_items(registry: &ItemRegistry) -> Self {
        let mut inv = Self::default();
        for (id, qty) in [
            ("health_potion", 3),
            ("mana_potion", 2),
            ("wooden_staff", 1),
            ("cloth_robe", 1),
        ] {
            if let Err(err) = inv.add_item(registry, id, qty) {
                warn!("Starting item '{}' not added: {}", id, err);
            }
        }
        inv
    }

    pub fn slots(&self) -> &[InventorySlot] {
        &self.slots
    }

    pub fn equipped(&self, slot: EquipSlot) -> Option<&str> {
        self.equipment.get(&slot).map(String::as_str)
    }

    pub fn total_weight(&self, registry: &ItemRegistry) -> f32 {
        self.slots
            .iter()
            .filter_map(|s| registry.get(&s.item_id).map(|d| d.weight * s.quantity as f32))
            .sum()
    }

    pub fn quantity_of(&self, id: &str) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.item_id == id)
            .map(|s| s.quantity)
            .sum()
    }

    pub fn has_item(&self, id: &str, quantity: u32) -> bool {
        self.quantity_of(id) >= quantity
    }

    /// Add a quantity of an item, stacking where the kind allows. Rejects
    /// unknown ids, over-weight loads, and full inventories without
    /// mutating anything.
    pub fn add_item(
        &mut self,
        registry: &ItemRegistry,
        id: &str,
        quantity: u32,
    ) -> Result<(), ItemError> {
        let def = registry
            .get(id)
            .ok_or_else(|| ItemError::UnknownItem(id.to_string()))?;

        let would_be = self.total_weight(registry) + def.weight * quantity as f32;
        if would_be > MAX_WEIGHT {
            return Err(ItemError::OverWeight {
                would_be,
                max: MAX_WEIGHT,
            });
        }

        if def.kind.stackable() {
            if let Some(slot) = self.slots.iter_mut().find(|s| s.item_id == id) {
                slot.quantity += quantity;
                return Ok(());
            }
        }

        if self.slots.len() >= MAX_SLOTS {
            return Err(ItemError::InventoryFull);
        }
        self.slots.push(InventorySlot {
            item_id: id.to_string(),
            quantity,
        });
        Ok(())
    }

    /// Remove a quantity of an item from a single stack.
    pub fn remove_item(&mut self, id: &str, quantity: u32) -> Result<(), ItemError> {
        let index = self
            .slots
            .iter()
            .position(|s| s.item_id == id && s.quantity >= quantity)
            .ok_or_else(|| ItemError::NotCarried(id.to_string()))?;

        self.slots[index].quantity -= quantity;
        if self.slots[index].quantity == 0 {
            self.slots.remove(index);
        }
        Ok(())
    }

    /// Consume one of a usable item, applying its effect to the player.
    pub fn use_item(
        &mut self,
        registry: &ItemRegistry,
        id: &str,
        stats: &mut PlayerStats,
    ) -> Result<(), ItemError> {
        if !self.has_item(id, 1) {
            return Err(ItemError::NotCarried(id.to_string()));
        }
        let def = registry
            .get(id)
            .ok_or_else(|| ItemError::UnknownItem(id.to_string()))?;
        let effect = def
            .use_effect
            .ok_or_else(|| ItemError::NotUsable(id.to_string()))?;

        match effect {
            UseEffect::RestoreHealth(amount) => stats.heal(amount),
            UseEffect::RestoreMana(amount) => stats.restore_mana(amount),
        }
        self.remove_item(id, 1)
    }

    /// Equip a carried item, swapping out whatever occupied its slot.
    pub fn equip_item(
        &mut self,
        registry: &ItemRegistry,
        id: &str,
        stats: &PlayerStats,
    ) -> Result<EquipSlot, ItemError> {
        if !self.has_item(id, 1) {
            return Err(ItemError::NotCarried(id.to_string()));
        }
        let def = registry
            .get(id)
            .ok_or_else(|| ItemError::UnknownItem(id.to_string()))?;

        let slot = equip_slot_for(def, &self.equipment)
            .ok_or_else(|| ItemError::NotEquippable(id.to_string()))?;

        if let Some(req) = &def.requirements {
            if !req.met_by(stats) {
                return Err(ItemError::RequirementsNotMet(id.to_string()));
            }
        }

        if let Some(previous) = self.equipment.get(&slot).cloned() {
            if let Err(err) = self.add_item(registry, &previous, 1) {
                warn!("Could not return '{}' to inventory: {}", previous, err);
            }
        }
        self.equipment.insert(slot, id.to_string());
        self.remove_item(id, 1)?;
        Ok(slot)
    }

    /// Return an equipped item to the inventory. Fails without change when
    /// the slot is empty or the inventory cannot take the item back.
    pub fn unequip_item(
        &mut self,
        registry: &ItemRegistry,
        slot: EquipSlot,
    ) -> Result<(), ItemError> {
        let id = self
            .equipment
            .get(&slot)
            .cloned()
            .ok_or_else(|| ItemError::NotCarried(slot.label().to_string()))?;

        self.add_item(registry, &id, 1)?;
        self.equipment.remove(&slot);
        Ok(())
    }

    /// Summed stat bonuses from everything equipped.
    pub fn equipment_bonuses(&self, registry: &ItemRegistry) -> ItemStats {
        let mut total = ItemStats::default();
        for id in self.equipment.values() {
            if let Some(stats) = registry.get(id).and_then(|d| d.stats.as_ref()) {
                total.add(stats);
            }
        }
        total
    }

    /// Buy items at full value.
    pub fn buy_item(
        &mut self,
        registry: &ItemRegistry,
        id: &str,
        quantity: u32,
        stats: &mut PlayerStats,
    ) -> Result<(), ItemError> {
        let def = registry
            .get(id)
            .ok_or_else(|| ItemError::UnknownItem(id.to_string()))?;

        let cost = def.value * quantity;
        if stats.gold < cost {
            return Err(ItemError::NotEnoughGold {
                cost,
                available: stats.gold,
            });
        }

        self.add_item(registry, id, quantity)?;
        stats.spend_gold(cost);
        Ok(())
    }

    /// Sell carried items for half their value.
    pub fn sell_item(
        &mut self,
        registry: &ItemRegistry,
        id: &str,
        quantity: u32,
        stats: &mut PlayerStats,
    ) -> Result<(), ItemError> {
        let def = registry
            .get(id)
            .ok_or_else(|| ItemError::UnknownItem(id.to_string()))?;
        if !self.has_item(id, quantity) {
            return Err(ItemError::NotCarried(id.to_string()));
        }

        self.remove_item(id, quantity)?;
        let proceeds = (def.value as f32 * SELL_VALUE_FRACTION * quantity as f32).floor() as u32;
        stats.add_gold(proceeds);
        Ok(())
    }
}

/// Which slot an item occupies. Armor infers helmet/boots from its id;
/// accessories fill the first free ring slot.
fn equip_slot_for(def: &ItemDef, equipment: &HashMap<EquipSlot, String>) -> Option<EquipSlot> {
    match def.kind {
        ItemKind::Weapon => Some(EquipSlot::Weapon),
        ItemKind::Armor => {
            if def.id.contains("helmet") {
                Some(EquipSlot::Helmet)
            } else if def.id.contains("boots") {
                Some(EquipSlot::Boots)
            } else {
                Some(EquipSlot::Armor)
            }
        }
        ItemKind::Accessory => {
            if equipment.contains_key(&EquipSlot::Accessory1) {
                Some(EquipSlot::Accessory2)
            } else {
                Some(EquipSlot::Accessory1)
            }
        }
        ItemKind::Consumable | ItemKind::Material => None,
    }
}

/// Load item definitions from assets/config/items.ron
pub fn load_item_registry() -> Result<ItemRegistry, DataLoadError> {
    let contents =
        std::fs::read_to_string(CONFIG_PATH).map_err(|e| DataLoadError::ReadError {
            path: CONFIG_PATH.to_string(),
            details: e.to_string(),
        })?;

    let config: ItemRegistryConfig =
        ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
            path: CONFIG_PATH.to_string(),
            details: e.to_string(),
        })?;

    let registry = ItemRegistry::new(config);

    registry
        .validate()
        .map_err(|missing| DataLoadError::MissingEntries {
            path: CONFIG_PATH.to_string(),
            missing,
        })?;

    info!("Loaded {} item definitions from {}", registry.len(), CONFIG_PATH);

    Ok(registry)
}

/// Bevy plugin for item definitions and the player inventory
pub struct ItemsPlugin;

impl Plugin for ItemsPlugin {
    fn build(&self, app: &mut App) {
        match load_item_registry() {
            Ok(registry) => {
                let inventory = Inventory::with_starting_items(&registry);
                app.insert_resource(registry).insert_resource(inventory);
            }
            Err(e) => {
                panic!("Failed to load item registry: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, kind: ItemKind, value: u32, weight: f32) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            kind,
            rarity: Rarity::Common,
            value,
            weight,
            stats: None,
            requirements: None,
            use_effect: None,
        }
    }

    fn registry() -> ItemRegistry {
        let mut potion = item("health_potion", ItemKind::Consumable, 25, 0.5);
        potion.use_effect = Some(UseEffect::RestoreHealth(50));
        let mut mana = item("mana_potion", ItemKind::Consumable, 30, 0.5);
        mana.use_effect = Some(UseEffect::RestoreMana(30.0));
        let mut staff = item("wooden_staff", ItemKind::Weapon, 50, 2.0);
        staff.requirements = Some(Requirements {
            level: 1,
            intelligence: 5,
            ..Default::default()
        });
        let mut heavy = item("anvil", ItemKind::Material, 5, 60.0);
        heavy.weight = 60.0;
        ItemRegistry::new(ItemRegistryConfig {
            items: vec![
                potion,
                mana,
                staff,
                item("cloth_robe", ItemKind::Armor, 40, 3.0),
                item("crystal_shard", ItemKind::Material, 10, 0.1),
                heavy,
            ],
        })
    }

    #[test]
    fn test_add_stacks_consumables() {
        let registry = registry();
        let mut inv = Inventory::default();
        inv.add_item(&registry, "health_potion", 2).unwrap();
        inv.add_item(&registry, "health_potion", 3).unwrap();
        assert_eq!(inv.quantity_of("health_potion"), 5);
        assert_eq!(inv.slots().len(), 1);
    }

    #[test]
    fn test_unknown_item_rejected() {
        let registry = registry();
        let mut inv = Inventory::default();
        assert!(matches!(
            inv.add_item(&registry, "sword_of_nonsense", 1),
            Err(ItemError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_weight_cap_rejects_without_mutation() {
        let registry = registry();
        let mut inv = Inventory::default();
        inv.add_item(&registry, "anvil", 1).unwrap();
        let err = inv.add_item(&registry, "anvil", 1).unwrap_err();
        assert!(matches!(err, ItemError::OverWeight { .. }));
        assert_eq!(inv.quantity_of("anvil"), 1);
    }

    #[test]
    fn test_use_potion_heals_and_consumes() {
        let registry = registry();
        let mut inv = Inventory::default();
        let mut stats = PlayerStats::default();
        stats.take_damage(60);
        inv.add_item(&registry, "health_potion", 1).unwrap();

        inv.use_item(&registry, "health_potion", &mut stats).unwrap();
        assert_eq!(stats.health, 90);
        assert_eq!(inv.quantity_of("health_potion"), 0);
    }

    #[test]
    fn test_use_rejects_non_consumable() {
        let registry = registry();
        let mut inv = Inventory::default();
        let mut stats = PlayerStats::default();
        inv.add_item(&registry, "wooden_staff", 1).unwrap();
        assert!(matches!(
            inv.use_item(&registry, "wooden_staff", &mut stats),
            Err(ItemError::NotUsable(_))
        ));
        assert_eq!(inv.quantity_of("wooden_staff"), 1);
    }

    #[test]
    fn test_equip_and_swap() {
        let registry = registry();
        let mut inv = Inventory::default();
        let stats = PlayerStats::default();
        inv.add_item(&registry, "wooden_staff", 1).unwrap();

        let slot = inv.equip_item(&registry, "wooden_staff", &stats).unwrap();
        assert_eq!(slot, EquipSlot::Weapon);
        assert_eq!(inv.equipped(EquipSlot::Weapon), Some("wooden_staff"));
        assert_eq!(inv.quantity_of("wooden_staff"), 0);

        inv.unequip_item(&registry, EquipSlot::Weapon).unwrap();
        assert_eq!(inv.equipped(EquipSlot::Weapon), None);
        assert_eq!(inv.quantity_of("wooden_staff"), 1);
    }

    #[test]
    fn test_equip_requirements_gate() {
        let registry = registry();
        let mut inv = Inventory::default();
        let stats = PlayerStats {
            intelligence: 3,
            ..Default::default()
        };
        inv.add_item(&registry, "wooden_staff", 1).unwrap();
        assert!(matches!(
            inv.equip_item(&registry, "wooden_staff", &stats),
            Err(ItemError::RequirementsNotMet(_))
        ));
        assert_eq!(inv.quantity_of("wooden_staff"), 1);
    }

    #[test]
    fn test_buy_and_sell_round() {
        let registry = registry();
        let mut inv = Inventory::default();
        let mut stats = PlayerStats::default();

        inv.buy_item(&registry, "health_potion", 2, &mut stats).unwrap();
        assert_eq!(stats.gold, 50);
        assert_eq!(inv.quantity_of("health_potion"), 2);

        inv.sell_item(&registry, "health_potion", 2, &mut stats).unwrap();
        // sells at half value
        assert_eq!(stats.gold, 75);
        assert_eq!(inv.quantity_of("health_potion"), 0);
    }

    #[test]
    fn test_buy_rejects_overdraft() {
        let registry = registry();
        let mut inv = Inventory::default();
        let mut stats = PlayerStats {
            gold: 10,
            ..Default::default()
        };
        assert!(matches!(
            inv.buy_item(&registry, "health_potion", 1, &mut stats),
            Err(ItemError::NotEnoughGold { .. })
        ));
        assert_eq!(stats.gold, 10);
        assert!(inv.slots().is_empty());
    }
}
