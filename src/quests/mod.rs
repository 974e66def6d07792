//! Quest tracking
//!
//! Quests move available -> active -> completed. Progress is reported by
//! gameplay events (kills, pickups, area exploration); the quest log does
//! not know how the events were produced. Rewards are paid exactly once,
//! when the last objective completes.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::{CombatLog, CombatLogEventType};
use crate::entities::{Player, PlayerStats, StatKind};
use crate::items::{Inventory, ItemRegistry};
use crate::spells::{SpellBook, SpellLibrary};

/// What kind of action advances an objective.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ObjectiveKind {
    Kill,
    Collect,
    Talk,
    Explore,
    Craft,
}

/// Gate that must hold before a quest is offered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum QuestRequirement {
    Level(u32),
    CarriesItem(String),
    QuestCompleted(String),
    Stat { stat: StatRequirement, minimum: u32 },
}

/// A stat referenced by a quest requirement.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum StatRequirement {
    Strength,
    Intelligence,
    Dexterity,
}

impl StatRequirement {
    fn value_in(self, stats: &PlayerStats) -> u32 {
        match self {
            StatRequirement::Strength => stats.strength,
            StatRequirement::Intelligence => stats.intelligence,
            StatRequirement::Dexterity => stats.dexterity,
        }
    }
}

impl From<StatKind> for StatRequirement {
    fn from(kind: StatKind) -> Self {
        match kind {
            StatKind::Strength => StatRequirement::Strength,
            StatKind::Intelligence => StatRequirement::Intelligence,
            StatKind::Dexterity => StatRequirement::Dexterity,
        }
    }
}

/// Payout on quest completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum QuestReward {
    Experience(u32),
    Gold(u32),
    Item { id: String, quantity: u32 },
    Spell(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum QuestKind {
    Main,
    Side,
}

/// One trackable objective within a quest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub description: String,
    pub kind: ObjectiveKind,
    pub target: String,
    pub required: u32,
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub completed: bool,
}

impl Objective {
    fn advance(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.required);
        if self.current >= self.required {
            self.completed = true;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: QuestKind,
    pub requirements: Vec<QuestRequirement>,
    pub rewards: Vec<QuestReward>,
    pub objectives: Vec<Objective>,
}

impl Quest {
    fn is_complete(&self) -> bool {
        self.objectives.iter().all(|o| o.completed)
    }
}

/// Event reporting quest-relevant progress from gameplay.
#[derive(Event, Debug, Clone)]
pub struct QuestProgressEvent {
    pub kind: ObjectiveKind,
    pub target: String,
    pub amount: u32,
}

/// Resource tracking every quest's lifecycle state.
#[derive(Resource, Default, Clone, Debug, Serialize, Deserialize)]
pub struct QuestLog {
    /// Quests not yet offered because their requirements fail.
    pending: Vec<Quest>,
    available: Vec<Quest>,
    active: Vec<Quest>,
    completed: Vec<String>,
}

impl QuestLog {
    /// A log seeded with the built-in quest table. Requirement gating is
    /// evaluated on the first `refresh_available` call.
    pub fn with_default_quests() -> Self {
        Self {
            pending: default_quest_table(),
            ..Default::default()
        }
    }

    pub fn available(&self) -> &[Quest] {
        &self.available
    }

    pub fn active(&self) -> &[Quest] {
        &self.active
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.iter().any(|c| c == id)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.iter().any(|q| q.id == id)
    }

    fn requirements_met(&self, quest: &Quest, stats: &PlayerStats, inventory: &Inventory) -> bool {
        quest.requirements.iter().all(|req| match req {
            QuestRequirement::Level(level) => stats.level >= *level,
            QuestRequirement::CarriesItem(id) => inventory.has_item(id, 1),
            QuestRequirement::QuestCompleted(id) => self.is_completed(id),
            QuestRequirement::Stat { stat, minimum } => stat.value_in(stats) >= *minimum,
        })
    }

    /// Move newly unlocked quests from pending to available.
    pub fn refresh_available(&mut self, stats: &PlayerStats, inventory: &Inventory) {
        let mut index = 0;
        while index < self.pending.len() {
            if self.requirements_met(&self.pending[index], stats, inventory) {
                let quest = self.pending.remove(index);
                info!("New quest available: {}", quest.title);
                self.available.push(quest);
            } else {
                index += 1;
            }
        }
    }

    /// Accept an available quest. Returns false when the id isn't offered.
    pub fn accept(&mut self, id: &str) -> bool {
        let Some(index) = self.available.iter().position(|q| q.id == id) else {
            return false;
        };
        let quest = self.available.remove(index);
        info!("Accepted quest: {}", quest.title);
        self.active.push(quest);
        true
    }

    /// Advance matching objectives on every active quest. Returns the
    /// quests that completed as a result, already moved to the completed
    /// set; the caller pays their rewards.
    pub fn report_progress(
        &mut self,
        kind: ObjectiveKind,
        target: &str,
        amount: u32,
    ) -> Vec<Quest> {
        for quest in &mut self.active {
            for objective in &mut quest.objectives {
                if objective.kind == kind && objective.target == target && !objective.completed {
                    objective.advance(amount);
                }
            }
        }

        let mut finished = Vec::new();
        let mut index = 0;
        while index < self.active.len() {
            if self.active[index].is_complete() {
                let quest = self.active.remove(index);
                self.completed.push(quest.id.clone());
                finished.push(quest);
            } else {
                index += 1;
            }
        }
        finished
    }
}

/// Apply reported progress and pay out completed quests.
#[allow(clippy::too_many_arguments)]
pub fn apply_quest_progress(
    mut events: EventReader<QuestProgressEvent>,
    mut quest_log: ResMut<QuestLog>,
    mut player: Query<&mut PlayerStats, With<Player>>,
    items: Res<ItemRegistry>,
    mut inventory: ResMut<Inventory>,
    library: Res<SpellLibrary>,
    mut book: ResMut<SpellBook>,
    mut log: ResMut<CombatLog>,
) {
    let Ok(mut stats) = player.get_single_mut() else {
        return;
    };

    for event in events.read() {
        for quest in quest_log.report_progress(event.kind, &event.target, event.amount) {
            log.log(
                CombatLogEventType::RunEvent,
                format!("Quest completed: {}", quest.title),
            );
            for reward in &quest.rewards {
                match reward {
                    QuestReward::Experience(amount) => {
                        stats.gain_experience(*amount);
                    }
                    QuestReward::Gold(amount) => stats.add_gold(*amount),
                    QuestReward::Item { id, quantity } => {
                        if let Err(err) = inventory.add_item(&items, id, *quantity) {
                            warn!("Quest reward '{}' not granted: {}", id, err);
                        }
                    }
                    QuestReward::Spell(id) => match library.get(id) {
                        Some(spell) => {
                            book.learn(spell.clone());
                        }
                        None => warn!("Quest reward spell '{}' unknown", id),
                    },
                }
            }
        }
    }

    quest_log.refresh_available(&stats, &inventory);
}

/// The built-in quest table.
pub fn default_quest_table() -> Vec<Quest> {
    vec![
        Quest {
            id: "goblin_problem".to_string(),
            title: "The Goblin Problem".to_string(),
            description: "The village is being harassed by goblins. Clear them out!".to_string(),
            kind: QuestKind::Side,
            requirements: vec![QuestRequirement::Level(3)],
            rewards: vec![QuestReward::Experience(100), QuestReward::Gold(75)],
            objectives: vec![Objective {
                id: "kill_goblins".to_string(),
                description: "Defeat 10 goblins".to_string(),
                kind: ObjectiveKind::Kill,
                target: "goblin".to_string(),
                required: 10,
                current: 0,
                completed: false,
            }],
        },
        Quest {
            id: "castle_investigation".to_string(),
            title: "The Castle Mystery".to_string(),
            description: "Investigate the dark magic stirring beneath the castle.".to_string(),
            kind: QuestKind::Main,
            requirements: vec![],
            rewards: vec![
                QuestReward::Experience(200),
                QuestReward::Gold(150),
                QuestReward::Item {
                    id: "crystal_staff".to_string(),
                    quantity: 1,
                },
            ],
            objectives: vec![
                Objective {
                    id: "enter_dungeon".to_string(),
                    description: "Enter the castle dungeons".to_string(),
                    kind: ObjectiveKind::Explore,
                    target: "dungeon".to_string(),
                    required: 1,
                    current: 0,
                    completed: false,
                },
                Objective {
                    id: "explore_levels".to_string(),
                    description: "Explore 3 dungeon levels".to_string(),
                    kind: ObjectiveKind::Explore,
                    target: "dungeon_level".to_string(),
                    required: 3,
                    current: 0,
                    completed: false,
                },
            ],
        },
        Quest {
            id: "herb_collection".to_string(),
            title: "Herb Collection".to_string(),
            description: "Gather rare herbs for the village healer.".to_string(),
            kind: QuestKind::Side,
            requirements: vec![],
            rewards: vec![
                QuestReward::Experience(50),
                QuestReward::Item {
                    id: "greater_health_potion".to_string(),
                    quantity: 3,
                },
            ],
            objectives: vec![Objective {
                id: "collect_herbs".to_string(),
                description: "Collect 5 healing herbs".to_string(),
                kind: ObjectiveKind::Collect,
                target: "healing_herb".to_string(),
                required: 5,
                current: 0,
                completed: false,
            }],
        },
        Quest {
            id: "dungeon_cleansing".to_string(),
            title: "Cleansing the Darkness".to_string(),
            description: "Purge the castle dungeons of all dark creatures.".to_string(),
            kind: QuestKind::Main,
            requirements: vec![QuestRequirement::QuestCompleted(
                "castle_investigation".to_string(),
            )],
            rewards: vec![
                QuestReward::Experience(500),
                QuestReward::Gold(300),
                QuestReward::Spell("greater_heal".to_string()),
            ],
            objectives: vec![
                Objective {
                    id: "clear_skeletons".to_string(),
                    description: "Defeat 20 skeletons".to_string(),
                    kind: ObjectiveKind::Kill,
                    target: "skeleton".to_string(),
                    required: 20,
                    current: 0,
                    completed: false,
                },
                Objective {
                    id: "clear_wraiths".to_string(),
                    description: "Defeat 5 shadow wraiths".to_string(),
                    kind: ObjectiveKind::Kill,
                    target: "shadow_wraith".to_string(),
                    required: 5,
                    current: 0,
                    completed: false,
                },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_quest(id: &str, required: u32) -> Quest {
        Quest {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            kind: QuestKind::Side,
            requirements: vec![],
            rewards: vec![QuestReward::Gold(10)],
            objectives: vec![Objective {
                id: "obj".to_string(),
                description: String::new(),
                kind: ObjectiveKind::Kill,
                target: "goblin".to_string(),
                required,
                current: 0,
                completed: false,
            }],
        }
    }

    #[test]
    fn test_kill_progress_completes_quest_once() {
        let mut log = QuestLog {
            pending: vec![simple_quest("q", 2)],
            ..Default::default()
        };
        let stats = PlayerStats::default();
        let inventory = Inventory::default();
        log.refresh_available(&stats, &inventory);
        assert!(log.accept("q"));

        assert!(log.report_progress(ObjectiveKind::Kill, "goblin", 1).is_empty());
        let finished = log.report_progress(ObjectiveKind::Kill, "goblin", 1);
        assert_eq!(finished.len(), 1);
        assert!(log.is_completed("q"));

        // further progress is inert
        assert!(log.report_progress(ObjectiveKind::Kill, "goblin", 1).is_empty());
    }

    #[test]
    fn test_progress_ignores_other_targets_and_kinds() {
        let mut log = QuestLog {
            pending: vec![simple_quest("q", 1)],
            ..Default::default()
        };
        log.refresh_available(&PlayerStats::default(), &Inventory::default());
        log.accept("q");

        assert!(log.report_progress(ObjectiveKind::Kill, "orc", 1).is_empty());
        assert!(log
            .report_progress(ObjectiveKind::Collect, "goblin", 1)
            .is_empty());
        assert!(!log.is_completed("q"));
    }

    #[test]
    fn test_level_requirement_gates_availability() {
        let mut quest = simple_quest("gated", 1);
        quest.requirements = vec![QuestRequirement::Level(3)];
        let mut log = QuestLog {
            pending: vec![quest],
            ..Default::default()
        };

        let mut stats = PlayerStats::default();
        let inventory = Inventory::default();
        log.refresh_available(&stats, &inventory);
        assert!(log.available().is_empty());

        stats.level = 3;
        log.refresh_available(&stats, &inventory);
        assert_eq!(log.available().len(), 1);
    }

    #[test]
    fn test_quest_chain_unlocks_on_completion() {
        let mut follow_up = simple_quest("second", 1);
        follow_up.requirements = vec![QuestRequirement::QuestCompleted("first".to_string())];
        let mut log = QuestLog {
            pending: vec![simple_quest("first", 1), follow_up],
            ..Default::default()
        };
        let stats = PlayerStats::default();
        let inventory = Inventory::default();

        log.refresh_available(&stats, &inventory);
        assert_eq!(log.available().len(), 1);
        log.accept("first");
        log.report_progress(ObjectiveKind::Kill, "goblin", 1);

        log.refresh_available(&stats, &inventory);
        assert_eq!(log.available().len(), 1);
        assert_eq!(log.available()[0].id, "second");
    }

    #[test]
    fn test_accept_unknown_quest_is_rejected() {
        let mut log = QuestLog::default();
        assert!(!log.accept("nope"));
    }
}
