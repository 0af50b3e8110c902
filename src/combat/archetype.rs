//! Bird archetypes and their base stats
//!
//! The stats table is static input data: a built-in default ships with the
//! crate and `data/archetypes.toml` can override it.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};
use crate::core::types::Seconds;

/// Bird kinds available in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Balanced,
    Speed,
    Power,
    Trickster,
    Tank,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Balanced,
        Archetype::Speed,
        Archetype::Power,
        Archetype::Trickster,
        Archetype::Tank,
    ];

    /// Display name of the bird behind the archetype
    pub fn bird_name(&self) -> &'static str {
        match self {
            Archetype::Balanced => "Robin",
            Archetype::Speed => "Hummingbird",
            Archetype::Power => "Eagle",
            Archetype::Trickster => "Crow",
            Archetype::Tank => "Pelican",
        }
    }

    /// Parse a lowercase archetype tag ("balanced", "speed", ...)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "balanced" => Some(Archetype::Balanced),
            "speed" => Some(Archetype::Speed),
            "power" => Some(Archetype::Power),
            "trickster" => Some(Archetype::Trickster),
            "tank" => Some(Archetype::Tank),
            _ => None,
        }
    }
}

/// Base stats for one archetype, fixed for a battle's duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub max_health: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    pub ability_cooldown: Seconds,
    pub ability_damage: f32,
    /// Max distance at which an ability hit connects
    pub ability_range: f32,
}

impl BaseStats {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_health <= 0.0 {
            return Err(format!("max_health ({}) must be positive", self.max_health));
        }
        if self.attack < 0.0 || self.defense < 0.0 || self.speed < 0.0 {
            return Err("attack, defense and speed must be non-negative".into());
        }
        if self.ability_cooldown <= 0.0 {
            return Err(format!(
                "ability_cooldown ({}) must be positive",
                self.ability_cooldown
            ));
        }
        if self.ability_damage <= 0.0 {
            return Err(format!(
                "ability_damage ({}) must be positive",
                self.ability_damage
            ));
        }
        if self.ability_range <= 0.0 {
            return Err(format!("ability_range ({}) must be positive", self.ability_range));
        }
        Ok(())
    }
}

/// One row of the TOML stats file
#[derive(Debug, Deserialize)]
struct ArchetypeRow {
    kind: Archetype,
    #[serde(flatten)]
    stats: BaseStats,
}

#[derive(Debug, Deserialize)]
struct ArchetypeFile {
    #[serde(default)]
    archetypes: Vec<ArchetypeRow>,
}

/// Lookup table from archetype to base stats
#[derive(Debug, Clone, Default)]
pub struct ArchetypeTable {
    stats: AHashMap<Archetype, BaseStats>,
}

impl ArchetypeTable {
    /// Empty table (every lookup fails until rows are inserted)
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in balance table
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(
            Archetype::Balanced,
            BaseStats {
                max_health: 100.0,
                attack: 12.0,
                defense: 10.0,
                speed: 10.0,
                ability_cooldown: 8.0,
                ability_damage: 20.0,
                ability_range: 120.0,
            },
        );
        table.insert(
            Archetype::Speed,
            BaseStats {
                max_health: 80.0,
                attack: 10.0,
                defense: 6.0,
                speed: 16.0,
                ability_cooldown: 6.0,
                ability_damage: 6.0,
                ability_range: 100.0,
            },
        );
        table.insert(
            Archetype::Power,
            BaseStats {
                max_health: 120.0,
                attack: 18.0,
                defense: 12.0,
                speed: 7.0,
                ability_cooldown: 10.0,
                ability_damage: 30.0,
                ability_range: 150.0,
            },
        );
        table.insert(
            Archetype::Trickster,
            BaseStats {
                max_health: 90.0,
                attack: 11.0,
                defense: 8.0,
                speed: 12.0,
                ability_cooldown: 9.0,
                ability_damage: 15.0,
                ability_range: 120.0,
            },
        );
        table.insert(
            Archetype::Tank,
            BaseStats {
                max_health: 150.0,
                attack: 9.0,
                defense: 18.0,
                speed: 5.0,
                ability_cooldown: 12.0,
                ability_damage: 22.0,
                ability_range: 100.0,
            },
        );
        table
    }

    pub fn insert(&mut self, archetype: Archetype, stats: BaseStats) {
        self.stats.insert(archetype, stats);
    }

    pub fn get(&self, archetype: Archetype) -> Result<&BaseStats> {
        self.stats
            .get(&archetype)
            .ok_or(ArenaError::UnknownArchetype(archetype))
    }

    pub fn contains(&self, archetype: Archetype) -> bool {
        self.stats.contains_key(&archetype)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Parse a table from TOML `[[archetypes]]` rows
    ///
    /// Rows replace built-in entries; archetypes not listed keep their
    /// built-in stats.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ArchetypeFile = toml::from_str(contents)?;
        let mut table = Self::builtin();
        for row in file.archetypes {
            row.stats.validate().map_err(|e| {
                ArenaError::InvalidConfig(format!("archetype {:?}: {}", row.kind, e))
            })?;
            table.insert(row.kind, row.stats);
        }
        Ok(table)
    }

    /// Load a stats table from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_archetype() {
        let table = ArchetypeTable::builtin();
        for archetype in Archetype::ALL {
            let stats = table.get(archetype).expect("builtin row");
            assert!(stats.validate().is_ok(), "{:?} stats invalid", archetype);
        }
    }

    #[test]
    fn test_missing_row_is_unknown_archetype() {
        let table = ArchetypeTable::new();
        assert!(matches!(
            table.get(Archetype::Tank),
            Err(ArenaError::UnknownArchetype(Archetype::Tank))
        ));
    }

    #[test]
    fn test_toml_row_overrides_builtin() {
        let toml = r#"
            [[archetypes]]
            kind = "power"
            max_health = 140.0
            attack = 20.0
            defense = 12.0
            speed = 7.0
            ability_cooldown = 10.0
            ability_damage = 30.0
            ability_range = 150.0
        "#;
        let table = ArchetypeTable::from_toml_str(toml).expect("valid table");
        assert_eq!(table.get(Archetype::Power).unwrap().max_health, 140.0);
        assert_eq!(table.get(Archetype::Balanced).unwrap().max_health, 100.0);
    }

    #[test]
    fn test_zero_cooldown_rejected() {
        let toml = r#"
            [[archetypes]]
            kind = "speed"
            max_health = 80.0
            attack = 10.0
            defense = 6.0
            speed = 16.0
            ability_cooldown = 0.0
            ability_damage = 6.0
            ability_range = 100.0
        "#;
        assert!(matches!(
            ArchetypeTable::from_toml_str(toml),
            Err(ArenaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(Archetype::from_tag("Trickster"), Some(Archetype::Trickster));
        assert_eq!(Archetype::from_tag("penguin"), None);
    }

    #[test]
    fn test_load_bundled_table() {
        let table = ArchetypeTable::load("data/archetypes.toml").expect("bundled table");
        assert_eq!(table.len(), Archetype::ALL.len());
    }
}
