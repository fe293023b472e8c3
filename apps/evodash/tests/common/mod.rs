//! Shared fixtures: a small source database on disk.

#![allow(dead_code)]

use evodash::config::Config;
use rusqlite::{Connection, params};
use std::path::PathBuf;
use tempfile::TempDir;

const SCHEMA_SQL: &str = "
    CREATE TABLE pokemon (id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE pokemon_stats (pokemon_id INTEGER, stat_name TEXT, base_stat INTEGER);
    CREATE TABLE evolution (chain_id INTEGER, from_species TEXT, to_species TEXT, trigger TEXT);
";

/// Charmander line, Magikarp, Oddish branch, plus one edge to an unknown name.
const DATA: &[(i64, &str, i64)] = &[
    (1, "Charmander", 309),
    (2, "Charmeleon", 405),
    (3, "Charizard", 534),
    (4, "Magikarp", 200),
    (5, "Gyarados", 540),
    (6, "Oddish", 320),
    (7, "Gloom", 395),
    (8, "Vileplume", 490),
];

const EDGES: &[(i64, &str, &str, Option<&str>)] = &[
    (2, "Charmander", "Charmeleon", Some("level-up")),
    (2, "Charmeleon", "Charizard", Some("level-up")),
    (7, "Magikarp", "Gyarados", Some("level-up")),
    (18, "Oddish", "Gloom", Some("level-up")),
    (18, "Gloom", "Vileplume", Some("use-item")),
    (18, "Gloom", "Missingno", Some("trade")),
];

pub struct SourceDb {
    _dir: TempDir,
    pub path: PathBuf,
}

impl SourceDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pokemon_dw.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();

        let stats = ["hp", "attack", "defense", "special-attack", "special-defense", "speed"];
        for (id, name, total) in DATA {
            conn.execute("INSERT INTO pokemon (id, name) VALUES (?1, ?2)", params![id, name])
                .unwrap();
            let base = total / 6;
            for (i, stat) in stats.iter().enumerate() {
                let value = if i == 5 { total - base * 5 } else { base };
                conn.execute(
                    "INSERT INTO pokemon_stats (pokemon_id, stat_name, base_stat) VALUES (?1, ?2, ?3)",
                    params![id, stat, value],
                )
                .unwrap();
            }
        }
        for (chain, from, to, trigger) in EDGES {
            conn.execute(
                "INSERT INTO evolution (chain_id, from_species, to_species, trigger) VALUES (?1, ?2, ?3, ?4)",
                params![chain, from, to, trigger],
            )
            .unwrap();
        }

        Self { _dir: dir, path }
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.apply_flags(Some(self.path.clone()), None, None);
        config
    }
}
