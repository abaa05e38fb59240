#![deny(warnings)]

//! Static game tables loaded from YAML.
//!
//! A catalog is a set of YAML documents, each holding any subset of the
//! [`Tables`] sections (`realms`, `tribulations`, `items`, `recipes`,
//! `companions`, `rewards`, `unlocks`, `longevity_rules`, `talents`, `titles`,
//! `arts`). Documents are merged in file-name order; a later key replaces an
//! earlier one.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use ascend_core::{DataIntegrityWarning, Payoff, Realm, Tables};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error reading {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("invalid catalog document {file}: {message}")]
    Parse { file: String, message: String },
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

const BUILTIN: [(&str, &str); 5] = [
    (
        "companions.yaml",
        include_str!("../../../assets/catalog/companions.yaml"),
    ),
    ("items.yaml", include_str!("../../../assets/catalog/items.yaml")),
    (
        "modifiers.yaml",
        include_str!("../../../assets/catalog/modifiers.yaml"),
    ),
    ("realms.yaml", include_str!("../../../assets/catalog/realms.yaml")),
    (
        "rewards.yaml",
        include_str!("../../../assets/catalog/rewards.yaml"),
    ),
];

/// Parse one catalog document.
pub fn parse(file: &str, text: &str) -> Result<Tables, CatalogError> {
    serde_yaml::from_str(text).map_err(|e| CatalogError::Parse {
        file: file.to_string(),
        message: e.to_string(),
    })
}

/// Fold `part` into `into`. Keyed entries replace, realm rows replace by realm.
pub fn merge(into: &mut Tables, part: Tables) {
    for def in part.realms {
        match into.realms.iter_mut().find(|d| d.realm == def.realm) {
            Some(slot) => *slot = def,
            None => into.realms.push(def),
        }
    }
    into.realms.sort_by_key(|d| d.realm);
    into.tribulations.extend(part.tribulations);
    into.items.extend(part.items);
    into.companions.extend(part.companions);
    into.rewards.extend(part.rewards);
    into.unlocks.extend(part.unlocks);
    into.talents.extend(part.talents);
    into.titles.extend(part.titles);
    into.arts.extend(part.arts);
    into.recipes.extend(part.recipes);
    for rule in part.longevity_rules {
        if !into.longevity_rules.contains(&rule) {
            into.longevity_rules.push(rule);
        }
    }
}

/// The catalog compiled into the binary.
pub fn builtin() -> Result<Tables, CatalogError> {
    let mut tables = Tables::default();
    for (file, text) in BUILTIN {
        merge(&mut tables, parse(file, text)?);
    }
    Ok(tables)
}

/// Load every `*.yaml` / `*.yml` file in `dir`, in file-name order.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Tables, CatalogError> {
    let dir = dir.as_ref();
    let io_err = |path: &Path, e: std::io::Error| CatalogError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if path.is_file() && is_yaml {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(CatalogError::Invalid(format!(
            "no catalog documents in {}",
            dir.display()
        )));
    }

    let mut tables = Tables::default();
    for path in &files {
        let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        merge(&mut tables, parse(&name, &text)?);
    }
    info!(dir = %dir.display(), files = files.len(), "catalog loaded");
    Ok(tables)
}

/// Check a merged catalog.
///
/// Structural problems that would make progression meaningless are errors.
/// Dangling references are returned as warnings; the reducers fall back
/// when they meet them at runtime.
pub fn validate(tables: &Tables) -> Result<Vec<DataIntegrityWarning>, CatalogError> {
    for realm in Realm::ALL {
        let Some(def) = tables.realm(realm) else {
            return Err(CatalogError::Invalid(format!("realm {realm} has no definition")));
        };
        if def.base_experience == 0 {
            return Err(CatalogError::Invalid(format!(
                "realm {realm} needs a positive base experience"
            )));
        }
    }
    for (realm, t) in &tables.tribulations {
        if !(0.0..=1.0).contains(&t.base_success) {
            return Err(CatalogError::Invalid(format!(
                "tribulation into {realm}: base_success {} outside [0, 1]",
                t.base_success
            )));
        }
        if t.hp_loss_min > t.hp_loss_max {
            return Err(CatalogError::Invalid(format!(
                "tribulation into {realm}: hp_loss_min exceeds hp_loss_max"
            )));
        }
    }

    let mut warnings = Vec::new();
    for (key, table) in &tables.rewards {
        if table.is_empty() {
            warnings.push(DataIntegrityWarning::new("reward", key, "draws rejected"));
        } else if table.total_weight() == 0 {
            warnings.push(DataIntegrityWarning::new(
                "reward",
                key,
                "all weights zero; first entry always wins",
            ));
        }
        for entry in &table.entries {
            match &entry.payoff {
                Payoff::Item { template, .. } if tables.item(template).is_none() => {
                    warnings.push(DataIntegrityWarning::new("item", template, "payoff skipped"));
                }
                Payoff::Companion { template } if tables.companion(template).is_none() => {
                    warnings.push(DataIntegrityWarning::new(
                        "companion",
                        template,
                        "payoff skipped",
                    ));
                }
                Payoff::SingletonUnlock { unlock, .. }
                    if tables.unlocks.get(unlock).map_or(true, Vec::is_empty) =>
                {
                    warnings.push(DataIntegrityWarning::new(
                        "unlock",
                        unlock.to_string(),
                        "paid out as currency",
                    ));
                }
                Payoff::LongevityRule { .. } if tables.longevity_rules.is_empty() => {
                    warnings.push(DataIntegrityWarning::new(
                        "longevity_rule",
                        key,
                        "paid out as currency",
                    ));
                }
                _ => {}
            }
        }
    }
    for (key, recipe) in &tables.recipes {
        if tables.item(&recipe.output).is_none() {
            warnings.push(DataIntegrityWarning::new("item", &recipe.output, "recipe output missing"));
        }
        for ingredient in &recipe.ingredients {
            if tables.item_key_by_name(&ingredient.name).is_none() {
                warnings.push(DataIntegrityWarning::new(
                    "item",
                    &ingredient.name,
                    "ingredient cannot be obtained",
                ));
            }
        }
        if !tables
            .items
            .values()
            .any(|t| t.teaches.as_deref() == Some(key.as_str()))
        {
            warnings.push(DataIntegrityWarning::new("recipe", key, "never taught"));
        }
    }
    for (key, item) in &tables.items {
        if let Some(recipe) = &item.teaches {
            if !tables.recipes.contains_key(recipe) {
                warnings.push(DataIntegrityWarning::new(
                    "recipe",
                    recipe,
                    "recipe item teaches nothing craftable",
                ));
            }
        }
        if item.category == ascend_core::ItemCategory::Equipment && item.slot.is_none() {
            warnings.push(DataIntegrityWarning::new("item", key, "equipment without a slot"));
        }
    }
    for w in &warnings {
        warn!(table = w.table, key = %w.key, "catalog reference unresolved");
    }
    Ok(warnings)
}
