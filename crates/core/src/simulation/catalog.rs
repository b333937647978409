//! Propellant catalog with alias groups
//!
//! Several powders are sold under different names (ADI manufactures for
//! Hodgdon, for example). The catalog keeps one entry per propellant and an
//! alias table mapping any known name to its group, so a lookup by a
//! sister-product name still finds the modeled propellant. The catalog is an
//! ordinary owned value; services that need it take it by reference.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::core_types::propellant::{PropellantParams, PropellantRecord};
use crate::error::InputError;

/// Lookup key: lowercase alphanumerics only, so "AR-2208" matches "ar2208"
fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Named propellants plus alias groups
#[derive(Debug, Clone, Default)]
pub struct PropellantCatalog {
    propellants: FxHashMap<String, PropellantParams>,
    aliases: FxHashMap<String, String>,
}

impl PropellantCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference propellants shipped with the engine
    ///
    /// Three extruded powders on the quadratic form function and one
    /// three-phase powder described by GRT-style curve data.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(PropellantParams::varget_like());
        catalog.insert(PropellantParams::h4350_like());
        catalog.insert(PropellantParams::imr4064_like());

        for record in builtin_records() {
            if let Err(e) = catalog.insert_record(&record) {
                warn!("Skipping built-in propellant '{}': {}", record.name, e);
            }
        }

        catalog.add_alias_group("Varget/AR2208", &["Varget-like", "Varget", "AR2208"]);
        catalog.add_alias_group("H4350/AR2217", &["H4350-like", "H4350", "AR2217"]);
        catalog.add_alias_group("IMR4064", &["IMR4064-like", "IMR 4064"]);
        catalog.add_alias_group("N140", &["N140-like", "N140", "Reloder 15", "RL-15"]);
        catalog
    }

    /// Add or replace a propellant, keyed by its name
    pub fn insert(&mut self, params: PropellantParams) {
        self.propellants.insert(normalize(&params.name), params);
    }

    /// Convert a boundary record and add it
    ///
    /// # Errors
    /// The conversion error; the catalog is left unchanged.
    pub fn insert_record(&mut self, record: &PropellantRecord) -> Result<(), InputError> {
        let params = PropellantParams::try_from(record)?;
        self.insert(params);
        Ok(())
    }

    /// Declare that all `names` belong to the same alias group
    pub fn add_alias_group(&mut self, group: &str, names: &[&str]) {
        for name in names {
            self.aliases.insert(normalize(name), group.to_string());
        }
    }

    /// Alias group a name belongs to
    pub fn alias_group(&self, name: &str) -> Option<&str> {
        self.aliases.get(&normalize(name)).map(String::as_str)
    }

    /// Look up by name, falling back to another member of the alias group
    pub fn get(&self, name: &str) -> Option<&PropellantParams> {
        if let Some(params) = self.propellants.get(&normalize(name)) {
            return Some(params);
        }
        let group = self.alias_group(name)?;
        self.iter()
            .find(|p| self.alias_group(&p.name) == Some(group))
    }

    /// Other catalog propellants in the same alias group
    pub fn equivalents(&self, name: &str) -> Vec<&PropellantParams> {
        let Some(group) = self.alias_group(name) else {
            return Vec::new();
        };
        let key = normalize(name);
        self.iter()
            .filter(|p| normalize(&p.name) != key && self.alias_group(&p.name) == Some(group))
            .collect()
    }

    /// All propellants, ordered by name
    pub fn iter(&self) -> impl Iterator<Item = &PropellantParams> {
        let mut all: Vec<&PropellantParams> = self.propellants.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all.into_iter()
    }

    pub fn len(&self) -> usize {
        self.propellants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.propellants.is_empty()
    }
}

fn builtin_records() -> Vec<PropellantRecord> {
    vec![PropellantRecord {
        name: "N140-like".to_string(),
        force_j_kg: 950e3,
        covolume_m3_kg: 0.001,
        burn_rate_coeff: 1.5e-8,
        burn_rate_exp: 0.86,
        gamma: 1.24,
        density_g_cm3: 1.6,
        flame_temp_k: 4050.0,
        web_thickness_m: Some(0.0004),
        theta: None,
        ba: Some(0.6),
        bp: Some(0.1995),
        br: Some(0.1310),
        brp: Some(0.1688),
        z1: Some(0.4296),
        z2: Some(0.8867),
    }]
}
