use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// BiGG `database_version` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiggVersion {
    pub bigg_models_version: String,
    pub api_version: String,
    #[serde(deserialize_with = "deserialize_bigg_timestamp")]
    pub last_updated: NaiveDateTime,
}

fn deserialize_bigg_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f").map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiggUniversalReaction {
    pub bigg_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model_bigg_id: Option<String>,
}

/// BiGG `universal/reactions` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiggUniversalReactionResult {
    pub results_count: usize,
    pub results: Vec<BiggUniversalReaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeggInfo {
    pub text: String,
    pub release: Option<String>,
}

/// One line of a KEGG `list/<database>` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeggListEntry {
    pub identifier: String,
    pub description: String,
}

/// A cross-reference of a reaction or compound row in a namespace.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Annotation {
    pub entity_id: i64,
    pub identifier: String,
}

/// A KEGG flat file fetched for one identifier, with the rows annotated by it.
#[derive(Debug, Clone)]
pub struct FetchedEntry {
    pub identifier: String,
    pub entity_ids: Vec<i64>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionName {
    pub reaction_id: i64,
    pub namespace_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CompoundRecord {
    pub id: i64,
    pub mnx_id: Option<String>,
    pub inchi: Option<String>,
    pub inchi_key: Option<String>,
    pub smiles: Option<String>,
    pub chemical_formula: Option<String>,
    pub mass: Option<f64>,
    pub charge: Option<i64>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl CompoundRecord {
    /// All structural fields derived from the InChI are present.
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.inchi_key)
            && !is_blank(&self.smiles)
            && !is_blank(&self.chemical_formula)
            && self.mass.is_some()
            // 電荷 0 是有效值，只有 NULL 才算缺少
            && self.charge.is_some()
    }

    /// Fill only the missing fields. Returns whether anything changed.
    pub fn fill_missing(&mut self, description: &MoleculeDescription) -> bool {
        let mut changed = false;
        if is_blank(&self.inchi_key) {
            self.inchi_key = Some(description.inchi_key.clone());
            changed = true;
        }
        if is_blank(&self.smiles) {
            self.smiles = Some(description.smiles.clone());
            changed = true;
        }
        if is_blank(&self.chemical_formula) {
            self.chemical_formula = Some(description.chemical_formula.clone());
            changed = true;
        }
        if self.mass.is_none() {
            self.mass = Some(description.mass);
            changed = true;
        }
        if self.charge.is_none() {
            self.charge = Some(description.charge);
            changed = true;
        }
        changed
    }
}

/// Structural properties a toolkit derives from an InChI.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeDescription {
    pub inchi_key: String,
    pub smiles: String,
    pub chemical_formula: String,
    /// Average molecular mass in dalton.
    pub mass: f64,
    pub charge: i64,
}

/// A response body kept verbatim until the transform phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub body: String,
}

/// Items handed from one phase to the next, with how many inputs were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Extraction<T> {
    pub fn new(items: Vec<T>, skipped: usize) -> Self {
        Self { items, skipped }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub pipeline: String,
    pub extracted: usize,
    pub transformed: usize,
    pub loaded: usize,
    pub skipped: usize,
}
