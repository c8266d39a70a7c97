//! SQLite store holding the MetaNetX-derived reaction and compound tables.

use crate::domain::model::{Annotation, CompoundRecord, ReactionName};
use crate::utils::error::{EtlError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS namespace (
        id INTEGER PRIMARY KEY,
        prefix TEXT NOT NULL UNIQUE,
        name TEXT
    )",
    "CREATE TABLE IF NOT EXISTS compound (
        id INTEGER PRIMARY KEY,
        mnx_id TEXT,
        inchi TEXT,
        inchi_key TEXT,
        smiles TEXT,
        chemical_formula TEXT,
        mass REAL,
        charge INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS compound_annotation (
        id INTEGER PRIMARY KEY,
        compound_id INTEGER NOT NULL REFERENCES compound (id),
        namespace_id INTEGER NOT NULL REFERENCES namespace (id),
        identifier TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reaction (
        id INTEGER PRIMARY KEY,
        mnx_id TEXT
    )",
    "CREATE TABLE IF NOT EXISTS reaction_annotation (
        id INTEGER PRIMARY KEY,
        reaction_id INTEGER NOT NULL REFERENCES reaction (id),
        namespace_id INTEGER NOT NULL REFERENCES namespace (id),
        identifier TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reaction_name (
        id INTEGER PRIMARY KEY,
        reaction_id INTEGER NOT NULL REFERENCES reaction (id),
        namespace_id INTEGER REFERENCES namespace (id),
        name TEXT NOT NULL
    )",
];

const COMPOUND_COLUMNS: &str =
    "id, mnx_id, inchi, inchi_key, smiles, chemical_formula, mass, charge";

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // 每條 in-memory 連線都是獨立的資料庫
        let in_memory = url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 4 });
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the tables that do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ── Namespaces ──────────────────────────────────────────────────────────

    pub async fn namespace_id(&self, prefix: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM namespace WHERE prefix = ?")
            .bind(prefix)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| EtlError::NotFound {
                entity: "namespace".to_string(),
                key: prefix.to_string(),
            })
    }

    pub async fn insert_namespace(&self, prefix: &str, name: Option<&str>) -> Result<i64> {
        let result = sqlx::query("INSERT INTO namespace (prefix, name) VALUES (?, ?)")
            .bind(prefix)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    // ── Reactions ───────────────────────────────────────────────────────────

    pub async fn insert_reaction(&self, mnx_id: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO reaction (mnx_id) VALUES (?)")
            .bind(mnx_id)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_reaction_annotation(
        &self,
        reaction_id: i64,
        namespace_id: i64,
        identifier: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO reaction_annotation (reaction_id, namespace_id, identifier) VALUES (?, ?, ?)",
        )
        .bind(reaction_id)
        .bind(namespace_id)
        .bind(identifier)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Reactions annotated in the given namespace, ordered by reaction.
    pub async fn reaction_annotations(&self, namespace_id: i64) -> Result<Vec<Annotation>> {
        let rows = sqlx::query_as::<_, Annotation>(
            "SELECT reaction.id AS entity_id, reaction_annotation.identifier AS identifier
             FROM reaction
             JOIN reaction_annotation ON reaction_annotation.reaction_id = reaction.id
             WHERE reaction_annotation.namespace_id = ?
             ORDER BY reaction.id, reaction_annotation.id",
        )
        .bind(namespace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert one batch of names and commit it.
    pub async fn insert_reaction_names(&self, names: &[ReactionName]) -> Result<usize> {
        if names.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        for name in names {
            sqlx::query(
                "INSERT INTO reaction_name (reaction_id, namespace_id, name) VALUES (?, ?, ?)",
            )
            .bind(name.reaction_id)
            .bind(name.namespace_id)
            .bind(&name.name)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(names.len())
    }

    pub async fn reaction_names(&self, reaction_id: i64) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM reaction_name WHERE reaction_id = ? ORDER BY name",
        )
        .bind(reaction_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    // ── Compounds ───────────────────────────────────────────────────────────

    pub async fn insert_compound(&self, mnx_id: &str, inchi: Option<&str>) -> Result<i64> {
        let result = sqlx::query("INSERT INTO compound (mnx_id, inchi) VALUES (?, ?)")
            .bind(mnx_id)
            .bind(inchi)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_compound_annotation(
        &self,
        compound_id: i64,
        namespace_id: i64,
        identifier: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO compound_annotation (compound_id, namespace_id, identifier) VALUES (?, ?, ?)",
        )
        .bind(compound_id)
        .bind(namespace_id)
        .bind(identifier)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn compound(&self, id: i64) -> Result<CompoundRecord> {
        sqlx::query_as::<_, CompoundRecord>(&format!(
            "SELECT {} FROM compound WHERE id = ?",
            COMPOUND_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| EtlError::NotFound {
            entity: "compound".to_string(),
            key: id.to_string(),
        })
    }

    /// Compounds annotated in the namespace that still have no InChI.
    pub async fn compound_annotations_without_inchi(
        &self,
        namespace_id: i64,
    ) -> Result<Vec<Annotation>> {
        let rows = sqlx::query_as::<_, Annotation>(
            "SELECT compound.id AS entity_id, compound_annotation.identifier AS identifier
             FROM compound
             JOIN compound_annotation ON compound_annotation.compound_id = compound.id
             WHERE compound_annotation.namespace_id = ?
               AND (compound.inchi IS NULL OR compound.inchi = '')
             ORDER BY compound.id, compound_annotation.id",
        )
        .bind(namespace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_compounds_with_inchi(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM compound WHERE inchi IS NOT NULL AND inchi != ''",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Keyset page of compounds with an InChI, starting after `after_id`.
    pub async fn compounds_with_inchi(
        &self,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<CompoundRecord>> {
        let rows = sqlx::query_as::<_, CompoundRecord>(&format!(
            "SELECT {} FROM compound
             WHERE inchi IS NOT NULL AND inchi != '' AND id > ?
             ORDER BY id
             LIMIT ?",
            COMPOUND_COLUMNS
        ))
        .bind(after_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Set InChIs for one batch of compounds and commit.
    pub async fn set_compound_inchis(&self, inchis: &[(i64, String)]) -> Result<usize> {
        if inchis.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        for (compound_id, inchi) in inchis {
            sqlx::query("UPDATE compound SET inchi = ? WHERE id = ?")
                .bind(inchi)
                .bind(compound_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(inchis.len())
    }

    /// Write the structural fields of one batch of compounds and commit.
    pub async fn update_compound_structures(&self, compounds: &[CompoundRecord]) -> Result<usize> {
        if compounds.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        for compound in compounds {
            sqlx::query(
                "UPDATE compound
                 SET inchi_key = ?, smiles = ?, chemical_formula = ?, mass = ?, charge = ?
                 WHERE id = ?",
            )
            .bind(&compound.inchi_key)
            .bind(&compound.smiles)
            .bind(&compound.chemical_formula)
            .bind(compound.mass)
            .bind(compound.charge)
            .bind(compound.id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(compounds.len())
    }
}
