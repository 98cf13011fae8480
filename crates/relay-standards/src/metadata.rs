//! The loaded, fixed-up metadata catalog.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use relay_map::{MapperRegistry, default_registry};
use relay_model::{LookupTable, MapperRef, Schema, ValueSet};

use crate::csv_utils::read_table;
use crate::error::{Result, StandardsError};
use crate::fixup::{FixupContext, extend_schema, fixup_schema};
use crate::loaders::{list_files, load_schema, load_value_sets};
use crate::paths::{SCHEMAS_DIR, TABLES_DIR, VALUE_SETS_DIR, metadata_root};

/// Value sets, lookup tables and fixed-up schemas, keyed by name.
///
/// Value sets, tables and custom mappers must be added before the schemas
/// that use them. Once built the catalog is read-only and can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Metadata {
    value_sets: HashMap<String, Arc<ValueSet>>,
    tables: HashMap<String, Arc<LookupTable>>,
    schemas: HashMap<String, Arc<Schema>>,
    mappers: MapperRegistry,
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

impl Metadata {
    /// An empty catalog that knows the built-in mappers.
    pub fn new() -> Self {
        Self {
            value_sets: HashMap::new(),
            tables: HashMap::new(),
            schemas: HashMap::new(),
            mappers: default_registry().clone(),
        }
    }

    /// Loads the catalog from [`metadata_root`].
    pub fn load_default() -> Result<Self> {
        Self::load(&metadata_root())
    }

    /// Loads every value set, table and schema under `root`.
    ///
    /// # Errors
    ///
    /// Fails if `root` is missing, a file does not parse, or a schema does
    /// not fix up.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(StandardsError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        let mut metadata = Self::new();

        for path in list_files(&root.join(VALUE_SETS_DIR), "toml")? {
            for value_set in load_value_sets(&path)? {
                metadata.add_value_set(value_set)?;
            }
        }
        for path in list_files(&root.join(TABLES_DIR), "csv")? {
            metadata.add_table(read_table(&path)?)?;
        }
        let mut schemas = Vec::new();
        for path in list_files(&root.join(SCHEMAS_DIR), "toml")? {
            schemas.push(load_schema(&path)?);
        }
        metadata.add_schemas(schemas)?;

        tracing::debug!(
            root = %root.display(),
            value_sets = metadata.value_sets.len(),
            tables = metadata.tables.len(),
            schemas = metadata.schemas.len(),
            "loaded metadata"
        );
        Ok(metadata)
    }

    pub fn add_value_set(&mut self, value_set: ValueSet) -> Result<()> {
        if self.value_sets.contains_key(&value_set.name) {
            return Err(StandardsError::Duplicate {
                kind: "value set",
                name: value_set.name,
            });
        }
        self.value_sets
            .insert(value_set.name.clone(), Arc::new(value_set));
        Ok(())
    }

    pub fn add_table(&mut self, table: LookupTable) -> Result<()> {
        if self.tables.contains_key(&table.name) {
            return Err(StandardsError::Duplicate {
                kind: "table",
                name: table.name,
            });
        }
        self.tables.insert(table.name.clone(), Arc::new(table));
        Ok(())
    }

    /// Registers a mapper for schemas added after this call.
    pub fn register_mapper(&mut self, mapper: MapperRef) {
        self.mappers.register(mapper);
    }

    /// Fixes up a schema and adds it to the catalog.
    ///
    /// A schema that `extends` another is merged with it first; the base
    /// must already be in the catalog.
    pub fn add_schema(&mut self, schema: Schema) -> Result<()> {
        if self.schemas.contains_key(&schema.name) {
            return Err(StandardsError::Duplicate {
                kind: "schema",
                name: schema.name,
            });
        }
        let merged = match schema.extends.clone() {
            Some(base_name) => {
                let base = self.schemas.get(&base_name).ok_or_else(|| {
                    StandardsError::UnknownBaseSchema {
                        schema: schema.name.clone(),
                        base: base_name.clone(),
                    }
                })?;
                extend_schema(&schema, base)
            }
            None => schema,
        };
        let context = FixupContext {
            value_sets: &self.value_sets,
            tables: &self.tables,
            mappers: &self.mappers,
        };
        let fixed = fixup_schema(&merged, context)?;
        self.schemas.insert(fixed.name.clone(), Arc::new(fixed));
        Ok(())
    }

    /// Adds schemas in any order, adding each base before the schemas that extend it.
    pub fn add_schemas(&mut self, schemas: Vec<Schema>) -> Result<()> {
        let mut pending: HashMap<String, Schema> = HashMap::new();
        let mut order = Vec::with_capacity(schemas.len());
        for schema in schemas {
            if pending.contains_key(&schema.name) || self.schemas.contains_key(&schema.name) {
                return Err(StandardsError::Duplicate {
                    kind: "schema",
                    name: schema.name,
                });
            }
            order.push(schema.name.clone());
            pending.insert(schema.name.clone(), schema);
        }
        for name in order {
            self.add_pending(&name, &mut pending, &mut Vec::new())?;
        }
        Ok(())
    }

    fn add_pending(
        &mut self,
        name: &str,
        pending: &mut HashMap<String, Schema>,
        chain: &mut Vec<String>,
    ) -> Result<()> {
        let Some(schema) = pending.remove(name) else {
            // already added, or a base that was never pending
            return Ok(());
        };
        if let Some(base) = schema.extends.clone() {
            if chain.contains(&base) || base == schema.name {
                return Err(StandardsError::InheritanceCycle {
                    schema: schema.name,
                    base,
                });
            }
            chain.push(schema.name.clone());
            self.add_pending(&base, pending, chain)?;
            chain.pop();
        }
        self.add_schema(schema)
    }

    pub fn find_schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name).map(Arc::as_ref)
    }

    /// Shared handle to a schema, for holding past the catalog's borrow.
    pub fn schema(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    pub fn find_value_set(&self, name: &str) -> Option<&ValueSet> {
        self.value_sets.get(name).map(Arc::as_ref)
    }

    pub fn find_table(&self, name: &str) -> Option<&LookupTable> {
        self.tables.get(name).map(Arc::as_ref)
    }

    pub fn mappers(&self) -> &MapperRegistry {
        &self.mappers
    }

    /// Schema names, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
