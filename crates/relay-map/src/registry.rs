//! Registry of mappers keyed by the name used in schema files.
//!
//! Schemas name their mapper as an expression like `concat(a, b)`. During
//! fixup the name is resolved once against a [`MapperRegistry`] and the
//! element keeps a shared [`MapperRef`]; rows never touch the registry.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, OnceLock};

use regex::Regex;
use relay_model::{MapperRef, SchemaError, argument_error};

use crate::mappers::{
    CoalesceMapper, ConcatenateMapper, CountryMapper, DateTimeOffsetMapper, HashMapper,
    IfNotPresentMapper, IfNpiMapper, IfPresentMapper, IfThenElseMapper, LookupMapper,
    LookupSenderValuesetsMapper, MiddleInitialMapper, NpiLookupMapper, NullMapper,
    SplitByCommaMapper, SplitMapper, StripNonNumericMapper, StripNumericMapper,
    StripPhoneFormattingMapper, TimestampMapper, UseMapper, UseSenderSettingMapper,
    ZipCodeToCountyMapper,
};

/// `name(arg, arg, ...)`
static MAPPER_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*\((.*)\)\s*$").expect("valid mapper expression regex")
});

/// Splits a mapper expression into its name and trimmed arguments.
///
/// `concat(patient_id, $index)` gives `("concat", ["patient_id", "$index"])`,
/// and `null()` gives `("null", [])`.
///
/// # Errors
///
/// Returns [`SchemaError::MapperArguments`] if the expression is not of the
/// form `name(...)`.
pub fn parse_mapper_field(field: &str) -> Result<(String, Vec<String>), SchemaError> {
    let captures = MAPPER_EXPRESSION
        .captures(field)
        .ok_or_else(|| argument_error(field, "mapper expression does not parse"))?;
    let name = captures[1].to_string();
    let args = captures[2].trim();
    let args = if args.is_empty() {
        Vec::new()
    } else {
        args.split(',').map(|arg| arg.trim().to_string()).collect()
    };
    Ok((name, args))
}

/// Mappers by name.
///
/// # Thread Safety
///
/// The registry is immutable once built and mappers are `Send + Sync`, so a
/// shared registry can be read from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct MapperRegistry {
    mappers: HashMap<&'static str, MapperRef>,
}

impl MapperRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mapper under its name, replacing any mapper already registered with that name.
    pub fn register(&mut self, mapper: MapperRef) {
        self.mappers.insert(mapper.name(), mapper);
    }

    /// Gets a shared handle to the mapper registered as `name`.
    pub fn get(&self, name: &str) -> Option<MapperRef> {
        self.mappers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mappers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Registered mapper names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.mappers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Parses a mapper expression and resolves its name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MapperArguments`] if the expression does not
    /// parse or names an unregistered mapper.
    pub fn resolve(&self, field: &str) -> Result<(MapperRef, Vec<String>), SchemaError> {
        let (name, args) = parse_mapper_field(field)?;
        let mapper = self
            .get(&name)
            .ok_or_else(|| argument_error(&name, "no mapper is registered with this name"))?;
        Ok((mapper, args))
    }
}

/// Cached registry of the built-in mappers.
static DEFAULT_REGISTRY: OnceLock<MapperRegistry> = OnceLock::new();

/// Returns the registry holding every built-in mapper.
///
/// The registry is built on first access.
///
/// # Registered Mappers
///
/// `coalesce`, `concat`, `countryMapper`, `dateTimeOffset`, `hash`,
/// `ifNotPresent`, `ifNPI`, `ifPresent`, `ifThenElse`, `lookup`,
/// `lookupSenderValuesets`, `middleInitial`, `npiLookup`, `null`, `split`,
/// `splitByComma`, `stripNonNumeric`, `stripNumeric`, `stripPhoneFormatting`,
/// `timestamp`, `use`, `useSenderSetting`, `zipCodeToCounty`
pub fn default_registry() -> &'static MapperRegistry {
    DEFAULT_REGISTRY.get_or_init(build_default_registry)
}

fn build_default_registry() -> MapperRegistry {
    let mut registry = MapperRegistry::new();

    registry.register(Arc::new(MiddleInitialMapper));
    registry.register(Arc::new(UseMapper));
    registry.register(Arc::new(UseSenderSettingMapper));
    registry.register(Arc::new(IfPresentMapper));
    registry.register(Arc::new(IfNotPresentMapper));
    registry.register(Arc::new(IfThenElseMapper));
    registry.register(Arc::new(IfNpiMapper));
    registry.register(Arc::new(LookupMapper));
    registry.register(Arc::new(ZipCodeToCountyMapper));
    registry.register(Arc::new(NpiLookupMapper));
    registry.register(Arc::new(LookupSenderValuesetsMapper));
    registry.register(Arc::new(ConcatenateMapper));
    registry.register(Arc::new(CoalesceMapper));
    registry.register(Arc::new(StripPhoneFormattingMapper));
    registry.register(Arc::new(StripNonNumericMapper));
    registry.register(Arc::new(StripNumericMapper));
    registry.register(Arc::new(SplitMapper));
    registry.register(Arc::new(SplitByCommaMapper));
    registry.register(Arc::new(DateTimeOffsetMapper));
    registry.register(Arc::new(TimestampMapper));
    registry.register(Arc::new(HashMapper));
    registry.register(Arc::new(NullMapper));
    registry.register(Arc::new(CountryMapper));

    tracing::debug!(mappers = registry.len(), "built default mapper registry");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mapper_expressions() {
        let (name, args) = parse_mapper_field("concat(patient_id, $index)").unwrap();
        assert_eq!(name, "concat");
        assert_eq!(args, vec!["patient_id", "$index"]);

        let (name, args) = parse_mapper_field("null()").unwrap();
        assert_eq!(name, "null");
        assert!(args.is_empty());

        let (_, args) =
            parse_mapper_field("ifNotPresent($mode:literal, $string:*** No Address Given ***, a)")
                .unwrap();
        assert_eq!(args[1], "$string:*** No Address Given ***");

        assert!(parse_mapper_field("concat").is_err());
    }

    #[test]
    fn default_registry_has_every_builtin() {
        let registry = default_registry();
        assert_eq!(registry.len(), 23);
        assert!(registry.contains("lookup"));
        assert!(registry.get("ifNPI").is_some());
        assert!(registry.get("nope").is_none());
        assert!(registry.resolve("nope(a)").is_err());
    }
}
