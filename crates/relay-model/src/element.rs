//! Field definitions.
//!
//! An [`Element`] describes one logical value in a report row: its type,
//! cardinality, coding, derivation and the external names it is known by in
//! each wire format. Elements are deserialized from schema files, merged with
//! a base definition via [`Element::inherit_from`], and then fixed up (value
//! set, table and mapper references resolved) before first use. After fixup
//! they are never mutated.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{LookupTable, MapperRef, SchemaError, ValueSet, ValueSetValue};

/// Name of the mapper that reads from an element's lookup table.
pub const LOOKUP_MAPPER_NAME: &str = "lookup";

/// Wildcard code/display in alt values and value sets.
pub const WILDCARD: &str = "*";

/// Closed set of element types. Each type implies a canonical format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    Text,
    /// Blank values are valid (not null).
    TextOrBlank,
    Number,
    Date,
    #[serde(rename = "DATETIME")]
    DateTime,
    Duration,
    /// Coded with an HL7, SNOMED-CT or LOINC value set.
    Code,
    Table,
    TableOrBlank,
    /// HL7 Entity Identifier (4 parts).
    Ei,
    /// ISO Hierarchic Designator (3 parts).
    Hd,
    Id,
    /// CMS CLIA number.
    IdClia,
    IdDln,
    IdSsn,
    IdNpi,
    Street,
    StreetOrBlank,
    City,
    PostalCode,
    PersonName,
    Telephone,
    Email,
    Blank,
}

impl ElementType {
    /// Types whose blank value is a legitimate value rather than a missing one.
    pub fn can_be_blank(self) -> bool {
        matches!(
            self,
            ElementType::TextOrBlank
                | ElementType::StreetOrBlank
                | ElementType::TableOrBlank
                | ElementType::Blank
        )
    }

    /// Free-text types that may be truncated to `max_length` on output.
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            ElementType::Text
                | ElementType::TextOrBlank
                | ElementType::Street
                | ElementType::StreetOrBlank
                | ElementType::City
                | ElementType::PersonName
                | ElementType::Email
        )
    }

    pub fn is_table(self) -> bool {
        matches!(self, ElementType::Table | ElementType::TableOrBlank)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Text => "TEXT",
            ElementType::TextOrBlank => "TEXT_OR_BLANK",
            ElementType::Number => "NUMBER",
            ElementType::Date => "DATE",
            ElementType::DateTime => "DATETIME",
            ElementType::Duration => "DURATION",
            ElementType::Code => "CODE",
            ElementType::Table => "TABLE",
            ElementType::TableOrBlank => "TABLE_OR_BLANK",
            ElementType::Ei => "EI",
            ElementType::Hd => "HD",
            ElementType::Id => "ID",
            ElementType::IdClia => "ID_CLIA",
            ElementType::IdDln => "ID_DLN",
            ElementType::IdSsn => "ID_SSN",
            ElementType::IdNpi => "ID_NPI",
            ElementType::Street => "STREET",
            ElementType::StreetOrBlank => "STREET_OR_BLANK",
            ElementType::City => "CITY",
            ElementType::PostalCode => "POSTAL_CODE",
            ElementType::PersonName => "PERSON_NAME",
            ElementType::Telephone => "TELEPHONE",
            ElementType::Email => "EMAIL",
            ElementType::Blank => "BLANK",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a value must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    /// Can be null or present (default).
    ZeroOrOne,
    /// Must be present.
    One,
}

impl Cardinality {
    pub fn to_formatted(self) -> &'static str {
        match self {
            Cardinality::ZeroOrOne => "[0..1]",
            Cardinality::One => "[1..1]",
        }
    }
}

/// A CSV column an element reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvField {
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
}

impl CsvField {
    pub fn new(name: impl Into<String>, format: Option<&str>) -> Self {
        Self {
            name: name.into(),
            format: format.map(str::to_string),
        }
    }
}

/// One part of an element that is spread over several input columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubValue {
    pub name: String,
    pub value: String,
    pub format: Option<String>,
}

impl SubValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>, format: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            format: format.map(str::to_string),
        }
    }
}

/// Parsed parts of a Hierarchic Designator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdFields {
    pub name: String,
    pub universal_id: Option<String>,
    pub universal_id_system: Option<String>,
}

/// Parsed parts of an Entity Identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EiFields {
    pub name: String,
    pub namespace: Option<String>,
    pub universal_id: Option<String>,
    pub universal_id_system: Option<String>,
}

/// Configuration for one logical data field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Element {
    pub name: String,

    #[serde(rename = "type")]
    pub element_type: Option<ElementType>,

    /// Either `value_set` or `alt_values` must be defined for a CODE element.
    pub value_set: Option<String>,
    #[serde(skip)]
    pub value_set_ref: Option<Arc<ValueSet>>,
    pub alt_values: Option<Vec<ValueSetValue>>,

    /// `table` and `table_column` must be defined for a TABLE element.
    pub table: Option<String>,
    #[serde(skip)]
    pub table_ref: Option<Arc<LookupTable>>,
    pub table_column: Option<String>,

    pub cardinality: Option<Cardinality>,
    pub pii: Option<bool>,
    pub phi: Option<bool>,
    /// Truncation bound for outgoing text values. `None` means no limit.
    pub max_length: Option<usize>,
    pub default: Option<String>,
    pub default_overrides_value: Option<bool>,

    /// Mapper expression, e.g. `concat(patient_first_name, patient_last_name)`.
    pub mapper: Option<String>,
    pub mapper_overrides_value: Option<bool>,
    #[serde(skip)]
    pub mapper_ref: Option<MapperRef>,
    #[serde(skip)]
    pub mapper_args: Option<Vec<String>>,

    pub reference: Option<String>,
    pub reference_url: Option<String>,
    pub hhs_guidance_field: Option<String>,
    pub nat_flat_file_field: Option<String>,

    pub hl7_field: Option<String>,
    pub hl7_output_fields: Option<Vec<String>>,
    pub hl7_aoe_question: Option<String>,

    /// CSV headers for this element. The first one is the primary field.
    pub csv_fields: Option<Vec<CsvField>>,

    pub fhir_field: Option<String>,

    pub documentation: Option<String>,

    /// Separator used by the concatenate mapper.
    pub delimiter: Option<String>,

    /// Blank out a malformed optional value instead of raising an error.
    pub nullify_value: bool,
}

impl Element {
    pub fn new(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type: Some(element_type),
            ..Self::default()
        }
    }

    /// An element with only a name, as used for mapper tokens.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_code_type(&self) -> bool {
        self.element_type == Some(ElementType::Code)
    }

    pub fn can_be_blank(&self) -> bool {
        self.element_type.is_some_and(ElementType::can_be_blank)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self.cardinality, None | Some(Cardinality::ZeroOrOne)) || self.can_be_blank()
    }

    /// True if this element reads its value from a lookup table through a mapper.
    pub fn is_table_lookup(&self) -> bool {
        self.mapper_ref.is_some() && self.element_type == Some(ElementType::Table)
    }

    pub fn name_contains(&self, substring: &str) -> bool {
        self.name
            .to_ascii_lowercase()
            .contains(&substring.to_ascii_lowercase())
    }

    /// External field name(s) followed by the element name, for messages.
    pub fn field_mapping(&self) -> String {
        if let Some(fields) = self.csv_fields.as_ref().filter(|f| !f.is_empty()) {
            let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
            return format!("{} ({})", names.join(","), self.name);
        }
        if let Some(hl7) = self.hl7_field.as_ref().filter(|f| !f.trim().is_empty()) {
            return format!("{hl7} ({})", self.name);
        }
        if let Some(fields) = self.hl7_output_fields.as_ref().filter(|f| !f.is_empty()) {
            return format!("{} ({})", fields.join(","), self.name);
        }
        format!("({})", self.name)
    }

    /// Builds a new element taking every attribute from `self` and falling back to `base`.
    #[must_use]
    pub fn inherit_from(&self, base: &Element) -> Element {
        Element {
            name: self.name.clone(),
            element_type: self.element_type.or(base.element_type),
            value_set: self.value_set.clone().or_else(|| base.value_set.clone()),
            value_set_ref: self.value_set_ref.clone().or_else(|| base.value_set_ref.clone()),
            alt_values: self.alt_values.clone().or_else(|| base.alt_values.clone()),
            table: self.table.clone().or_else(|| base.table.clone()),
            table_ref: self.table_ref.clone(),
            table_column: self.table_column.clone().or_else(|| base.table_column.clone()),
            cardinality: self.cardinality.or(base.cardinality),
            pii: self.pii.or(base.pii),
            phi: self.phi.or(base.phi),
            max_length: self.max_length.or(base.max_length),
            default: self.default.clone().or_else(|| base.default.clone()),
            default_overrides_value: self.default_overrides_value.or(base.default_overrides_value),
            mapper: self.mapper.clone().or_else(|| base.mapper.clone()),
            mapper_overrides_value: self.mapper_overrides_value.or(base.mapper_overrides_value),
            mapper_ref: self.mapper_ref.clone(),
            mapper_args: self.mapper_args.clone(),
            reference: self.reference.clone().or_else(|| base.reference.clone()),
            reference_url: self.reference_url.clone().or_else(|| base.reference_url.clone()),
            hhs_guidance_field: self
                .hhs_guidance_field
                .clone()
                .or_else(|| base.hhs_guidance_field.clone()),
            nat_flat_file_field: self
                .nat_flat_file_field
                .clone()
                .or_else(|| base.nat_flat_file_field.clone()),
            hl7_field: self.hl7_field.clone().or_else(|| base.hl7_field.clone()),
            hl7_output_fields: self
                .hl7_output_fields
                .clone()
                .or_else(|| base.hl7_output_fields.clone()),
            hl7_aoe_question: self
                .hl7_aoe_question
                .clone()
                .or_else(|| base.hl7_aoe_question.clone()),
            csv_fields: self.csv_fields.clone().or_else(|| base.csv_fields.clone()),
            fhir_field: self.fhir_field.clone().or_else(|| base.fhir_field.clone()),
            documentation: self.documentation.clone().or_else(|| base.documentation.clone()),
            delimiter: self.delimiter.clone().or_else(|| base.delimiter.clone()),
            nullify_value: self.nullify_value || base.nullify_value,
        }
    }

    /// Checks the configuration invariants of a fixed-up element.
    ///
    /// Returns one message per violation, or an empty list.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut add_error = |message: &str| {
            errors.push(format!("Element {} - {message}.", self.name));
        };

        if self.element_type.is_none() {
            add_error("requires an element type");
        }

        let table_column_blank = self
            .table_column
            .as_deref()
            .is_none_or(|column| column.trim().is_empty());

        let is_lookup_mapper = self
            .mapper_ref
            .as_ref()
            .is_some_and(|mapper| mapper.name() == LOOKUP_MAPPER_NAME);
        if is_lookup_mapper && (self.table_ref.is_none() || table_column_blank) {
            add_error("requires a table and table column");
        }

        let is_table_type = self.element_type.is_some_and(ElementType::is_table);
        if (is_table_type || !table_column_blank) && self.table_ref.is_none() {
            add_error("requires a table");
        }

        let has_mapper_args = self.mapper_args.as_ref().is_some_and(|args| !args.is_empty());
        if (self.mapper_overrides_value == Some(true) || has_mapper_args) && self.mapper_ref.is_none() {
            add_error("has mapper related parameters, but no mapper");
        }

        if self.can_be_blank() && self.default.is_some() {
            add_error("has a default specified, but can be blank");
        }

        if self.is_code_type() && self.value_set_ref.is_none() && self.alt_values.is_none() {
            add_error("requires a value set or alt values");
        }

        errors
    }

    /// True if the element should run its mapper for the given current value.
    pub fn use_mapper(&self, value: Option<&str>) -> bool {
        let overrides = self.mapper_overrides_value == Some(true);
        self.mapper_ref.is_some() && (overrides || value.is_none_or(|v| v.trim().is_empty()))
    }

    /// True if the element should take its default for the given current value.
    pub fn use_default(&self, value: Option<&str>) -> bool {
        let overrides = self.default_overrides_value == Some(true);
        overrides || value.is_none_or(|v| v.trim().is_empty())
    }

    pub fn has_default_value(&self, overrides: &HashMap<String, String>) -> bool {
        overrides.contains_key(&self.name)
            || self.default.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    /// The caller-supplied override if any, otherwise the static default, otherwise blank.
    pub fn default_value(&self, overrides: &HashMap<String, String>) -> String {
        overrides
            .get(&self.name)
            .cloned()
            .or_else(|| self.default.clone())
            .unwrap_or_default()
    }

    fn require_code_type(&self) -> Result<(), SchemaError> {
        if self.is_code_type() {
            Ok(())
        } else {
            Err(SchemaError::NotCodeType {
                field: self.field_mapping(),
            })
        }
    }

    fn require_alt_values(&self) -> Result<&[ValueSetValue], SchemaError> {
        self.require_code_type()?;
        self.alt_values
            .as_deref()
            .ok_or_else(|| SchemaError::MissingAltValues {
                field: self.field_mapping(),
            })
    }

    /// Display for `code` from the alt values, falling back to the `*` entry.
    ///
    /// # Errors
    ///
    /// Fails if the element is not a code or has no alt values.
    pub fn to_alt_display(&self, code: &str) -> Result<Option<&str>, SchemaError> {
        let alt_values = self.require_alt_values()?;
        let value = alt_values
            .iter()
            .find(|alt| alt.code.eq_ignore_ascii_case(code))
            .or_else(|| alt_values.iter().find(|alt| alt.code == WILDCARD));
        Ok(value.and_then(|alt| alt.display.as_deref()))
    }

    /// Code for `display` from the alt values, falling back to the `*` entry.
    ///
    /// # Errors
    ///
    /// Fails if the element is not a code or has no alt values.
    pub fn to_alt_code(&self, display: &str) -> Result<Option<&str>, SchemaError> {
        let alt_values = self.require_alt_values()?;
        let value = alt_values
            .iter()
            .find(|alt| {
                alt.display
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(display))
            })
            .or_else(|| {
                alt_values
                    .iter()
                    .find(|alt| alt.display.as_deref() == Some(WILDCARD))
            });
        Ok(value.map(|alt| alt.code.as_str()))
    }

    /// Value-set spelling of `code`, also matching replaced codes and the `*` entry.
    ///
    /// # Errors
    ///
    /// Fails if the element is not a code or has no resolved value set.
    pub fn to_code(&self, code: &str) -> Result<Option<&str>, SchemaError> {
        self.require_code_type()?;
        let value_set = self.value_set_ref.as_deref().ok_or_else(|| SchemaError::MissingValueSet {
            field: self.field_mapping(),
        })?;
        let value = value_set
            .values
            .iter()
            .find(|value| {
                value.code.eq_ignore_ascii_case(code)
                    || value
                        .replaces
                        .as_deref()
                        .is_some_and(|replaced| replaced.eq_ignore_ascii_case(code))
            })
            .or_else(|| value_set.values.iter().find(|value| value.code == WILDCARD));
        Ok(value.map(|value| value.code.as_str()))
    }
}
