//! Schema inheritance and reference resolution.
//!
//! Fixup turns the names written in schema files into shared references:
//! value sets, lookup tables and mappers. It runs once per schema when the
//! schema is added to [`Metadata`](crate::Metadata); rows only ever see
//! fixed-up elements.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use relay_map::{MapperRegistry, parse_mapper_field};
use relay_model::{Element, ElementType, LookupTable, Schema, ValueSet};

use crate::error::{Result, StandardsError};

/// Everything fixup resolves names against.
#[derive(Debug, Clone, Copy)]
pub struct FixupContext<'a> {
    pub value_sets: &'a HashMap<String, Arc<ValueSet>>,
    pub tables: &'a HashMap<String, Arc<LookupTable>>,
    pub mappers: &'a MapperRegistry,
}

/// Merges a schema with the schema it extends.
///
/// The result has every base element in base order, merged with the
/// same-named child element if there is one, followed by the child-only
/// elements in child order.
pub fn extend_schema(child: &Schema, base: &Schema) -> Schema {
    let mut elements: Vec<Element> = base
        .elements
        .iter()
        .map(|base_element| match child.find_element(&base_element.name) {
            Some(child_element) => child_element.inherit_from(base_element),
            None => base_element.clone(),
        })
        .collect();
    elements.extend(
        child
            .elements
            .iter()
            .filter(|element| !base.contains_element(&element.name))
            .cloned(),
    );
    Schema {
        elements,
        ..child.clone()
    }
}

fn resolve_element(element: &Element, context: FixupContext<'_>) -> Result<Element> {
    let unknown = |kind, name: &str| StandardsError::UnknownReference {
        kind,
        name: name.to_string(),
        element: element.name.clone(),
    };
    let mut fixed = element.clone();

    fixed.value_set_ref = match element.value_set.as_deref() {
        Some(name) => Some(
            context
                .value_sets
                .get(name)
                .cloned()
                .ok_or_else(|| unknown("value set", name))?,
        ),
        None => None,
    };

    fixed.table_ref = match element.table.as_deref() {
        Some(name) => Some(
            context
                .tables
                .get(name)
                .cloned()
                .ok_or_else(|| unknown("table", name))?,
        ),
        None => None,
    };
    // a TABLE element reads the column named after itself unless told otherwise
    if fixed.table_column.is_none()
        && matches!(
            fixed.element_type,
            Some(ElementType::Table | ElementType::TableOrBlank)
        )
        && let Some(table) = fixed.table_ref.as_deref()
        && table.has_column(&fixed.name)
    {
        fixed.table_column = Some(fixed.name.clone());
    }

    (fixed.mapper_ref, fixed.mapper_args) = match element.mapper.as_deref() {
        Some(expression) => {
            let mapper_error = |source| StandardsError::Mapper {
                element: element.name.clone(),
                source,
            };
            let (name, args) = parse_mapper_field(expression).map_err(mapper_error)?;
            let mapper = context
                .mappers
                .get(&name)
                .ok_or_else(|| unknown("mapper", &name))?;
            // argument shape is checked once here instead of on every row
            mapper.value_names(&fixed, &args).map_err(mapper_error)?;
            (Some(mapper), Some(args))
        }
        None => (None, None),
    };

    tracing::trace!(element = %fixed.name, "fixed up element");
    Ok(fixed)
}

/// Extra checks that need the resolved references.
fn reference_messages(element: &Element) -> Vec<String> {
    let mut messages = Vec::new();
    if let (Some(table), Some(column)) = (element.table_ref.as_deref(), element.table_column.as_deref())
        && !table.has_column(column)
    {
        messages.push(format!(
            "Element {} - table {} has no column {column}.",
            element.name, table.name
        ));
    }
    messages
}

/// Resolves every reference in `schema` and validates the result.
///
/// # Errors
///
/// Fails on the first unknown value set, table or mapper. Validation
/// problems are collected across all elements and returned together as
/// [`StandardsError::InvalidSchema`].
pub fn fixup_schema(schema: &Schema, context: FixupContext<'_>) -> Result<Schema> {
    let mut messages = Vec::new();
    let mut seen = HashSet::new();
    let mut elements = Vec::with_capacity(schema.elements.len());
    for element in &schema.elements {
        if !seen.insert(element.name.as_str()) {
            messages.push(format!("Element {} - is defined more than once.", element.name));
            continue;
        }
        let fixed = resolve_element(element, context)?;
        messages.extend(fixed.validate());
        messages.extend(reference_messages(&fixed));
        elements.push(fixed);
    }
    if !messages.is_empty() {
        return Err(StandardsError::InvalidSchema {
            schema: schema.name.clone(),
            messages,
        });
    }
    tracing::debug!(schema = %schema.name, elements = elements.len(), "fixed up schema");
    Ok(Schema {
        elements,
        ..schema.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_map::default_registry;
    use relay_model::{Cardinality, ValueSetSystem, ValueSetValue};

    fn value_sets() -> HashMap<String, Arc<ValueSet>> {
        let yes_no = ValueSet::new(
            "hl70136",
            ValueSetSystem::Hl7,
            vec![ValueSetValue::new("Y", "Yes"), ValueSetValue::new("N", "No")],
        );
        HashMap::from([(yes_no.name.clone(), Arc::new(yes_no))])
    }

    fn tables() -> HashMap<String, Arc<LookupTable>> {
        let table = LookupTable::new(
            "fips-county",
            vec!["county".to_string(), "fips".to_string()],
            vec![vec!["Leon".to_string(), "12073".to_string()]],
        );
        HashMap::from([(table.name.clone(), Arc::new(table))])
    }

    #[test]
    fn extends_merges_by_name() {
        let mut base_id = Element::new("patient_id", ElementType::Text);
        base_id.cardinality = Some(Cardinality::One);
        let base = Schema::new("base", "covid-19", vec![base_id, Element::new("a", ElementType::Text)]);

        let mut child_id = Element::named("patient_id");
        child_id.default = Some("none".to_string());
        let mut child = Schema::new("child", "covid-19", vec![Element::new("b", ElementType::Text), child_id]);
        child.extends = Some("base".to_string());

        let merged = extend_schema(&child, &base);
        let names: Vec<&str> = merged.element_names().collect();
        assert_eq!(names, vec!["patient_id", "a", "b"]);
        let id = merged.find_element("patient_id").unwrap();
        assert_eq!(id.element_type, Some(ElementType::Text));
        assert_eq!(id.cardinality, Some(Cardinality::One));
        assert_eq!(id.default.as_deref(), Some("none"));
        assert_eq!(merged.name, "child");
    }

    #[test]
    fn resolves_references() {
        let value_sets = value_sets();
        let tables = tables();
        let context = FixupContext {
            value_sets: &value_sets,
            tables: &tables,
            mappers: default_registry(),
        };
        let mut hospitalized = Element::new("hospitalized", ElementType::Code);
        hospitalized.value_set = Some("hl70136".to_string());
        let mut county = Element::new("county", ElementType::Table);
        county.table = Some("fips-county".to_string());
        let mut initial = Element::new("middle_initial", ElementType::Text);
        initial.mapper = Some("middleInitial(middle_name)".to_string());

        let schema = Schema::new("s", "covid-19", vec![hospitalized, county, initial]);
        let fixed = fixup_schema(&schema, context).unwrap();
        assert!(fixed.elements[0].value_set_ref.is_some());
        assert_eq!(fixed.elements[1].table_column.as_deref(), Some("county"));
        assert_eq!(
            fixed.elements[2].mapper_args.as_deref(),
            Some(&["middle_name".to_string()][..])
        );
    }

    #[test]
    fn unknown_references_fail() {
        let value_sets = value_sets();
        let tables = tables();
        let context = FixupContext {
            value_sets: &value_sets,
            tables: &tables,
            mappers: default_registry(),
        };
        let mut element = Element::new("x", ElementType::Code);
        element.value_set = Some("nope".to_string());
        let error = fixup_schema(&Schema::new("s", "t", vec![element]), context).unwrap_err();
        assert!(matches!(error, StandardsError::UnknownReference { kind: "value set", .. }));

        let mut element = Element::new("x", ElementType::Text);
        element.mapper = Some("frobnicate(a)".to_string());
        let error = fixup_schema(&Schema::new("s", "t", vec![element]), context).unwrap_err();
        assert!(matches!(error, StandardsError::UnknownReference { kind: "mapper", .. }));

        let mut element = Element::new("x", ElementType::Text);
        element.mapper = Some("middleInitial(a, b)".to_string());
        let error = fixup_schema(&Schema::new("s", "t", vec![element]), context).unwrap_err();
        assert!(matches!(error, StandardsError::Mapper { .. }));
    }
}
