#![allow(missing_docs)]

use std::sync::Arc;

use relay_model::{
    Cardinality, Element, ElementAndValue, ElementResult, ElementType, LookupTable, Mapper,
    SchemaError, SenderContext, ValueSet, ValueSetSystem, ValueSetValue,
};

#[derive(Debug)]
struct LookupStub;

impl Mapper for LookupStub {
    fn name(&self) -> &'static str {
        "lookup"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        _element: &Element,
        _args: &[String],
        _values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        ElementResult::empty()
    }
}

fn fips_table() -> Arc<LookupTable> {
    Arc::new(LookupTable::new(
        "fips-county",
        vec!["State".to_string(), "County".to_string(), "FIPS".to_string()],
        vec![vec!["FL".to_string(), "Leon".to_string(), "12073".to_string()]],
    ))
}

// =========================================================================
// Validation
// =========================================================================

#[test]
fn test_valid_elements_have_no_errors() {
    let text = Element::new("patient_last_name", ElementType::Text);
    assert!(text.validate().is_empty());

    let mut table = Element::new("patient_county_code", ElementType::Table);
    table.table_ref = Some(fips_table());
    table.table_column = Some("FIPS".to_string());
    table.mapper_ref = Some(Arc::new(LookupStub));
    table.mapper_args = Some(vec!["patient_county".to_string()]);
    assert!(table.validate().is_empty());
}

#[test]
fn test_validation_messages() {
    let untyped = Element::named("mystery");
    let mut lookup_without_column = Element::new("county", ElementType::Table);
    lookup_without_column.mapper_ref = Some(Arc::new(LookupStub));
    lookup_without_column.table_ref = Some(fips_table());
    let mut table_without_ref = Element::new("state", ElementType::TableOrBlank);
    table_without_ref.table_column = Some("State".to_string());
    let mut args_without_mapper = Element::new("full_name", ElementType::Text);
    args_without_mapper.mapper_overrides_value = Some(true);
    let mut blank_with_default = Element::new("comment", ElementType::TextOrBlank);
    blank_with_default.default = Some("none".to_string());
    let code_without_values = Element::new("test_result", ElementType::Code);

    let messages: Vec<String> = [
        untyped,
        lookup_without_column,
        table_without_ref,
        args_without_mapper,
        blank_with_default,
        code_without_values,
    ]
    .iter()
    .flat_map(Element::validate)
    .collect();

    insta::assert_debug_snapshot!(messages, @r#"
    [
        "Element mystery - requires an element type.",
        "Element county - requires a table and table column.",
        "Element state - requires a table.",
        "Element full_name - has mapper related parameters, but no mapper.",
        "Element comment - has a default specified, but can be blank.",
        "Element test_result - requires a value set or alt values.",
    ]
    "#);
}

#[test]
fn test_table_lookup_needs_mapper_and_table_type() {
    let mut element = Element::new("patient_county_code", ElementType::Table);
    assert!(!element.is_table_lookup());
    element.mapper_ref = Some(Arc::new(LookupStub));
    assert!(element.is_table_lookup());
    element.element_type = Some(ElementType::Text);
    assert!(!element.is_table_lookup());
}

// =========================================================================
// Inheritance
// =========================================================================

#[test]
fn test_inherit_keeps_override_name_and_fills_gaps() {
    let mut base = Element::new("patient_gender", ElementType::Code);
    base.value_set = Some("hl70001".to_string());
    base.value_set_ref = Some(Arc::new(ValueSet::new(
        "hl70001",
        ValueSetSystem::Hl7,
        vec![ValueSetValue::new("F", "Female"), ValueSetValue::new("M", "Male")],
    )));
    base.cardinality = Some(Cardinality::ZeroOrOne);
    base.hl7_field = Some("PID-8".to_string());

    let mut child = Element::named("patient_gender");
    child.cardinality = Some(Cardinality::One);
    child.csv_fields = Some(vec![relay_model::CsvField::new("Gender", None)]);

    let merged = child.inherit_from(&base);
    assert_eq!(merged.name, "patient_gender");
    assert_eq!(merged.element_type, Some(ElementType::Code));
    assert_eq!(merged.cardinality, Some(Cardinality::One));
    assert_eq!(merged.value_set.as_deref(), Some("hl70001"));
    assert!(merged.value_set_ref.is_some());
    assert_eq!(merged.field_mapping(), "Gender (patient_gender)");
    assert!(!merged.is_optional());
    assert!(merged.validate().is_empty());
}

#[test]
fn test_name_contains_ignores_case() {
    let element = Element::new("Patient_Phone_Number", ElementType::Telephone);
    assert!(element.name_contains("phone"));
    assert!(!element.name_contains("email"));
}
