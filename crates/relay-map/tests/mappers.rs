#![allow(missing_docs)]

use std::sync::Arc;

use proptest::prelude::*;
use relay_map::default_registry;
use relay_map::mappers::is_valid_npi;
use relay_model::{
    CustomerStatus, Element, ElementAndValue, ElementResult, ElementType, LookupTable,
    SenderContext,
};

fn mapper_result(
    mapper: &str,
    element: &Element,
    args: &[&str],
    values: &[ElementAndValue],
    sender: Option<&SenderContext>,
) -> ElementResult {
    let mapper = default_registry().get(mapper).expect("built-in mapper");
    let args: Vec<String> = args.iter().map(|arg| (*arg).to_string()).collect();
    mapper.apply(element, &args, values, sender)
}

fn apply(mapper: &str, args: &[&str], values: &[(&str, &str)]) -> Option<String> {
    let values: Vec<ElementAndValue> = values
        .iter()
        .map(|(name, value)| ElementAndValue::new(Element::named(*name), *value))
        .collect();
    mapper_result(mapper, &Element::named("target"), args, &values, None).value
}

fn value_names(mapper: &str, args: &[&str]) -> Result<Vec<String>, relay_model::SchemaError> {
    let mapper = default_registry().get(mapper).expect("built-in mapper");
    let args: Vec<String> = args.iter().map(|arg| (*arg).to_string()).collect();
    mapper.value_names(&Element::named("target"), &args)
}

// =========================================================================
// Lookup
// =========================================================================

fn lookup_table() -> Arc<LookupTable> {
    let rows = [["1", "2", "x"], ["3", "4", "y"], ["5", "6", "z"]];
    Arc::new(LookupTable::new(
        "test",
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect(),
    ))
}

fn table_element(name: &str) -> Element {
    let mut element = Element::new(name, ElementType::Table);
    element.table = Some("test".to_string());
    element.table_column = Some(name.to_string());
    element.table_ref = Some(lookup_table());
    element
}

#[test]
fn test_lookup_single_index() {
    let target = table_element("c");
    let values = vec![ElementAndValue::new(table_element("a"), "3")];
    let result = mapper_result("lookup", &target, &["a"], &values, None);
    assert_eq!(result.value.as_deref(), Some("y"));
}

#[test]
fn test_lookup_two_indexes() {
    let target = table_element("c");
    let values = vec![
        ElementAndValue::new(table_element("a"), "3"),
        ElementAndValue::new(table_element("b"), "4"),
    ];
    let result = mapper_result("lookup", &target, &["a", "b"], &values, None);
    assert_eq!(result.value.as_deref(), Some("y"));

    let values = vec![
        ElementAndValue::new(table_element("a"), "3"),
        ElementAndValue::new(table_element("b"), "6"),
    ];
    assert_eq!(mapper_result("lookup", &target, &["a", "b"], &values, None).value, None);
}

#[test]
fn test_lookup_without_table_is_an_error() {
    let mut target = table_element("c");
    target.table_ref = None;
    let values = vec![ElementAndValue::new(table_element("a"), "3")];
    let result = mapper_result("lookup", &target, &["a"], &values, None);
    assert!(result.has_errors());
}

#[test]
fn test_zip_code_to_county() {
    let mut target = Element::new("patient_county", ElementType::Table);
    target.table_ref = Some(Arc::new(LookupTable::new(
        "zip-code-data",
        vec!["state_fips".to_string(), "zipcode".to_string(), "county".to_string()],
        vec![
            vec!["12".to_string(), "32303".to_string(), "Leon".to_string()],
            vec!["12".to_string(), "32034".to_string(), "Nassau".to_string()],
        ],
    )));
    let values = vec![ElementAndValue::new(Element::named("patient_zip_code"), "32303-4509")];
    let result = mapper_result("zipCodeToCounty", &target, &["patient_zip_code"], &values, None);
    assert_eq!(result.value.as_deref(), Some("Leon"));
}

fn table(name: &str, headers: &[&str], rows: &[&[&str]]) -> Arc<LookupTable> {
    Arc::new(LookupTable::new(
        name,
        headers.iter().map(|header| (*header).to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect(),
    ))
}

fn column_element(name: &str, column: &str, table: &Arc<LookupTable>) -> Element {
    let mut element = Element::new(name, ElementType::Table);
    element.table = Some(table.name.clone());
    element.table_column = Some(column.to_string());
    element.table_ref = Some(Arc::clone(table));
    element
}

#[test]
fn test_npi_lookup() {
    let providers = table(
        "npi-lookup",
        &["ordering_provider_id", "testing_lab_clia", "sender_id", "first_name", "last_name"],
        &[
            &["1023040318", "01D2079572", "cuc-al", "Paul", "Fineburg"],
            &["1184739201", "05D2222542", "simple_report", "Ada", "Stone"],
        ],
    );
    let npi = column_element("ordering_provider_id", "ordering_provider_id", &providers);
    let clia = column_element("testing_lab_clia", "testing_lab_clia", &providers);
    let sender_id = column_element("sender_id", "sender_id", &providers);
    let first_name = column_element("ordering_provider_first_name", "first_name", &providers);
    let last_name = column_element("ordering_provider_last_name", "last_name", &providers);
    let args = ["ordering_provider_id", "testing_lab_clia", "sender_id"];

    assert_eq!(value_names("npiLookup", &args).unwrap(), args);
    assert!(value_names("npiLookup", &args[..2]).is_err());

    let npi_present = vec![
        ElementAndValue::new(npi.clone(), "1023040318"),
        ElementAndValue::new(clia.clone(), "01D2079572"),
        ElementAndValue::new(sender_id.clone(), "cuc-al"),
    ];
    let first = mapper_result("npiLookup", &first_name, &args, &npi_present, None);
    assert_eq!(first.value.as_deref(), Some("Paul"));
    let last = mapper_result("npiLookup", &last_name, &args, &npi_present, None);
    assert_eq!(last.value.as_deref(), Some("Fineburg"));

    // no NPI: the lab CLIA and sender id find the provider
    let npi_missing = vec![
        ElementAndValue::new(npi.clone(), ""),
        ElementAndValue::new(clia.clone(), "05D2222542"),
        ElementAndValue::new(sender_id.clone(), "simple_report"),
    ];
    let first = mapper_result("npiLookup", &first_name, &args, &npi_missing, None);
    assert_eq!(first.value.as_deref(), Some("Ada"));

    // an unknown NPI falls back the same way
    let npi_unknown = vec![
        ElementAndValue::new(npi, "9999999999"),
        ElementAndValue::new(clia, "01D2079572"),
        ElementAndValue::new(sender_id, "other-sender"),
    ];
    assert_eq!(mapper_result("npiLookup", &first_name, &args, &npi_unknown, None).value, None);
}

#[test]
fn test_lookup_sender_valuesets() {
    let translations = table(
        "sender_valuesets",
        &["sender_id", "element_name", "free_text_substring", "result"],
        &[
            &["all", "pregnant", "y", "77386006"],
            &["all", "pregnant", "n", "60001007"],
            &["cuc-al", "pregnant", "y", "261665006"],
        ],
    );
    let pregnant = column_element("pregnant", "result", &translations);
    let args = ["sender_id", "pregnant"];
    assert_eq!(value_names("lookupSenderValuesets", &args).unwrap(), args);

    let translate = |sender: &str, text: &str| {
        let values = vec![
            ElementAndValue::new(Element::named("sender_id"), sender),
            ElementAndValue::new(pregnant.clone(), text),
        ];
        mapper_result("lookupSenderValuesets", &pregnant, &args, &values, None).value
    };
    assert_eq!(translate("all", "y").as_deref(), Some("77386006"));
    assert_eq!(translate("all", "Y ").as_deref(), Some("77386006"));
    assert_eq!(translate("all", "yas queen"), None);
    // a sender's own rows win over the shared ones
    assert_eq!(translate("cuc-al", "y").as_deref(), Some("261665006"));
    assert_eq!(translate("cuc-al", "n").as_deref(), Some("60001007"));
}

#[test]
fn test_country_mapper() {
    let country = Element::named("patient_country");
    let args = ["patient_zip_code"];
    let names = default_registry()
        .get("countryMapper")
        .expect("built-in mapper")
        .value_names(&country, &["patient_zip_code".to_string()])
        .unwrap();
    assert_eq!(names, vec!["patient_country", "patient_zip_code"]);

    let cases = [
        ("USA", "", Some("USA")),
        ("MEX", "", Some("MEX")),
        ("CAN", "", Some("CAN")),
        ("USA", "90210", Some("USA")),
        ("CAN", "H0H0H0", Some("CAN")),
        ("", "90210", Some("USA")),
        ("", "H0H0H0", Some("CAN")),
        ("", "SW1A 1AA", None),
        ("", "", None),
    ];
    for (country_value, zip, expected) in cases {
        let values = vec![
            ElementAndValue::new(country.clone(), country_value),
            ElementAndValue::new(Element::named("patient_zip_code"), zip),
        ];
        let result = mapper_result("countryMapper", &country, &args, &values, None);
        assert_eq!(result.value.as_deref(), expected, "country {country_value:?}, zip {zip:?}");
    }
}

// =========================================================================
// Conditionals
// =========================================================================

#[test]
fn test_if_then_else_numeric_and_text() {
    let row = [("a", "2"), ("b", "2.0"), ("c", "then"), ("d", "else")];
    assert_eq!(apply("ifThenElse", &["==", "a", "b", "c", "d"], &row).as_deref(), Some("then"));
    assert_eq!(apply("ifThenElse", &["!=", "a", "b", "c", "d"], &row).as_deref(), Some("else"));
    assert_eq!(apply("ifThenElse", &["<=", "a", "3", "c", "d"], &row).as_deref(), Some("then"));
    assert_eq!(apply("ifThenElse", &[">", "a", "10", "c", "d"], &row).as_deref(), Some("else"));

    let row = [("a", "apple"), ("b", "banana")];
    assert_eq!(apply("ifThenElse", &["<", "a", "b", "yes", "no"], &row).as_deref(), Some("yes"));
}

#[test]
fn test_if_then_else_operator_from_element() {
    let row = [("op_elm", ">="), ("a", "5"), ("b", "5")];
    assert_eq!(
        apply("ifThenElse", &["op_elm", "a", "b", "then", "else"], &row).as_deref(),
        Some("then")
    );
    assert_eq!(value_names("ifThenElse", &["<=", "a", "b", "c", "d"]).unwrap().len(), 4);
    assert!(value_names("ifThenElse", &["<=", "a", "b", "c"]).is_err());
}

#[test]
fn test_if_present() {
    assert_eq!(apply("ifPresent", &["a", "const"], &[("a", "x")]).as_deref(), Some("const"));
    assert_eq!(apply("ifPresent", &["a", "const"], &[]), None);
    assert_eq!(value_names("ifPresent", &["a", "const"]).unwrap(), vec!["a"]);
}

#[test]
fn test_if_not_present_literal_and_lookup() {
    let literal = ["$mode:literal", "$string:*** No Address Given ***", "street", "city"];
    assert_eq!(
        apply("ifNotPresent", &literal, &[]).as_deref(),
        Some("*** No Address Given ***")
    );
    assert_eq!(apply("ifNotPresent", &literal, &[("city", "Tallahassee")]), None);

    let lookup = ["$mode:lookup", "fallback", "street"];
    assert_eq!(
        apply("ifNotPresent", &lookup, &[("fallback", "unknown")]).as_deref(),
        Some("unknown")
    );
    assert_eq!(apply("ifNotPresent", &["$mode:bogus", "$string:x"], &[]), None);
    assert!(value_names("ifNotPresent", &["literal", "x"]).is_err());
}

#[test]
fn test_if_npi() {
    let row = [("ordering_provider_id", "1023040318")];
    assert_eq!(
        apply("ifNPI", &["ordering_provider_id", "NPI", "U"], &row).as_deref(),
        Some("NPI")
    );
    let row = [("ordering_provider_id", "12345")];
    assert_eq!(apply("ifNPI", &["ordering_provider_id", "NPI", "U"], &row).as_deref(), Some("U"));
    assert_eq!(apply("ifNPI", &["ordering_provider_id", "NPI"], &row), None);
}

// =========================================================================
// Copying and combining
// =========================================================================

#[test]
fn test_middle_initial() {
    assert_eq!(apply("middleInitial", &["middle"], &[("middle", "rick")]).as_deref(), Some("R"));
    assert_eq!(apply("middleInitial", &["middle"], &[]), None);
}

#[test]
fn test_use_first_present_value() {
    let row = [("b", "B"), ("c", "C")];
    assert_eq!(apply("use", &["a", "b", "c"], &row).as_deref(), Some("B"));
    assert_eq!(apply("use", &["a"], &row), None);
}

#[test]
fn test_use_datetime_as_date() {
    let target = Element::new("specimen_collection_date", ElementType::Date);
    let source = Element::new("specimen_collection_date_time", ElementType::DateTime);
    let values = vec![ElementAndValue::new(source, "202103151230-0500")];
    let result = mapper_result("use", &target, &["specimen_collection_date_time"], &values, None);
    assert_eq!(result.value.as_deref(), Some("20210315"));
}

#[test]
fn test_use_sender_setting() {
    let sender = SenderContext {
        name: "default".to_string(),
        organization_name: "simple_report".to_string(),
        processing_type: "P".to_string(),
        schema_name: "covid-19".to_string(),
        customer_status: CustomerStatus::Active,
        ..SenderContext::default()
    };
    let target = Element::named("processing_mode_code");
    let result = mapper_result("useSenderSetting", &target, &["processingModeCode"], &[], Some(&sender));
    assert_eq!(result.value.as_deref(), Some("P"));

    let result = mapper_result("useSenderSetting", &target, &["fullName"], &[], Some(&sender));
    assert_eq!(result.value.as_deref(), Some("simple_report.default"));

    let result = mapper_result("useSenderSetting", &target, &["favoriteColor"], &[], Some(&sender));
    assert_eq!(result.value, None);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message().contains("favoriteColor"));

    assert!(value_names("useSenderSetting", &["name"]).unwrap().is_empty());
    assert!(value_names("useSenderSetting", &["name", "topic"]).is_err());
}

#[test]
fn test_concat_and_coalesce() {
    let row = [("a", "1"), ("b", ""), ("c", "3")];
    assert_eq!(apply("concat", &["a", "b", "c"], &row).as_deref(), Some("1, 3"));
    assert_eq!(apply("concat", &["b"], &row), None);
    assert_eq!(apply("coalesce", &["b", "c", "a"], &row).as_deref(), Some("3"));
    assert_eq!(apply("coalesce", &["b"], &row), None);
}

#[test]
fn test_strip_mappers() {
    assert_eq!(
        apply("stripPhoneFormatting", &["phone"], &[("phone", "(850) 999-9999xHOME")]).as_deref(),
        Some("8509999999:1:")
    );
    assert_eq!(apply("stripNumeric", &["age"], &[("age", "99 years")]).as_deref(), Some("years"));
    assert_eq!(apply("stripNonNumeric", &["age"], &[("age", "99 years")]).as_deref(), Some("99"));
    assert_eq!(apply("stripNonNumeric", &["age"], &[("age", "years")]), None);
}

#[test]
fn test_split_mappers() {
    let row = [("name", "Antonio Berto Carlucci"), ("list", "a, b ,c")];
    assert_eq!(apply("split", &["name", "0"], &row).as_deref(), Some("Antonio"));
    assert_eq!(apply("split", &["name", "2"], &row).as_deref(), Some("Carlucci"));
    assert_eq!(apply("split", &["name", "3"], &row), None);
    assert_eq!(apply("split", &["name", "1", "o"], &row).as_deref(), Some("ni"));
    assert_eq!(apply("splitByComma", &["list", "1"], &row).as_deref(), Some("b"));
    assert_eq!(apply("splitByComma", &["list", "3"], &row), None);
}

#[test]
fn test_hash() {
    assert_eq!(
        apply("hash", &["a"], &[("a", "6086edf8e412650032408e96")]).as_deref(),
        Some("47496cafa04e9c489444b60575399f51e9abc061f4fdda40c31d814325bfc223")
    );
    assert_eq!(
        apply(
            "hash",
            &["a", "b", "c"],
            &[("a", "string1"), ("b", "string2"), ("c", "string3")]
        )
        .as_deref(),
        Some("c8fa773cd54e7a7eb7ca08577d0bd23e6ce3a73e61df176213d9ec90f06cb45f")
    );
    assert_eq!(apply("hash", &["a"], &[("a", "")]), None);
    assert!(value_names("hash", &[]).is_err());
}

#[test]
fn test_null_mapper() {
    assert_eq!(apply("null", &[], &[("a", "1")]), None);
}

// =========================================================================
// Datetimes
// =========================================================================

#[test]
fn test_date_time_offset() {
    let row = [("a", "202103020000-0600")];
    assert_eq!(
        apply("dateTimeOffset", &["a", "seconds", "6"], &row).as_deref(),
        Some("20210302000006.0000-0600")
    );
    assert_eq!(
        apply("dateTimeOffset", &["a", "minutes", "-1"], &row).as_deref(),
        Some("20210301235900.0000-0600")
    );

    let row = [("a", "20210302000006.0000-0600")];
    assert_eq!(
        apply("dateTimeOffset", &["a", "seconds", "-6"], &row).as_deref(),
        Some("20210302000000.0000-0600")
    );
}

#[test]
fn test_date_time_offset_errors() {
    let values = vec![ElementAndValue::new(Element::named("a"), "202103020000-0600")];
    let target = Element::named("target");
    assert!(mapper_result("dateTimeOffset", &target, &["a", "hours", "1"], &values, None).has_errors());
    assert!(mapper_result("dateTimeOffset", &target, &["a", "seconds", "x"], &values, None).has_errors());
    assert!(value_names("dateTimeOffset", &["a", "seconds"]).is_err());
}

#[test]
fn test_timestamp_is_high_precision() {
    let value = apply("timestamp", &[], &[]).expect("timestamp");
    // yyyyMMddHHmmss.SSS plus a five character offset
    assert_eq!(value.len(), 23);
    assert_eq!(&value[14..15], ".");
}

// =========================================================================
// Properties
// =========================================================================

proptest! {
    #[test]
    fn prop_npi_has_one_check_digit(base in "[1-2][0-9]{8}") {
        let valid = (0..10)
            .filter(|check| is_valid_npi(&format!("{base}{check}")))
            .count();
        prop_assert_eq!(valid, 1);
    }

    #[test]
    fn prop_split_by_comma_picks_the_indexed_part(
        parts in proptest::collection::vec("[a-z]{1,6}", 1..5),
        index in 0usize..5,
    ) {
        let joined = parts.join(", ");
        let expected = parts.get(index).cloned();
        let result = apply("splitByComma", &["list", &index.to_string()], &[("list", &joined)]);
        prop_assert_eq!(result.filter(|value| !value.is_empty()), expected);
    }
}
