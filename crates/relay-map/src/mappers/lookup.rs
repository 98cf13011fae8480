//! Mappers reading from an element's lookup table.

use relay_model::{
    Element, ElementAndValue, ElementResult, LookupTable, Mapper, SchemaError, SenderContext,
};

use super::{expect_args, mapper_error, value_of};

const ZIP_CODE_COLUMN: &str = "zipcode";
const COUNTY_COLUMN: &str = "county";
const SENDER_ID_COLUMN: &str = "sender_id";
const ELEMENT_NAME_COLUMN: &str = "element_name";
const FREE_TEXT_COLUMN: &str = "free_text_substring";
/// Sender id whose translations apply to every sender.
const ALL_SENDERS: &str = "all";

fn table_of<'a>(element: &'a Element) -> Result<&'a LookupTable, ElementResult> {
    element.table_ref.as_deref().ok_or_else(|| {
        mapper_error(
            element,
            format!(
                "Element {} has no lookup table '{}'",
                element.name,
                element.table.as_deref().unwrap_or_default()
            ),
        )
    })
}

/// The `(column, value)` pair the named sibling is matched on, if it has a value.
///
/// The column is the sibling's own `table_column`, or its name when it has none.
fn index_entry<'a>(values: &'a [ElementAndValue], name: &str) -> Option<(&'a str, &'a str)> {
    let value = values
        .iter()
        .find(|value| value.element.name == name)
        .filter(|value| !value.value.trim().is_empty())?;
    let column = value
        .element
        .table_column
        .as_deref()
        .unwrap_or(value.element.name.as_str());
    Some((column, value.value.as_str()))
}

fn lookup_column(element: &Element) -> Result<&str, ElementResult> {
    element
        .table_column
        .as_deref()
        .ok_or_else(|| mapper_error(element, format!("Element {} has no table column", element.name)))
}

/// `lookup(a, b, ...)`: the element's table column in the row matching every index value.
///
/// Each index element is matched on its own `table_column`, or on its name
/// when it has none.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupMapper;

impl Mapper for LookupMapper {
    fn name(&self) -> &'static str {
        relay_model::LOOKUP_MAPPER_NAME
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=usize::MAX)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let table = match table_of(element) {
            Ok(table) => table,
            Err(result) => return result,
        };
        let lookup_column = match lookup_column(element) {
            Ok(column) => column,
            Err(result) => return result,
        };
        let index: Vec<(&str, &str)> = args
            .iter()
            .filter_map(|arg| index_entry(values, arg))
            .collect();
        if index.is_empty() {
            return ElementResult::empty();
        }
        ElementResult::new(table.lookup_values(&index, lookup_column).map(str::to_string))
    }
}

/// `zipCodeToCounty(zip)`: county name for the first five digits of a ZIP code.
///
/// The element's table must have `zipcode` and `county` columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodeToCountyMapper;

impl Mapper for ZipCodeToCountyMapper {
    fn name(&self) -> &'static str {
        "zipCodeToCounty"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 1..=1)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let table = match table_of(element) {
            Ok(table) => table,
            Err(result) => return result,
        };
        let Some(zip) = args.first().and_then(|arg| value_of(values, arg)) else {
            return ElementResult::empty();
        };
        let zip_five: String = zip.trim().chars().take(5).collect();
        ElementResult::new(
            table
                .lookup_value(ZIP_CODE_COLUMN, &zip_five, COUNTY_COLUMN)
                .map(str::to_string),
        )
    }
}

/// `npiLookup(npi, clia, sender_id)`: the element's table column for an ordering provider.
///
/// Rows are matched on the NPI first. Without an NPI, or when the NPI is not
/// in the table, the testing lab CLIA together with the sender id is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpiLookupMapper;

impl Mapper for NpiLookupMapper {
    fn name(&self) -> &'static str {
        "npiLookup"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 3..=3)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let [npi, clia, sender_id] = args else {
            return mapper_error(element, "npiLookup expects an NPI, a CLIA and a sender id");
        };
        let table = match table_of(element) {
            Ok(table) => table,
            Err(result) => return result,
        };
        let lookup_column = match lookup_column(element) {
            Ok(column) => column,
            Err(result) => return result,
        };

        let by_npi = index_entry(values, npi)
            .and_then(|entry| table.lookup_values(&[entry], lookup_column));
        let found = by_npi.or_else(|| {
            let clia = index_entry(values, clia)?;
            let sender_id = index_entry(values, sender_id)?;
            table.lookup_values(&[clia, sender_id], lookup_column)
        });
        ElementResult::new(found.map(str::to_string))
    }
}

/// `lookupSenderValuesets(sender_id, element)`: a sender's free-text value translated
/// through the element's table.
///
/// The table has `sender_id`, `element_name` and `free_text_substring`
/// columns; the result comes from the element's table column. Rows for the
/// sender win over rows for `all` senders.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupSenderValuesetsMapper;

impl Mapper for LookupSenderValuesetsMapper {
    fn name(&self) -> &'static str {
        "lookupSenderValuesets"
    }

    fn value_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, SchemaError> {
        expect_args(self.name(), args, 2..=2)?;
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        element: &Element,
        args: &[String],
        values: &[ElementAndValue],
        _sender: Option<&SenderContext>,
    ) -> ElementResult {
        let [sender_id, source] = args else {
            return mapper_error(element, "lookupSenderValuesets expects a sender id and a value");
        };
        let table = match table_of(element) {
            Ok(table) => table,
            Err(result) => return result,
        };
        let lookup_column = match lookup_column(element) {
            Ok(column) => column,
            Err(result) => return result,
        };
        let Some(text) = value_of(values, source) else {
            return ElementResult::empty();
        };
        let text = text.trim();

        let translate = |sender: &str| {
            table.lookup_values(
                &[
                    (SENDER_ID_COLUMN, sender),
                    (ELEMENT_NAME_COLUMN, element.name.as_str()),
                    (FREE_TEXT_COLUMN, text),
                ],
                lookup_column,
            )
        };
        let found = value_of(values, sender_id)
            .and_then(|sender| translate(sender.trim()))
            .or_else(|| translate(ALL_SENDERS));
        ElementResult::new(found.map(str::to_string))
    }
}
