use serde::{Deserialize, Serialize};

use crate::Element;

/// A named, ordered collection of elements describing one report layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub topic: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Name of a schema whose elements this one inherits.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Schema {
    pub fn new(name: impl Into<String>, topic: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            topic: topic.into(),
            description: None,
            extends: None,
            elements,
        }
    }

    pub fn find_element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.name == name)
    }

    /// Finds an element by its primary CSV header, ignoring case.
    pub fn find_element_by_csv_name(&self, csv_name: &str) -> Option<&Element> {
        self.elements.iter().find(|element| {
            element
                .csv_fields
                .as_ref()
                .and_then(|fields| fields.first())
                .is_some_and(|field| field.name.eq_ignore_ascii_case(csv_name))
        })
    }

    pub fn contains_element(&self, name: &str) -> bool {
        self.find_element(name).is_some()
    }

    pub fn element_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.elements.iter().map(|element| element.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CsvField, ElementType};

    #[test]
    fn finds_elements_by_name_and_csv_header() {
        let mut id = Element::new("patient_id", ElementType::Text);
        id.csv_fields = Some(vec![CsvField::new("Patient_ID", None)]);
        let schema = Schema::new("covid-19", "covid-19", vec![id, Element::new("a", ElementType::Number)]);

        assert!(schema.contains_element("a"));
        assert!(schema.find_element("b").is_none());
        assert_eq!(
            schema.find_element_by_csv_name("patient_id").map(|e| e.name.as_str()),
            Some("patient_id")
        );
        assert_eq!(schema.element_names().collect::<Vec<_>>(), vec!["patient_id", "a"]);
    }
}
