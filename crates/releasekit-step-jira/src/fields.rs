//! Field metadata model
//!
//! Describes one remote field definition and classifies it for eligibility
//! in generic update operations. Descriptors are built once from the
//! `/rest/api/2/field` payload and cached per connection.

use releasekit_step_api::{
    StepError,
    StepResult,
};

use crate::types::RemoteField;

/// Element types the update builder knows how to package.
///
/// Fields with any other element type are present but unusable by the
/// generic modification mechanism; selection UIs filter them out rather
/// than failing.
pub const SUPPORTED_ELEMENT_TYPES: [&str; 4] = ["any", "number", "string", "version"];

/// Metadata of one JIRA field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The internal name (id) of the field
    pub id: String,
    /// The human-readable name of the field
    pub name: String,
    /// Whether the field holds an array of values
    pub array: bool,
    /// Whether the field accepts updates at all
    pub modifiable: bool,
    /// The type of the field, or of its elements if it is an array
    pub element_type: Option<String>,
}

impl From<RemoteField> for FieldDescriptor {
    fn from(field: RemoteField) -> Self {
        match field.schema {
            Some(schema) => {
                let array = schema.field_type.eq_ignore_ascii_case("array");
                let element_type = if array {
                    schema.items
                } else {
                    Some(schema.field_type)
                };
                Self {
                    id: field.id,
                    name: field.name,
                    array,
                    modifiable: true,
                    element_type,
                }
            }
            // No schema means the server exposes the field read-only
            None => Self {
                id: field.id,
                name: field.name,
                array: false,
                modifiable: false,
                element_type: None,
            },
        }
    }
}

impl FieldDescriptor {
    pub fn element_type(&self) -> &str {
        self.element_type.as_deref().unwrap_or("")
    }

    /// Whether the field can be offered for generic set/add/remove edits.
    pub fn supports_generic_edit(&self) -> bool {
        self.modifiable && SUPPORTED_ELEMENT_TYPES.contains(&self.element_type())
    }
}

/// Finds a field by its human-readable name, case-insensitively.
pub fn find_field<'a>(
    fields: &'a [FieldDescriptor], name: &str,
) -> StepResult<&'a FieldDescriptor> {
    fields
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| StepError::Validation(format!("Field \"{name}\" does not exist")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldSchema;

    fn remote(id: &str, name: &str, schema: Option<FieldSchema>) -> RemoteField {
        RemoteField {
            id: id.to_string(),
            name: name.to_string(),
            schema,
        }
    }

    #[test]
    fn test_scalar_field() {
        let descriptor = FieldDescriptor::from(remote(
            "summary",
            "Summary",
            Some(FieldSchema {
                field_type: "string".to_string(),
                items: None,
            }),
        ));
        assert!(!descriptor.array);
        assert!(descriptor.modifiable);
        assert_eq!(descriptor.element_type(), "string");
        assert!(descriptor.supports_generic_edit());
    }

    #[test]
    fn test_array_field_takes_items_as_element_type() {
        let descriptor = FieldDescriptor::from(remote(
            "versions",
            "Affects Version/s",
            Some(FieldSchema {
                field_type: "array".to_string(),
                items: Some("version".to_string()),
            }),
        ));
        assert!(descriptor.array);
        assert_eq!(descriptor.element_type(), "version");
        assert!(descriptor.supports_generic_edit());
    }

    #[test]
    fn test_missing_schema_means_not_modifiable() {
        let descriptor = FieldDescriptor::from(remote("thumbnail", "Images", None));
        assert!(!descriptor.modifiable);
        assert!(!descriptor.supports_generic_edit());
    }

    #[test]
    fn test_unsupported_element_type_is_filtered_not_fatal() {
        let descriptor = FieldDescriptor::from(remote(
            "watchers",
            "Watchers",
            Some(FieldSchema {
                field_type: "watches".to_string(),
                items: None,
            }),
        ));
        assert!(descriptor.modifiable);
        assert!(!descriptor.supports_generic_edit());
    }

    #[test]
    fn test_find_field_is_case_insensitive() {
        let fields = vec![FieldDescriptor::from(remote(
            "labels",
            "Labels",
            Some(FieldSchema {
                field_type: "array".to_string(),
                items: Some("string".to_string()),
            }),
        ))];
        assert_eq!(find_field(&fields, "labels").unwrap().id, "labels");
        let err = find_field(&fields, "Sprint").unwrap_err();
        assert!(err.to_string().contains("Sprint"));
    }
}
