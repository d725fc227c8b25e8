//! Form field declarations
//!
//! Fields are tagged variants per input kind, each with an optional
//! validation slot receiving the field's value and the whole form. The field
//! sets the portal's upload and trigger forms use are declared here.

use serde_json::Value;
use std::collections::BTreeMap;

/// A submitted form: field name to JSON value
pub type FormValues = serde_json::Map<String, Value>;

/// Validation slot: returns an error message when the value is invalid
pub type ValidateFn = fn(&Value, &FormValues) -> Option<String>;

/// One option of a select or checkbox-group field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value
    pub value: String,
    /// Display name
    pub name: String,
}

impl SelectOption {
    /// An option with distinct value and display name
    pub fn new(value: &str, name: &str) -> Self {
        Self {
            value: value.to_string(),
            name: name.to_string(),
        }
    }

    /// An option displaying its raw value
    pub fn plain(value: &str) -> Self {
        Self::new(value, value)
    }
}

/// Input kind of a form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text input
    Text,
    /// Boolean checkbox
    Checkbox,
    /// Single choice among declared options
    Select {
        /// Allowed options
        options: Vec<SelectOption>,
    },
    /// Multiple choices among declared options
    CheckboxGroup {
        /// Allowed options
        options: Vec<SelectOption>,
    },
    /// A control rendered by the presentation layer, referenced by id
    CustomControl {
        /// Identifier the presentation layer resolves to a component
        component_id: &'static str,
    },
}

/// One declared form field
#[derive(Debug, Clone)]
pub struct FormField {
    /// Field name, the key in the submitted form values
    pub name: &'static str,
    /// Display label
    pub label: &'static str,
    /// Input kind
    pub kind: FieldKind,
    /// Optional validation slot
    pub validate: Option<ValidateFn>,
}

/// Reusable field validators
pub mod validators {
    use super::FormValues;
    use serde_json::Value;

    fn is_empty(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Fails on missing, null, or empty values
    pub fn required(value: &Value, _form: &FormValues) -> Option<String> {
        is_empty(value).then(|| "Required".to_string())
    }
}

/// Validate a form against its declared fields
///
/// Runs each field's validation slot and checks select values against the
/// declared options. Returns all failures keyed by field name.
pub fn validate_form(
    fields: &[FormField],
    values: &FormValues,
) -> std::result::Result<(), BTreeMap<&'static str, String>> {
    let mut errors = BTreeMap::new();

    for field in fields {
        if let Some(validate) = field.validate {
            let value = values.get(field.name).cloned().unwrap_or(Value::Null);
            if let Some(message) = validate(&value, values) {
                errors.insert(field.name, message);
            }
        }
        if let (FieldKind::Select { options }, Some(Value::String(value))) =
            (&field.kind, values.get(field.name))
        {
            if !options.iter().any(|option| &option.value == value) {
                errors
                    .entry(field.name)
                    .or_insert_with(|| format!("Invalid option: {}", value));
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Dataset type for SNV/indel calls
pub const DATASET_TYPE_SNV_INDEL_CALLS: &str = "SNV_INDEL";
/// Dataset type for structural variant calls
pub const DATASET_TYPE_SV_CALLS: &str = "SV";
/// Dataset type for mitochondrial calls
pub const DATASET_TYPE_MITO_CALLS: &str = "MITO";

/// GRCh37 genome build
pub const GENOME_VERSION_37: &str = "37";
/// GRCh38 genome build
pub const GENOME_VERSION_38: &str = "38";

/// Dataset type select, shared by the trigger-delete forms
pub fn dataset_type_field() -> FormField {
    FormField {
        name: "datasetType",
        label: "Dataset Type",
        kind: FieldKind::Select {
            options: vec![
                SelectOption::plain(DATASET_TYPE_SNV_INDEL_CALLS),
                SelectOption::plain(DATASET_TYPE_MITO_CALLS),
                SelectOption::plain(DATASET_TYPE_SV_CALLS),
            ],
        },
        validate: Some(validators::required),
    }
}

fn rna_data_type_field() -> FormField {
    FormField {
        name: "dataType",
        label: "Data Type",
        kind: FieldKind::Select {
            options: vec![
                SelectOption::new("outlier", "Expression Outlier"),
                SelectOption::new("splice_outlier", "Splice Outlier"),
                SelectOption::new("tpm", "Expression (TPM)"),
            ],
        },
        validate: Some(validators::required),
    }
}

fn rna_file_field() -> FormField {
    FormField {
        name: "file",
        label: "RNA-seq data file path",
        kind: FieldKind::Text,
        validate: Some(validators::required),
    }
}

fn tissue_field() -> FormField {
    FormField {
        name: "tissue",
        label: "Tissue",
        kind: FieldKind::Select {
            options: vec![
                SelectOption::new("WB", "Whole Blood"),
                SelectOption::new("F", "Fibroblast"),
                SelectOption::new("M", "Muscle"),
                SelectOption::new("L", "Lymphocyte"),
            ],
        },
        validate: Some(validators::required),
    }
}

/// Fields of the RNA-seq upload form
pub fn load_rna_fields() -> Vec<FormField> {
    vec![rna_data_type_field(), rna_file_field()]
}

/// Fields of the project-page RNA-seq upload form, which additionally
/// captures the sampled tissue
pub fn project_rna_fields() -> Vec<FormField> {
    vec![rna_data_type_field(), tissue_field(), rna_file_field()]
}

fn require_index(value: &Value, form: &FormValues) -> Option<String> {
    validators::required(value, form).map(|_| {
        "Specify the Elasticsearch Index where this callset has been loaded".to_string()
    })
}

fn require_caller_type(value: &Value, form: &FormValues) -> Option<String> {
    validators::required(value, form).map(|_| "Specify the caller type".to_string())
}

/// Fields of the project callset-upload form
pub fn upload_callset_fields() -> Vec<FormField> {
    vec![
        FormField {
            name: "elasticsearchIndex",
            label: "Elasticsearch Index",
            kind: FieldKind::Text,
            validate: Some(require_index),
        },
        FormField {
            name: "datasetType",
            label: "Caller Type",
            kind: FieldKind::Select {
                options: vec![
                    SelectOption::new(DATASET_TYPE_SNV_INDEL_CALLS, "Haplotypecaller"),
                    SelectOption::new(DATASET_TYPE_SV_CALLS, "SV Caller"),
                    SelectOption::new(DATASET_TYPE_MITO_CALLS, "Mitochondria Caller"),
                ],
            },
            validate: Some(require_caller_type),
        },
        FormField {
            name: "mappingFilePath",
            label: "ID Mapping File Path",
            kind: FieldKind::Text,
            validate: None,
        },
        FormField {
            name: "ignoreExtraSamplesInCallset",
            label: "Ignore extra samples in callset",
            kind: FieldKind::Checkbox,
            validate: None,
        },
    ]
}

/// Field of the project-page IGV upload form: the parsed mapping-file upload
pub fn project_igv_fields() -> Vec<FormField> {
    vec![FormField {
        name: "mappingFile",
        label: "IGV file path mappings",
        kind: FieldKind::CustomControl {
            component_id: "igv-file-upload",
        },
        validate: Some(validators::required),
    }]
}

/// Fields of the project-scoped trigger-delete form
pub fn trigger_delete_project_fields() -> Vec<FormField> {
    vec![
        FormField {
            name: "project",
            label: "Project",
            kind: FieldKind::CustomControl {
                component_id: "awesomebar-projects",
            },
            validate: Some(validators::required),
        },
        dataset_type_field(),
    ]
}

/// Fields of the family-scoped trigger-delete form
pub fn trigger_delete_family_fields() -> Vec<FormField> {
    vec![
        FormField {
            name: "family",
            label: "Family",
            kind: FieldKind::CustomControl {
                component_id: "awesomebar-families",
            },
            validate: Some(validators::required),
        },
        dataset_type_field(),
    ]
}

/// Genome build select used by the gene-variant lookup form
pub fn genome_version_field() -> FormField {
    FormField {
        name: "genomeVersion",
        label: "Genome Version",
        kind: FieldKind::Select {
            options: vec![
                SelectOption::new(GENOME_VERSION_37, "GRCh37"),
                SelectOption::new(GENOME_VERSION_38, "GRCh38"),
            ],
        },
        validate: Some(validators::required),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(values: Value) -> FormValues {
        values.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_validator() {
        let empty = FormValues::new();
        assert_eq!(
            validators::required(&Value::Null, &empty),
            Some("Required".to_string())
        );
        assert_eq!(
            validators::required(&json!(""), &empty),
            Some("Required".to_string())
        );
        assert_eq!(validators::required(&json!([]), &empty), Some("Required".to_string()));
        assert_eq!(validators::required(&json!("37"), &empty), None);
        assert_eq!(validators::required(&json!(false), &empty), None);
    }

    #[test]
    fn test_validate_form_collects_all_failures() {
        let fields = trigger_delete_project_fields();
        let errors = validate_form(&fields, &form(json!({}))).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors["project"], "Required");
        assert_eq!(errors["datasetType"], "Required");
    }

    #[test]
    fn test_validate_form_accepts_complete_values() {
        let fields = trigger_delete_family_fields();
        let values = form(json!({"family": "F000001", "datasetType": "SV"}));
        assert!(validate_form(&fields, &values).is_ok());
    }

    #[test]
    fn test_select_rejects_undeclared_option() {
        let fields = vec![genome_version_field()];
        let errors = validate_form(&fields, &form(json!({"genomeVersion": "39"}))).unwrap_err();
        assert_eq!(errors["genomeVersion"], "Invalid option: 39");
    }

    #[test]
    fn test_callset_fields_use_specific_messages() {
        let fields = upload_callset_fields();
        let errors = validate_form(&fields, &form(json!({}))).unwrap_err();

        // the optional mapping-path and ignore-extra fields do not fail
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors["elasticsearchIndex"],
            "Specify the Elasticsearch Index where this callset has been loaded"
        );
        assert_eq!(errors["datasetType"], "Specify the caller type");
    }

    #[test]
    fn test_callset_fields_accept_complete_values() {
        let fields = upload_callset_fields();
        let values = form(json!({
            "elasticsearchIndex": "muscle_callset_v2",
            "datasetType": "SV",
            "ignoreExtraSamplesInCallset": true,
        }));
        assert!(validate_form(&fields, &values).is_ok());
    }

    #[test]
    fn test_project_rna_fields_require_tissue() {
        let fields = project_rna_fields();
        assert_eq!(
            fields.iter().map(|f| f.name).collect::<Vec<_>>(),
            vec!["dataType", "tissue", "file"]
        );

        let values = form(json!({"dataType": "tpm", "file": "gs://b/m.tsv"}));
        let errors = validate_form(&fields, &values).unwrap_err();
        assert_eq!(errors["tissue"], "Required");

        let values = form(json!({"dataType": "tpm", "tissue": "M", "file": "gs://b/m.tsv"}));
        assert!(validate_form(&fields, &values).is_ok());
    }

    #[test]
    fn test_project_igv_field_requires_parsed_mapping() {
        let fields = project_igv_fields();
        let errors = validate_form(&fields, &form(json!({}))).unwrap_err();
        assert_eq!(errors["mappingFile"], "Required");

        let values = form(json!({"mappingFile": {"updates": []}}));
        assert!(validate_form(&fields, &values).is_ok());
    }

    #[test]
    fn test_checkbox_group_field_is_constructible() {
        let field = FormField {
            name: "tissues",
            label: "Tissues",
            kind: FieldKind::CheckboxGroup {
                options: vec![SelectOption::plain("muscle"), SelectOption::plain("fibroblast")],
            },
            validate: Some(validators::required),
        };
        let errors = validate_form(std::slice::from_ref(&field), &form(json!({"tissues": []})))
            .unwrap_err();
        assert_eq!(errors["tissues"], "Required");

        let values = form(json!({"tissues": ["muscle"]}));
        assert!(validate_form(std::slice::from_ref(&field), &values).is_ok());
    }
}
