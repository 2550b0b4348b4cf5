use crate::record::Record;

/// Property the generated SQL uses as primary key.
pub const KEY_FIELD: &str = "ID";

/// Everything needed to generate a CRUD class: its name, properties and table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    pub class_name: String,
    pub fields: Vec<String>,
    pub table_name: String,
}

impl ClassDefinition {
    pub fn for_record<R: Record>() -> Self {
        Self {
            class_name: R::CLASS_NAME.to_string(),
            fields: R::COLUMNS.iter().map(|column| column.to_string()).collect(),
            table_name: R::TABLE_NAME.to_string(),
        }
    }

    pub fn output_file_name(&self) -> String {
        format!("{}.php", self.class_name)
    }

    pub fn lowercase_name(&self) -> String {
        self.class_name.to_ascii_lowercase()
    }

    pub fn key_field(&self) -> &'static str {
        KEY_FIELD
    }

    pub fn has_key_field(&self) -> bool {
        self.fields.iter().any(|field| field == KEY_FIELD)
    }

    /// Fields written by insert and update, i.e. everything except the key.
    pub fn value_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(|field| field.as_str())
            .filter(|field| *field != KEY_FIELD)
    }
}
