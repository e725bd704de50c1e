use curtain_common::{
    CONTENT_ID_COLUMN, FIRES_AT_COLUMN, JOBS_TABLE_NAME, KIND_COLUMN, POLICY_TABLE_NAME,
};

/// Represents table in a database, used for ddl generation
pub struct Table {
    pub name: &'static str,
    pub columns: Vec<Column>,
    pub primary_key: Vec<&'static str>,
}

/// Represents one column in the database table
pub struct Column {
    pub name: &'static str,
    pub column_type: &'static str,
    pub not_null: bool,
    pub default_value: Option<&'static str>,
    pub check: Option<&'static str>,
}

impl Column {
    pub fn new(name: &'static str, column_type: &'static str, not_null: bool) -> Self {
        Self {
            name,
            column_type,
            not_null,
            default_value: None,
            check: None,
        }
    }

    pub fn with_default(mut self, default_value: &'static str) -> Self {
        self.default_value = Some(default_value);
        self
    }

    pub fn with_check(mut self, check: &'static str) -> Self {
        self.check = Some(check);
        self
    }
}

/// The tables this service owns.
///
/// `purge_jobs` holds one row per scheduled purge; the primary key is the
/// exact triple jobs are cancelled and removed by, so a duplicate job cannot
/// even be stored. `visibility_policy` is a single-row table; its absence of
/// a row means "never configured".
pub fn service_tables() -> Vec<Table> {
    vec![
        Table {
            name: JOBS_TABLE_NAME,
            columns: vec![
                Column::new(CONTENT_ID_COLUMN, "TEXT", true),
                Column::new(KIND_COLUMN, "TEXT", true),
                Column::new(FIRES_AT_COLUMN, "TIMESTAMPTZ", true),
            ],
            primary_key: vec![CONTENT_ID_COLUMN, KIND_COLUMN, FIRES_AT_COLUMN],
        },
        Table {
            name: POLICY_TABLE_NAME,
            columns: vec![
                Column::new("id", "BOOLEAN", true)
                    .with_default("TRUE")
                    .with_check("id"),
                Column::new("allowed_bypass_roles", "JSONB", false),
                Column::new("purge_scheduling_enabled", "BOOLEAN", true).with_default("TRUE"),
            ],
            primary_key: vec!["id"],
        },
    ]
}

pub fn create_table_ddl(table: &Table) -> String {
    let mut definitions: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            let mut definition = format!("{} {}", column.name, column.column_type);
            if column.not_null {
                definition.push_str(" NOT NULL");
            }
            if let Some(default_value) = column.default_value {
                definition.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(check) = column.check {
                definition.push_str(&format!(" CHECK ({})", check));
            }
            definition
        })
        .collect();

    definitions.push(format!("PRIMARY KEY ({})", table.primary_key.join(", ")));

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        table.name,
        definitions.join(",\n    ")
    )
}
