use std::fmt;

/// Static description of one mock table
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub foreign_keys: &'static [ForeignKeyDef],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub primary_key: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing integer key
    Serial,
    Integer,
    Double,
    Text,
    VarChar(u16),
    Date,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub column: &'static str,
    pub references: &'static str,
    pub referenced_column: &'static str,
    pub on_delete: OnDelete,
}

/// What happens to referencing rows when the referenced row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

impl ColumnDef {
    pub const fn key(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            primary_key: true,
        }
    }

    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            primary_key: false,
        }
    }
}

impl ForeignKeyDef {
    pub const fn new(
        column: &'static str,
        references: &'static str,
        referenced_column: &'static str,
        on_delete: OnDelete,
    ) -> Self {
        Self {
            column,
            references,
            referenced_column,
            on_delete,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Serial => write!(f, "SERIAL"),
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Double => write!(f, "DOUBLE PRECISION"),
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::VarChar(len) => write!(f, "VARCHAR({})", len),
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

impl fmt::Display for OnDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnDelete::Cascade => write!(f, "CASCADE"),
            OnDelete::SetNull => write!(f, "SET NULL"),
        }
    }
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Tables this one references, excluding itself
    pub fn depends_on(&self) -> Vec<&'static str> {
        let mut deps: Vec<&'static str> = self
            .foreign_keys
            .iter()
            .map(|fk| fk.references)
            .filter(|t| *t != self.name)
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// True when deleting a row of `parent` deletes the referencing rows of
    /// this table.
    pub fn is_owned_by(&self, parent: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.references == parent && fk.on_delete == OnDelete::Cascade)
    }

    pub fn create_sql(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut line = format!("    {} {}", quote_ident(c.name), c.column_type);
                if c.primary_key {
                    line.push_str(" PRIMARY KEY");
                }
                line
            })
            .collect();

        for fk in self.foreign_keys {
            lines.push(format!(
                "    FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
                quote_ident(fk.column),
                quote_ident(fk.references),
                quote_ident(fk.referenced_column),
                fk.on_delete
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            quote_ident(self.name),
            lines.join(",\n")
        )
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(self.name))
    }
}

/// Double-quote an identifier so mixed-case names survive
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: TableDef = TableDef {
        name: "users",
        columns: &[
            ColumnDef::key("id", ColumnType::Serial),
            ColumnDef::new("Email", ColumnType::VarChar(255)),
        ],
        foreign_keys: &[],
    };

    const POSTS: TableDef = TableDef {
        name: "posts",
        columns: &[
            ColumnDef::key("id", ColumnType::Serial),
            ColumnDef::new("user_id", ColumnType::Integer),
            ColumnDef::new("parent_id", ColumnType::Integer),
        ],
        foreign_keys: &[
            ForeignKeyDef::new("user_id", "users", "id", OnDelete::Cascade),
            ForeignKeyDef::new("parent_id", "posts", "id", OnDelete::SetNull),
        ],
    };

    #[test]
    fn test_create_sql() {
        let sql = POSTS.create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"posts\" ("));
        assert!(sql.contains("\"id\" SERIAL PRIMARY KEY"));
        assert!(sql.contains(
            "FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\") ON DELETE CASCADE"
        ));
        assert!(sql.contains("ON DELETE SET NULL"));
    }

    #[test]
    fn test_mixed_case_columns_are_quoted() {
        assert!(USERS.create_sql().contains("\"Email\" VARCHAR(255)"));
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_depends_on_skips_self_reference() {
        assert_eq!(POSTS.depends_on(), vec!["users"]);
        assert!(USERS.depends_on().is_empty());
    }

    #[test]
    fn test_is_owned_by() {
        assert!(POSTS.is_owned_by("users"));
        assert!(!USERS.is_owned_by("posts"));
    }

    #[test]
    fn test_primary_key_lookup() {
        assert_eq!(USERS.primary_key().map(|c| c.name), Some("id"));
        assert!(POSTS.column("user_id").is_some());
        assert!(POSTS.column("missing").is_none());
    }
}
