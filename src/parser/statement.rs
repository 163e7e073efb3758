//! Statements, as seen by the router.

use serde::Serialize;

/// Table referenced by a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Schema, if the name was qualified.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.schema {
            Some(ref schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Row lock requested by a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStrength {
    Update,
    NoKeyUpdate,
    Share,
    KeyShare,
}

/// USE schema, SET SCHEMA, SET search_path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UseStatement {
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectStatement {
    pub tables: Vec<Table>,
    pub lock: Option<LockStrength>,
    /// Calls a function that writes, e.g. `nextval`.
    pub writes: bool,
}

/// INSERT, UPDATE or DELETE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DmlStatement {
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DdlKind {
    Create,
    Alter,
    Drop,
    Truncate,
    Comment,
    Grant,
    Revoke,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DdlStatement {
    pub kind: DdlKind,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Begin,
    Commit,
    Rollback,
    Savepoint,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionStatement {
    pub kind: TransactionKind,
}

/// SET of a session variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetStatement {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowStatement {
    pub name: String,
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "statement", rename_all = "snake_case")]
pub enum Statement {
    Use(UseStatement),
    Select(SelectStatement),
    Insert(DmlStatement),
    Update(DmlStatement),
    Delete(DmlStatement),
    Ddl(DdlStatement),
    Transaction(TransactionStatement),
    Set(SetStatement),
    Show(ShowStatement),
    /// Nothing we know how to route. Holds the leading keyword.
    Unknown { keyword: String },
}

/// What a statement does to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Only reads data, safe on a replica.
    Read,
    /// Modifies data or schema.
    Write,
    /// Session or transaction control, goes where writes go.
    PassThrough,
}

impl Statement {
    /// Read or write, if we can tell.
    pub fn intent(&self) -> Option<Intent> {
        match self {
            Self::Select(select) => {
                if select.lock.is_some() || select.writes {
                    Some(Intent::Write)
                } else {
                    Some(Intent::Read)
                }
            }
            Self::Insert(_) | Self::Update(_) | Self::Delete(_) | Self::Ddl(_) => {
                Some(Intent::Write)
            }
            Self::Use(_) | Self::Transaction(_) | Self::Set(_) | Self::Show(_) => {
                Some(Intent::PassThrough)
            }
            Self::Unknown { .. } => None,
        }
    }

    /// Short name, for logging and errors.
    pub fn name(&self) -> &str {
        match self {
            Self::Use(_) => "use",
            Self::Select(_) => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Ddl(_) => "ddl",
            Self::Transaction(_) => "transaction",
            Self::Set(_) => "set",
            Self::Show(_) => "show",
            Self::Unknown { keyword } => keyword.as_str(),
        }
    }

    /// Tables referenced by the statement.
    pub fn tables(&self) -> &[Table] {
        match self {
            Self::Select(select) => &select.tables,
            Self::Insert(dml) | Self::Update(dml) | Self::Delete(dml) => &dml.tables,
            Self::Ddl(ddl) => &ddl.tables,
            _ => &[],
        }
    }

    /// Mutable tables list, for statements that have one.
    pub fn tables_mut(&mut self) -> Option<&mut Vec<Table>> {
        match self {
            Self::Select(select) => Some(&mut select.tables),
            Self::Insert(dml) | Self::Update(dml) | Self::Delete(dml) => Some(&mut dml.tables),
            Self::Ddl(ddl) => Some(&mut ddl.tables),
            _ => None,
        }
    }
}

/// Statement after all segments have been filled in.
///
/// Owned by the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedStatement {
    statement: Statement,
}

impl EnrichedStatement {
    pub fn new(statement: Statement) -> Self {
        Self { statement }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn statement_mut(&mut self) -> &mut Statement {
        &mut self.statement
    }

    /// Schema this statement switches the session to.
    pub fn active_schema(&self) -> Option<&str> {
        match self.statement {
            Statement::Use(ref use_statement) => use_statement.schema.as_deref(),
            _ => None,
        }
    }

    pub fn intent(&self) -> Option<Intent> {
        self.statement.intent()
    }
}

impl From<Statement> for EnrichedStatement {
    fn from(statement: Statement) -> Self {
        Self::new(statement)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_intent() {
        let select = Statement::Select(SelectStatement::default());
        assert_eq!(select.intent(), Some(Intent::Read));

        let locked = Statement::Select(SelectStatement {
            lock: Some(LockStrength::Share),
            ..Default::default()
        });
        assert_eq!(locked.intent(), Some(Intent::Write));

        let nextval = Statement::Select(SelectStatement {
            writes: true,
            ..Default::default()
        });
        assert_eq!(nextval.intent(), Some(Intent::Write));

        let insert = Statement::Insert(DmlStatement::default());
        assert_eq!(insert.intent(), Some(Intent::Write));

        let begin = Statement::Transaction(TransactionStatement {
            kind: TransactionKind::Begin,
        });
        assert_eq!(begin.intent(), Some(Intent::PassThrough));

        let unknown = Statement::Unknown {
            keyword: "vacuum".into(),
        };
        assert_eq!(unknown.intent(), None);
        assert_eq!(unknown.name(), "vacuum");
    }

    #[test]
    fn test_active_schema() {
        let statement = EnrichedStatement::new(Statement::Use(UseStatement {
            schema: Some("sales".into()),
        }));
        assert_eq!(statement.active_schema(), Some("sales"));

        let statement = EnrichedStatement::new(Statement::Select(SelectStatement::default()));
        assert_eq!(statement.active_schema(), None);
    }
}
