//! Extract a statement skeleton and its segments from SQL text.
//!
//! This is not a SQL grammar. It recognizes the statement by its leading
//! keyword and pulls out the few things routing cares about: schema
//! switches, table references, row locks and function calls.

use super::{
    segment::{FunctionSegment, Identifier, LockSegment, SchemaSegment, Segment, TableSegment},
    statement::*,
    Error, Lexer, ParseTree, Token,
};

/// Words that can't be a table name or alias.
const RESERVED: &[&str] = &[
    "select", "from", "where", "join", "inner", "left", "right", "full", "outer", "cross",
    "natural", "lateral", "on", "using", "group", "order", "having", "limit", "offset", "for",
    "union", "except", "intersect", "as", "set", "values", "returning", "window", "fetch", "lock",
    "into", "only", "default", "conflict", "do", "update", "delete", "insert",
];

/// Parse a query.
///
/// A query with several statements is routed as the statement needing
/// the primary the most: unknown first, then writes, then session commands.
/// Segments of all statements are kept, in order.
pub fn parse(sql: &str) -> Result<ParseTree, Error> {
    let tokens = Lexer::new(sql).lex()?;
    let mut trees = tokens
        .split(|token| matches!(token, Token::End))
        .filter(|tokens| !tokens.is_empty())
        .map(|tokens| QueryParser::new(tokens.to_vec()).parse());

    let mut tree = match trees.next() {
        Some(tree) => tree?,
        None => return Err(Error::Empty),
    };

    for next in trees {
        let next = next?;
        if weight(&next.statement) > weight(&tree.statement) {
            tree.statement = next.statement;
        }
        tree.segments.extend(next.segments);
    }

    Ok(tree)
}

fn weight(statement: &Statement) -> u8 {
    match statement.intent() {
        None => 3,
        Some(Intent::Write) => 2,
        Some(Intent::PassThrough) => 1,
        Some(Intent::Read) => 0,
    }
}

#[derive(Debug)]
struct QueryParser {
    tokens: Vec<Token>,
    position: usize,
    segments: Vec<Box<dyn Segment>>,
}

impl QueryParser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            segments: vec![],
        }
    }

    fn parse(mut self) -> Result<ParseTree, Error> {
        while matches!(self.peek(), Some(Token::LeftParen)) {
            self.position += 1;
        }

        let keyword = match self.next() {
            Some(Token::Word(word)) => word.to_ascii_lowercase(),
            None => return Err(Error::Empty),
            Some(token) => return Err(Error::Syntax(format!("unexpected {:?}", token))),
        };

        let statement = match keyword.as_str() {
            "use" => self.use_schema()?,
            "set" => self.set(),
            "select" | "values" | "table" => {
                let statement = if self.select_into() {
                    create_table()
                } else {
                    Statement::Select(SelectStatement::default())
                };
                self.scan();
                statement
            }
            "with" => self.with(),
            "insert" | "replace" => {
                self.scan();
                Statement::Insert(DmlStatement::default())
            }
            "update" => {
                self.skip_keywords(&["only"]);
                self.table_reference();
                self.scan();
                Statement::Update(DmlStatement::default())
            }
            "delete" => {
                self.scan();
                Statement::Delete(DmlStatement::default())
            }
            "create" => self.ddl(DdlKind::Create),
            "alter" => self.ddl(DdlKind::Alter),
            "drop" => self.ddl(DdlKind::Drop),
            "truncate" => self.ddl(DdlKind::Truncate),
            "comment" => self.ddl(DdlKind::Comment),
            "grant" => self.ddl(DdlKind::Grant),
            "revoke" => self.ddl(DdlKind::Revoke),
            "begin" | "start" => transaction(TransactionKind::Begin),
            "commit" | "end" => transaction(TransactionKind::Commit),
            "rollback" | "abort" => transaction(TransactionKind::Rollback),
            "savepoint" => transaction(TransactionKind::Savepoint),
            "release" => transaction(TransactionKind::Release),
            "show" => Statement::Show(ShowStatement {
                name: match self.next() {
                    Some(Token::Word(word)) => word.to_ascii_lowercase(),
                    _ => String::new(),
                },
            }),
            _ => Statement::Unknown { keyword },
        };

        Ok(ParseTree {
            statement,
            segments: self.segments,
        })
    }

    /// USE schema
    fn use_schema(&mut self) -> Result<Statement, Error> {
        match self.next().and_then(identifier) {
            Some(identifier) => {
                self.segments.push(Box::new(SchemaSegment { identifier }));
                Ok(Statement::Use(UseStatement::default()))
            }
            None => Err(Error::Syntax("USE without a schema".into())),
        }
    }

    /// SET SCHEMA 'schema', SET search_path TO schema, or any other SET.
    fn set(&mut self) -> Statement {
        self.skip_keywords(&["session", "local"]);

        let name = match self.next() {
            Some(Token::Word(word)) => word.to_ascii_lowercase(),
            _ => String::new(),
        };

        match name.as_str() {
            "schema" => {
                if let Some(identifier) = self.next().and_then(identifier) {
                    self.segments.push(Box::new(SchemaSegment { identifier }));
                    return Statement::Use(UseStatement::default());
                }
            }

            "search_path" => {
                self.skip_keywords(&["to"]);
                if matches!(self.peek(), Some(Token::Equals)) {
                    self.position += 1;
                }

                // First schema in the path that isn't resolved per user.
                while let Some(token) = self.next() {
                    if token.is_keyword("default") {
                        break;
                    }
                    if let Some(identifier) = identifier(token) {
                        if identifier.value != "$user" {
                            self.segments.push(Box::new(SchemaSegment { identifier }));
                            return Statement::Use(UseStatement::default());
                        }
                    }
                }
            }

            _ => (),
        }

        Statement::Set(SetStatement { name })
    }

    /// WITH ... reads unless one of the queries writes.
    fn with(&mut self) -> Statement {
        let mut previous: Option<&Token> = None;
        let mut statement = Statement::Select(SelectStatement::default());

        for token in &self.tokens[self.position..] {
            let after_lock = previous
                .map(|p| p.is_keyword("for") || p.is_keyword("key"))
                .unwrap_or(false);

            if token.is_keyword("insert") {
                statement = Statement::Insert(DmlStatement::default());
                break;
            } else if token.is_keyword("update") && !after_lock {
                statement = Statement::Update(DmlStatement::default());
                break;
            } else if token.is_keyword("delete") {
                statement = Statement::Delete(DmlStatement::default());
                break;
            }

            previous = Some(token);
        }

        if matches!(statement, Statement::Select(_)) && self.select_into() {
            statement = create_table();
        }

        self.scan();
        statement
    }

    /// SELECT ... INTO table creates the table.
    fn select_into(&self) -> bool {
        self.tokens[self.position..]
            .iter()
            .any(|token| token.is_keyword("into"))
    }

    fn ddl(&mut self, kind: DdlKind) -> Statement {
        if kind == DdlKind::Truncate {
            self.skip_keywords(&["table", "only"]);
            self.table_list();
        } else if let Some(offset) = self.tokens[self.position..]
            .iter()
            .position(|t| t.is_keyword("table"))
        {
            self.position += offset + 1;
            self.skip_keywords(&["if", "not", "exists", "only"]);
            self.table_reference();
        }

        Statement::Ddl(DdlStatement {
            kind,
            tables: vec![],
        })
    }

    /// Walk the rest of the statement looking for tables, row locks and function calls.
    fn scan(&mut self) {
        while let Some(token) = self.next() {
            if token.is_keyword("from") || token.is_keyword("join") || token.is_keyword("into") {
                self.table_list();
            } else if token.is_keyword("for") {
                self.lock();
            } else if token.is_keyword("lock")
                && self.peek_keywords(&["in", "share", "mode"])
            {
                self.position += 3;
                self.segments.push(Box::new(LockSegment {
                    strength: LockStrength::Share,
                }));
            } else if let Token::Word(name) = token {
                if matches!(self.peek(), Some(Token::LeftParen)) && !reserved(&name) {
                    self.segments.push(Box::new(FunctionSegment {
                        name: Identifier::new(&name),
                    }));
                }
            }
        }
    }

    /// FOR UPDATE, FOR NO KEY UPDATE, FOR SHARE, FOR KEY SHARE
    fn lock(&mut self) {
        let strength = if self.peek_keywords(&["update"]) {
            self.position += 1;
            LockStrength::Update
        } else if self.peek_keywords(&["no", "key", "update"]) {
            self.position += 3;
            LockStrength::NoKeyUpdate
        } else if self.peek_keywords(&["share"]) {
            self.position += 1;
            LockStrength::Share
        } else if self.peek_keywords(&["key", "share"]) {
            self.position += 2;
            LockStrength::KeyShare
        } else {
            return;
        };

        self.segments.push(Box::new(LockSegment { strength }));
    }

    /// table [AS alias] [, table [AS alias]]...
    fn table_list(&mut self) {
        self.skip_keywords(&["only"]);

        while self.table_reference() {
            if self.peek_keywords(&["as"]) {
                self.position += 2;
            } else if matches!(self.peek(), Some(Token::Word(word)) if !reserved(word)) {
                self.position += 1;
            }

            if matches!(self.peek(), Some(Token::Comma)) {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    /// [schema.]table
    fn table_reference(&mut self) -> bool {
        let first = match self.peek().and_then(table_identifier) {
            Some(first) => first,
            None => return false,
        };
        self.position += 1;

        let qualified = matches!(self.peek(), Some(Token::Dot));
        let second = self.peek_at(1).and_then(table_identifier);

        let segment = match (qualified, second) {
            (true, Some(name)) => {
                self.position += 2;
                TableSegment {
                    owner: Some(first),
                    name,
                }
            }
            _ => TableSegment {
                owner: None,
                name: first,
            },
        };

        self.segments.push(Box::new(segment));
        true
    }

    fn skip_keywords(&mut self, keywords: &[&str]) {
        while let Some(token) = self.peek() {
            if keywords.iter().any(|k| token.is_keyword(k)) {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    /// The next tokens are these keywords, in order.
    fn peek_keywords(&self, keywords: &[&str]) -> bool {
        keywords
            .iter()
            .enumerate()
            .all(|(i, k)| self.peek_at(i).map(|t| t.is_keyword(k)).unwrap_or(false))
    }

    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }
}

fn create_table() -> Statement {
    Statement::Ddl(DdlStatement {
        kind: DdlKind::Create,
        tables: vec![],
    })
}

fn transaction(kind: TransactionKind) -> Statement {
    Statement::Transaction(TransactionStatement { kind })
}

fn reserved(word: &str) -> bool {
    RESERVED.iter().any(|r| word.eq_ignore_ascii_case(r))
}

fn identifier(token: Token) -> Option<Identifier> {
    match token {
        Token::Word(word) => Some(Identifier::new(&word)),
        Token::Entity(entity) | Token::String(entity) => Some(Identifier::quoted(&entity)),
        _ => None,
    }
}

fn table_identifier(token: &Token) -> Option<Identifier> {
    match token {
        Token::Word(word) if !reserved(word) => Some(Identifier::new(word)),
        Token::Entity(entity) => Some(Identifier::quoted(entity)),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::fillers;

    fn enrich(sql: &str) -> Statement {
        fillers().enrich(parse(sql).unwrap()).statement().clone()
    }

    fn tables(sql: &str) -> Vec<String> {
        enrich(sql).tables().iter().map(|t| t.to_string()).collect()
    }

    fn schema(sql: &str) -> Option<String> {
        match enrich(sql) {
            Statement::Use(u) => u.schema,
            statement => panic!("not a use statement: {:?}", statement),
        }
    }

    #[test]
    fn test_use() {
        assert_eq!(schema("USE sales"), Some("sales".into()));
        assert_eq!(schema("use `Sales`;"), Some("Sales".into()));
        assert_eq!(schema("SET SCHEMA 'billing'"), Some("billing".into()));
        assert_eq!(
            schema(r#"SET search_path TO "$user", public"#),
            Some("public".into())
        );
        assert_eq!(schema("set session search_path = app"), Some("app".into()));
        assert!(parse("USE").is_err());
    }

    #[test]
    fn test_set() {
        assert_eq!(
            enrich("SET statement_timeout TO 5000"),
            Statement::Set(SetStatement {
                name: "statement_timeout".into()
            })
        );
        assert_eq!(
            enrich("SET search_path TO DEFAULT"),
            Statement::Set(SetStatement {
                name: "search_path".into()
            })
        );
    }

    #[test]
    fn test_select() {
        assert_eq!(
            tables("SELECT * FROM sales.orders o JOIN users AS u ON o.user_id = u.id"),
            vec!["sales.orders", "users"]
        );
        assert_eq!(tables("select a, b from t1, \"T2\" where a = 1"), vec!["t1", "T2"]);
        assert_eq!(tables("SELECT 1"), Vec::<String>::new());
        assert_eq!(tables("(SELECT id FROM users)"), vec!["users"]);

        assert_eq!(enrich("SELECT 1").intent(), Some(Intent::Read));
    }

    #[test]
    fn test_select_locks() {
        let locks = [
            ("SELECT * FROM users FOR UPDATE", LockStrength::Update),
            ("SELECT * FROM users FOR NO KEY UPDATE", LockStrength::NoKeyUpdate),
            ("SELECT * FROM users FOR SHARE", LockStrength::Share),
            ("SELECT * FROM users FOR KEY SHARE", LockStrength::KeyShare),
            ("SELECT * FROM users LOCK IN SHARE MODE", LockStrength::Share),
        ];

        for (sql, strength) in locks {
            match enrich(sql) {
                Statement::Select(select) => {
                    assert_eq!(select.lock, Some(strength), "{}", sql);
                    assert_eq!(select.tables.len(), 1);
                }
                statement => panic!("not a select: {:?}", statement),
            }
        }
    }

    #[test]
    fn test_dml() {
        let insert = enrich("INSERT INTO sales.orders (id) VALUES (1)");
        assert!(matches!(insert, Statement::Insert(_)));
        assert_eq!(tables("INSERT INTO sales.orders (id) VALUES (1)"), vec!["sales.orders"]);

        assert!(matches!(enrich("UPDATE users SET a = 1"), Statement::Update(_)));
        assert_eq!(
            tables("UPDATE ONLY users SET a = b.a FROM b WHERE users.id = b.id"),
            vec!["users", "b"]
        );

        assert!(matches!(enrich("DELETE FROM users WHERE id = 1"), Statement::Delete(_)));
        assert_eq!(tables("DELETE FROM users WHERE id = 1"), vec!["users"]);
    }

    #[test]
    fn test_select_into() {
        match enrich("SELECT * INTO backup FROM users") {
            Statement::Ddl(ddl) => {
                assert_eq!(ddl.kind, DdlKind::Create);
                let tables = ddl.tables.iter().map(|t| t.to_string()).collect::<Vec<_>>();
                assert_eq!(tables, vec!["backup", "users"]);
            }
            statement => panic!("not ddl: {:?}", statement),
        }

        assert_eq!(
            enrich("WITH t AS (SELECT * FROM users) SELECT * INTO backup FROM t").intent(),
            Some(Intent::Write)
        );
        assert_eq!(
            enrich("SELECT 'into' FROM users").intent(),
            Some(Intent::Read)
        );
    }

    #[test]
    fn test_write_functions() {
        assert_eq!(
            enrich("SELECT nextval('users_id_seq')").intent(),
            Some(Intent::Write)
        );
        assert_eq!(
            enrich("SELECT pg_catalog.setval('users_id_seq', 5)").intent(),
            Some(Intent::Write)
        );
        assert_eq!(
            enrich("SELECT pg_advisory_lock(1)").intent(),
            Some(Intent::Write)
        );
        assert_eq!(
            enrich("SELECT count(*), max(id) FROM users WHERE id IN (1, 2)").intent(),
            Some(Intent::Read)
        );
    }

    #[test]
    fn test_multiple_statements() {
        let statement = enrich("SELECT 1; DELETE FROM users");
        assert!(matches!(statement, Statement::Delete(_)));
        assert_eq!(statement.intent(), Some(Intent::Write));
        assert_eq!(statement.tables()[0].to_string(), "users");

        assert_eq!(
            enrich("SELECT * FROM a; SELECT * FROM b FOR UPDATE").intent(),
            Some(Intent::Write)
        );
        assert_eq!(
            enrich("SELECT * FROM a; SELECT * FROM b;").intent(),
            Some(Intent::Read)
        );
        assert_eq!(
            enrich("BEGIN; UPDATE users SET a = 1; COMMIT"),
            Statement::Update(DmlStatement {
                tables: vec![Table {
                    schema: None,
                    name: "users".into(),
                }]
            })
        );
        assert_eq!(schema("SELECT 1; USE sales"), Some("sales".into()));
        assert_eq!(
            enrich("SELECT 1; VACUUM users"),
            Statement::Unknown {
                keyword: "vacuum".into()
            }
        );
        assert_eq!(
            enrich("SELECT ';'; SELECT 1").intent(),
            Some(Intent::Read)
        );
        assert!(parse("SELECT 1; USE").is_err());
    }

    #[test]
    fn test_with() {
        assert!(matches!(
            enrich("WITH t AS (SELECT * FROM users) SELECT * FROM t"),
            Statement::Select(_)
        ));
        assert_eq!(
            enrich("WITH t AS (SELECT * FROM users FOR UPDATE) SELECT * FROM t").intent(),
            Some(Intent::Write)
        );
        assert!(matches!(
            enrich("WITH d AS (DELETE FROM users RETURNING id) SELECT * FROM d"),
            Statement::Delete(_)
        ));
        assert!(matches!(
            enrich("WITH t AS (INSERT INTO users VALUES (1) RETURNING *) SELECT * FROM t"),
            Statement::Insert(_)
        ));
    }

    #[test]
    fn test_ddl() {
        match enrich("CREATE TABLE IF NOT EXISTS sales.orders (id BIGINT)") {
            Statement::Ddl(ddl) => {
                assert_eq!(ddl.kind, DdlKind::Create);
                assert_eq!(ddl.tables[0].to_string(), "sales.orders");
            }
            statement => panic!("not ddl: {:?}", statement),
        }

        assert_eq!(tables("TRUNCATE TABLE a, b"), vec!["a", "b"]);
        assert!(matches!(enrich("CREATE INDEX ON users (id)"), Statement::Ddl(_)));
        assert_eq!(enrich("DROP TABLE users").intent(), Some(Intent::Write));
    }

    #[test]
    fn test_transaction() {
        let kinds = [
            ("BEGIN", TransactionKind::Begin),
            ("START TRANSACTION", TransactionKind::Begin),
            ("COMMIT", TransactionKind::Commit),
            ("ROLLBACK", TransactionKind::Rollback),
            ("SAVEPOINT a", TransactionKind::Savepoint),
            ("RELEASE SAVEPOINT a", TransactionKind::Release),
        ];

        for (sql, kind) in kinds {
            assert_eq!(enrich(sql), transaction(kind));
            assert_eq!(enrich(sql).intent(), Some(Intent::PassThrough));
        }
    }

    #[test]
    fn test_other() {
        assert_eq!(
            enrich("SHOW transaction_isolation"),
            Statement::Show(ShowStatement {
                name: "transaction_isolation".into()
            })
        );
        assert_eq!(
            enrich("VACUUM users"),
            Statement::Unknown {
                keyword: "vacuum".into()
            }
        );
        assert_eq!(parse("").unwrap_err(), Error::Empty);
        assert_eq!(parse(" ; ").unwrap_err(), Error::Empty);
        assert_eq!(parse("-- nothing").unwrap_err(), Error::Empty);
    }
}
