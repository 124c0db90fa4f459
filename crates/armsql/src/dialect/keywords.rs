//! Reserved words that force identifier quoting.

/// Words reserved by every supported product.
const COMMON: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP",
    "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END", "EXISTS", "FALSE", "FOR",
    "FOREIGN", "FROM", "FULL", "GRANT", "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTERSECT",
    "INTO", "IS", "JOIN", "LEFT", "LIKE", "NOT", "NULL", "ON", "OR", "ORDER", "OUTER", "PRIMARY",
    "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO", "TRUE", "UNION", "UNIQUE",
    "UPDATE", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

pub(super) const MYSQL: &[&str] = &[
    "CHANGE", "DATABASE", "DIV", "DUAL", "IGNORE", "INDEX", "INTERVAL", "KEY", "KEYS", "KILL",
    "LIMIT", "LOCK", "MOD", "RANGE", "READ", "REGEXP", "RENAME", "REPLACE", "RLIKE", "ROW",
    "ROWS", "SCHEMA", "SHOW", "STATUS", "TRIGGER", "USE", "XOR",
];

pub(super) const POSTGRES: &[&str] = &[
    "ANALYSE", "ANALYZE", "ARRAY", "ASYMMETRIC", "BOTH", "CAST", "COLLATE", "CURRENT_ROLE",
    "CURRENT_USER", "DEFERRABLE", "DO", "FETCH", "ILIKE", "INITIALLY", "LATERAL", "LEADING",
    "LIMIT", "LOCALTIME", "LOCALTIMESTAMP", "OFFSET", "ONLY", "PLACING", "RETURNING",
    "SESSION_USER", "SOME", "SYMMETRIC", "TRAILING", "USER", "VARIADIC", "WINDOW",
];

pub(super) const ORACLE: &[&str] = &[
    "ACCESS", "AUDIT", "CLUSTER", "COMMENT", "COMPRESS", "CONNECT", "DATE", "FILE", "IDENTIFIED",
    "INCREMENT", "INDEX", "LEVEL", "LOCK", "LONG", "MINUS", "MODE", "NOWAIT", "NUMBER", "OF",
    "OFFLINE", "ONLINE", "OPTION", "PRIOR", "RAW", "RESOURCE", "ROW", "ROWID", "ROWNUM", "ROWS",
    "SESSION", "SHARE", "SIZE", "START", "SYNONYM", "SYSDATE", "UID", "USER", "VALIDATE", "VIEW",
];

pub(super) const H2: &[&str] = &[
    "ARRAY", "CURRENT_USER", "FETCH", "IF", "ILIKE", "INTERVAL", "KEY", "LIMIT", "MINUS",
    "OFFSET", "QUALIFY", "REGEXP", "ROW", "ROWNUM", "SYSDATE", "TOP", "VALUE", "_ROWID_",
];

pub(super) const SQLITE: &[&str] = &[
    "ABORT", "ATTACH", "AUTOINCREMENT", "COLLATE", "COMMIT", "DEFERRABLE", "DETACH", "ESCAPE",
    "EXCEPT", "GLOB", "INDEX", "ISNULL", "LIMIT", "NOTNULL", "OFFSET", "PRAGMA", "RAISE",
    "REGEXP", "RETURNING", "TEMP", "TEMPORARY", "TRANSACTION", "VACUUM",
];

/// Whether `word` is a common or product-specific reserved word.
pub(super) fn is_reserved(extra: &[&str], word: &str) -> bool {
    COMMON
        .iter()
        .chain(extra.iter())
        .any(|k| k.eq_ignore_ascii_case(word))
}
