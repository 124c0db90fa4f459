use crate::context::LiteralMode;
use crate::dialect::Database;
use crate::error::{CompileError, CompileResult};
use crate::ident::QuoteMode;
use chrono::FixedOffset;
use serde::Deserialize;

/// Configuration of a [`Compiler`](crate::Compiler).
///
/// Can be built in code or loaded from TOML:
///
/// ```toml
/// database = "MySql"
/// zone_offset_seconds = 28800
/// literal_mode = "PreferLiteral"
/// manage_visible = true
/// log_sql_max_len = 500
/// identifier_quoting = "Always"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Target product.
    pub database: Database,
    /// Zone offset of managed timestamps, in seconds east of UTC.
    pub zone_offset_seconds: i32,
    pub literal_mode: LiteralMode,
    /// Set `visible = TRUE` on inserted rows that leave it empty.
    pub manage_visible: bool,
    /// Truncate logged SQL to this many bytes. `None` logs it whole.
    pub log_sql_max_len: Option<usize>,
    pub identifier_quoting: QuoteMode,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            database: Database::default(),
            zone_offset_seconds: 0,
            literal_mode: LiteralMode::default(),
            manage_visible: true,
            log_sql_max_len: Some(200),
            identifier_quoting: QuoteMode::default(),
        }
    }
}

impl CompilerConfig {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> CompileResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.zone()?;
        Ok(config)
    }

    pub fn with_zone_offset_seconds(mut self, seconds: i32) -> Self {
        self.zone_offset_seconds = seconds;
        self
    }

    pub fn with_literal_mode(mut self, mode: LiteralMode) -> Self {
        self.literal_mode = mode;
        self
    }

    pub fn with_manage_visible(mut self, manage: bool) -> Self {
        self.manage_visible = manage;
        self
    }

    pub fn with_log_sql_max_len(mut self, max: Option<usize>) -> Self {
        self.log_sql_max_len = max;
        self
    }

    pub fn with_identifier_quoting(mut self, mode: QuoteMode) -> Self {
        self.identifier_quoting = mode;
        self
    }

    /// Zone of managed timestamps.
    pub fn zone(&self) -> CompileResult<FixedOffset> {
        FixedOffset::east_opt(self.zone_offset_seconds).ok_or_else(|| {
            CompileError::Config(format!(
                "zone offset {} seconds is out of range",
                self.zone_offset_seconds
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.database, Database::PostgreSql);
        assert_eq!(config.literal_mode, LiteralMode::Bind);
        assert_eq!(config.log_sql_max_len, Some(200));
        assert!(config.manage_visible);
    }

    #[test]
    fn from_toml_overrides_some_keys() {
        let config = CompilerConfig::from_toml_str(
            r#"
            database = "MySql"
            zone_offset_seconds = 28800
            literal_mode = "PreferLiteral"
            identifier_quoting = "Always"
            "#,
        )
        .unwrap();
        assert_eq!(config.database, Database::MySql);
        assert_eq!(config.zone().unwrap().local_minus_utc(), 28800);
        assert_eq!(config.literal_mode, LiteralMode::PreferLiteral);
        assert_eq!(config.identifier_quoting, QuoteMode::Always);
        assert_eq!(config.log_sql_max_len, Some(200));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            CompilerConfig::from_toml_str("zone_offset_seconds = 999999"),
            Err(CompileError::Config(_))
        ));
        assert!(CompilerConfig::from_toml_str("unknown_key = 1").is_err());
        assert!(CompilerConfig::from_toml_str("database = \"Db2\"").is_err());
    }
}
