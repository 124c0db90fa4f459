use super::keywords;
use super::{Database, Dialect};
use crate::ast::{Lock, LockMode, LockWait};
use crate::error::CompileResult;

/// H2 2.x
#[derive(Debug, Clone, Copy, Default)]
pub struct H2;

impl Dialect for H2 {
    fn database(&self) -> Database {
        Database::H2
    }

    fn is_reserved(&self, word: &str) -> bool {
        keywords::is_reserved(keywords::H2, word)
    }

    fn write_placeholder(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    fn set_clause_table_alias(&self) -> bool {
        true
    }

    fn supports_lateral(&self) -> bool {
        false
    }

    fn write_lock(&self, out: &mut String, lock: &Lock) -> CompileResult<()> {
        if lock.mode == LockMode::Share {
            return Err(self.unsupported("FOR SHARE"));
        }
        if lock.wait != LockWait::Wait {
            return Err(self.unsupported("lock wait option"));
        }
        out.push_str(" FOR UPDATE");
        Ok(())
    }
}
