//! `cache(key: k, operation: f, ttl: d)` - memoize `operation` under `key`.

use ori_ir::{Name, PatternKind};

use crate::PatternDefinition;

#[derive(Clone, Copy)]
pub struct CachePattern;

impl PatternDefinition for CachePattern {
    fn kind(&self) -> PatternKind {
        PatternKind::Cache
    }

    fn required_props(&self) -> &'static [&'static str] {
        &["key", "operation"]
    }

    fn optional_props(&self) -> &'static [&'static str] {
        &["ttl"]
    }

    fn capabilities(&self) -> &'static [Name] {
        &[Name::CACHE]
    }
}
