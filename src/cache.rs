//! Two independent caches sit in front of the rule engine:
//!
//! - [`ParseCache`]: a bounded, process-wide cache of parsed statements
//!   keyed by SQL text, so identical SQL is never re-parsed. Same eviction
//!   strategy as the rest of this codebase's caches: clear half when full.
//! - [`DedupFilter`]: a per-thread, TTL-bounded cache of *validation
//!   outcomes* keyed by SQL text, so a hot loop re-validating the same
//!   statement doesn't re-run the full rule catalog every time within a
//!   short window.
//!
//! The two are deliberately separate: the parse cache is about avoiding
//! redundant parsing and is safe to share across threads; the dedup filter
//! is about avoiding redundant *rule execution* and is scoped per-thread so
//! one caller's dedup window can never suppress another thread's checks.

use std::{
    cell::RefCell,
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
    sync::{LazyLock, RwLock},
    time::{Duration, Instant}
};

use crate::{parser::ParsedStatement, result::RiskLevel};

static PARSE_CACHE: LazyLock<RwLock<ParseCache>> =
    LazyLock::new(|| RwLock::new(ParseCache::new(1000)));

/// Process-wide cache of already-parsed statements, keyed by a hash of the
/// raw SQL text.
pub struct ParseCache {
    entries:  HashMap<u64, ParsedStatement>,
    max_size: usize
}

impl ParseCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(max_size),
            max_size
        }
    }

    fn hash_key(sql: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        sql.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&self, sql: &str) -> Option<ParsedStatement> {
        self.entries.get(&Self::hash_key(sql)).cloned()
    }

    /// Insert a parsed statement, clearing half the cache when full.
    pub fn insert(&mut self, sql: &str, statement: ParsedStatement) {
        if self.entries.len() >= self.max_size {
            let keys: Vec<_> = self.entries.keys().take(self.max_size / 2).copied().collect();
            for key in keys {
                self.entries.remove(&key);
            }
        }
        self.entries.insert(Self::hash_key(sql), statement);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse `sql` under `dialect`, consulting (and populating) the process-wide
/// parse cache.
pub fn parse_cached(sql: &str, dialect: crate::parser::SqlDialect) -> ParsedStatement {
    if let Some(cached) = PARSE_CACHE.read().ok().and_then(|c| c.get(sql)) {
        return cached;
    }
    let parsed = crate::parser::parse_lenient(sql, dialect);
    if let Ok(mut cache) = PARSE_CACHE.write() {
        cache.insert(sql, parsed.clone());
    }
    parsed
}

#[cfg(test)]
pub(crate) fn clear_parse_cache_for_test() {
    if let Ok(mut cache) = PARSE_CACHE.write() {
        *cache = ParseCache::new(1000);
    }
}

const DEDUP_CAPACITY: usize = 1024;
const DEDUP_TTL: Duration = Duration::from_millis(100);

#[derive(Clone)]
struct DedupEntry {
    hash:        u64,
    risk_level:  RiskLevel,
    inserted_at: Instant
}

/// Per-thread, TTL-bounded cache of recent validation outcomes, used to
/// short-circuit re-validating the exact same SQL text in a tight loop.
struct DedupRing {
    entries:  Vec<DedupEntry>,
    capacity: usize,
    ttl:      Duration
}

impl DedupRing {
    fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            ttl
        }
    }

    fn hash_key(sql: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        sql.hash(&mut hasher);
        hasher.finish()
    }

    /// Look up a still-fresh cached outcome for `sql`, pruning expired
    /// entries first.
    fn lookup(&mut self, sql: &str) -> Option<RiskLevel> {
        let now = Instant::now();
        self.entries.retain(|e| now.duration_since(e.inserted_at) < self.ttl);
        let key = Self::hash_key(sql);
        self.entries.iter().find(|e| e.hash == key).map(|e| e.risk_level)
    }

    fn record(&mut self, sql: &str, risk_level: RiskLevel) {
        if self.entries.len() >= self.capacity {
            self.entries.remove(0);
        }
        self.entries.push(DedupEntry {
            hash: Self::hash_key(sql),
            risk_level,
            inserted_at: Instant::now()
        });
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

thread_local! {
    static DEDUP: RefCell<DedupRing> = RefCell::new(DedupRing::new(DEDUP_CAPACITY, DEDUP_TTL));
}

/// Per-call-thread deduplication of identical SQL text within a short TTL
/// window, per [`crate::validator::DefaultValidator`]'s fast path.
pub struct DedupFilter;

impl DedupFilter {
    /// Returns the cached risk level if `sql` was checked within the TTL
    /// window on this thread, `None` if a full rule run is needed.
    pub fn cached_outcome(sql: &str) -> Option<RiskLevel> {
        DEDUP.with(|d| d.borrow_mut().lookup(sql))
    }

    pub fn record(sql: &str, risk_level: RiskLevel) {
        DEDUP.with(|d| d.borrow_mut().record(sql, risk_level));
    }

    /// Clear this thread's dedup window. Exposed for tests and for hosts
    /// that want a hard reset between logical request batches.
    pub fn clear_thread_cache() {
        DEDUP.with(|d| d.borrow_mut().clear());
    }
}
