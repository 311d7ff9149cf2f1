use crate::core::ir::{NotTranslatable, UnsupportedValue};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static TASK_KEY_INVALID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-]").expect("valid task key regex"));

const MAX_TASK_KEY_LEN: usize = 100;

#[derive(Debug, Clone)]
struct ActivityScope {
    name: String,
    activity_type: String,
}

/// Per-translation state threaded through every translator.
///
/// Holds the activity scope stack that attributes diagnostics to the activity being translated,
/// the diagnostics collected so far and the task key allocator. One context belongs to exactly
/// one call tree; independent translations use independent contexts.
#[derive(Debug, Default)]
pub struct TranslationContext {
    scopes: Vec<ActivityScope>,
    diagnostics: Vec<NotTranslatable>,
    task_keys: TaskKeyAllocator,
}

impl TranslationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with `(name, activity_type)` as the innermost activity scope.
    ///
    /// The scope is popped when `f` returns, whatever it returns.
    pub fn scoped<T>(
        &mut self,
        name: &str,
        activity_type: &str,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.scopes.push(ActivityScope {
            name: name.to_string(),
            activity_type: activity_type.to_string(),
        });
        let depth = self.scopes.len();
        let output = f(self);
        debug_assert_eq!(self.scopes.len(), depth, "unbalanced activity scope");
        self.scopes.truncate(depth - 1);
        output
    }

    /// Name and type of the activity currently being translated.
    pub fn current_scope(&self) -> Option<(&str, &str)> {
        self.scopes
            .last()
            .map(|scope| (scope.name.as_str(), scope.activity_type.as_str()))
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Record a not-translatable entry against the innermost activity, or the pipeline when no
    /// activity is being translated.
    pub fn warn(&mut self, property: impl Into<String>, message: impl Into<String>) {
        let property = property.into();
        let message = message.into();
        let (activity_name, activity_type) = match self.current_scope() {
            Some((name, kind)) => (Some(name.to_string()), Some(kind.to_string())),
            None => (None, None),
        };
        tracing::warn!(
            property = %property,
            activity_name = activity_name.as_deref().unwrap_or("-"),
            activity_type = activity_type.as_deref().unwrap_or("-"),
            "{}",
            message
        );
        self.diagnostics.push(NotTranslatable {
            property,
            message,
            activity_name,
            activity_type,
        });
    }

    pub fn record_unsupported(&mut self, property: impl Into<String>, value: &UnsupportedValue) {
        self.warn(property, value.message.clone());
    }

    pub fn diagnostics(&self) -> &[NotTranslatable] {
        &self.diagnostics
    }

    pub fn allocate_task_key(&mut self, activity_name: &str) -> String {
        self.task_keys.allocate(activity_name)
    }

    /// Task key allocated for the first activity with this source name.
    pub fn task_key_for(&self, activity_name: &str) -> Option<&str> {
        self.task_keys.lookup(activity_name)
    }

    pub fn into_diagnostics(self) -> Vec<NotTranslatable> {
        self.diagnostics
    }
}

/// Hands out unique task keys derived from activity names.
#[derive(Debug, Default)]
pub struct TaskKeyAllocator {
    used: HashSet<String>,
    by_name: HashMap<String, String>,
}

impl TaskKeyAllocator {
    pub fn allocate(&mut self, activity_name: &str) -> String {
        let base = sanitize_task_key(activity_name);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while self.used.contains(&candidate) {
            let tail = format!("_{}", suffix);
            let keep = MAX_TASK_KEY_LEN.saturating_sub(tail.len()).min(base.len());
            candidate = format!("{}{}", &base[..keep], tail);
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        self.by_name
            .entry(activity_name.to_string())
            .or_insert_with(|| candidate.clone());
        candidate
    }

    pub fn lookup(&self, activity_name: &str) -> Option<&str> {
        self.by_name.get(activity_name).map(String::as_str)
    }
}

/// Replace characters the target scheduler rejects and bound the length.
pub fn sanitize_task_key(name: &str) -> String {
    let cleaned = TASK_KEY_INVALID.replace_all(name.trim(), "_");
    let mut key: String = cleaned.chars().take(MAX_TASK_KEY_LEN).collect();
    if key.is_empty() {
        key.push_str("task");
    }
    key
}
