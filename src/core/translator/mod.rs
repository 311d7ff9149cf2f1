//! Translators from source definitions into the intermediate representation.
//!
//! Every translator is a function of its payload plus a [`TranslationContext`] that collects
//! diagnostics. Constructs that cannot be mapped become [`UnsupportedValue`]s, never errors;
//! the only hard errors are type-mapping misses and malformed inlined linked services.
//!
//! [`UnsupportedValue`]: crate::core::ir::UnsupportedValue

pub mod activities;
pub mod context;
pub mod dataset_properties;
pub mod datasets;
pub mod expression;
pub mod linked_services;
pub mod ordering;
pub mod parameters;
pub mod pipeline;
pub mod triggers;
pub mod type_mapping;
pub mod values;

pub use activities::translate_activities;
pub use context::{sanitize_task_key, TaskKeyAllocator, TranslationContext};
pub use datasets::translate_dataset;
pub use linked_services::translate_linked_service;
pub use pipeline::{translate_pipeline, translate_pipeline_with};
pub use triggers::{translate_recurrence, translate_schedule_trigger};
pub use type_mapping::map_type;

pub const DEFAULT_TIMEZONE_ID: &str = "UTC";

/// Knobs that influence translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOptions {
    /// Time zone given to translated schedules.
    pub timezone_id: String,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            timezone_id: DEFAULT_TIMEZONE_ID.to_string(),
        }
    }
}
