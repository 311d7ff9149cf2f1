use std::collections::BTreeMap;

/// Tag marking jobs and clusters created by this tool.
pub const SYSTEM_TAG: &str = "CREATED_BY_FLOWPORT";

/// Add the system tag; applying it again leaves the tags unchanged.
pub fn with_system_tag(mut tags: BTreeMap<String, String>) -> BTreeMap<String, String> {
    tags.entry(SYSTEM_TAG.to_string()).or_default();
    tags
}
