//! Read-only store over a Data Factory git-layout export.
//!
//! The export holds one JSON file per resource under `pipeline/`, `dataset/`,
//! `linkedService/` and `trigger/`. Loading a pipeline inlines every reference the translators
//! read: compute linked services on activities, datasets on Copy activities, linked services on
//! datasets, and the first trigger (by name) that starts the pipeline.

use super::{DefinitionStore, StoreError};
use crate::core::workflow::PreparedWorkflow;
use crate::utils::{FileSerializer, FileUtils, JsonSerializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PIPELINE_DIR: &str = "pipeline";
pub const DATASET_DIR: &str = "dataset";
pub const LINKED_SERVICE_DIR: &str = "linkedService";
pub const TRIGGER_DIR: &str = "trigger";

const COMPUTE_SERVICE_TYPE: &str = "AzureDatabricks";
const NESTED_ACTIVITY_FIELDS: [&str; 3] = ["activities", "ifTrueActivities", "ifFalseActivities"];

#[derive(Debug, Clone)]
pub struct FactoryExportStore {
    root: PathBuf,
}

/// Resources of one kind keyed by name; iteration is in name order.
type Resources = BTreeMap<String, Value>;

impl FactoryExportStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::Configuration(format!(
                "export directory {} does not exist",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all pipelines in the export.
    pub fn pipeline_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_resources(PIPELINE_DIR)?.into_keys().collect())
    }

    fn read_resources(&self, folder: &str) -> Result<Resources, StoreError> {
        let dir = self.root.join(folder);
        let mut resources = Resources::new();
        if !dir.is_dir() {
            return Ok(resources);
        }

        let mut paths = fs::read_dir(&dir)
            .map_err(|error| StoreError::io(&dir, error))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect::<Vec<_>>();
        paths.sort();

        for path in paths {
            let value: Value = FileUtils
                .load_from_file(&path, &JsonSerializer::default())
                .map_err(|error| StoreError::parse(&path, &error))?;
            let name = value
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| {
                    path.file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                });
            if let Some(name) = name {
                resources.entry(name).or_insert(value);
            }
        }
        Ok(resources)
    }
}

impl DefinitionStore for FactoryExportStore {
    fn load(&self, identifier: &str) -> Result<Value, StoreError> {
        let pipelines = self.read_resources(PIPELINE_DIR)?;
        let mut pipeline = pipelines
            .get(identifier)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "pipeline",
                name: identifier.to_string(),
            })?;

        let resolver = Resolver {
            datasets: self.read_resources(DATASET_DIR)?,
            linked_services: self.read_resources(LINKED_SERVICE_DIR)?,
        };
        if let Some(activities) = pipeline
            .get_mut("properties")
            .and_then(|properties| properties.get_mut("activities"))
            .and_then(Value::as_array_mut)
        {
            for activity in activities {
                resolver.resolve_activity(activity);
            }
        }

        let triggers = self.read_resources(TRIGGER_DIR)?;
        if let Some(trigger) = triggers
            .values()
            .find(|trigger| trigger_references(trigger, identifier))
        {
            tracing::debug!(pipeline = identifier, "attaching trigger");
            if let Value::Object(map) = &mut pipeline {
                map.insert("trigger".to_string(), trigger.clone());
            }
        }

        tracing::info!(pipeline = identifier, root = %self.root.display(), "pipeline loaded");
        Ok(pipeline)
    }

    fn dump(&mut self, workflow: &PreparedWorkflow) -> Result<Option<String>, StoreError> {
        Err(StoreError::NotSupported(format!(
            "Writing job '{}' to a factory export is not supported",
            workflow.job_settings.name
        )))
    }
}

struct Resolver {
    datasets: Resources,
    linked_services: Resources,
}

impl Resolver {
    fn resolve_activity(&self, activity: &mut Value) {
        let Value::Object(map) = activity else {
            return;
        };

        if let Some(service) = reference_name(map.get("linkedServiceName"))
            .and_then(|name| self.linked_service(&name, "activity"))
        {
            if service_type(service) == Some(COMPUTE_SERVICE_TYPE) {
                map.insert("linkedServiceDefinition".to_string(), service.clone());
            }
        }

        for (field, target) in [
            ("inputs", "inputDatasetDefinitions"),
            ("outputs", "outputDatasetDefinitions"),
        ] {
            let Some(references) = map.get(field).and_then(Value::as_array) else {
                continue;
            };
            let definitions: Vec<Value> = references
                .iter()
                .filter_map(|reference| reference_name(Some(reference)))
                .filter_map(|name| self.dataset(&name))
                .collect();
            map.insert(target.to_string(), Value::Array(definitions));
        }

        let type_properties = map
            .get_mut("typeProperties")
            .and_then(Value::as_object_mut);
        if let Some(type_properties) = type_properties {
            self.resolve_nested(type_properties);
        }
    }

    fn resolve_nested(&self, type_properties: &mut Map<String, Value>) {
        for field in NESTED_ACTIVITY_FIELDS {
            if let Some(children) = type_properties.get_mut(field).and_then(Value::as_array_mut) {
                for child in children {
                    self.resolve_activity(child);
                }
            }
        }
    }

    fn dataset(&self, name: &str) -> Option<Value> {
        let Some(dataset) = self.datasets.get(name) else {
            tracing::warn!(dataset = name, "referenced dataset not found in export");
            return None;
        };
        let mut dataset = dataset.clone();
        let service_name = reference_name(
            dataset
                .get("properties")
                .and_then(|properties| properties.get("linkedServiceName")),
        );
        if let (Some(service), Value::Object(map)) = (
            service_name.and_then(|service| self.linked_service(&service, "dataset")),
            &mut dataset,
        ) {
            map.insert("linkedServiceDefinition".to_string(), service.clone());
        }
        Some(dataset)
    }

    fn linked_service(&self, name: &str, referenced_by: &str) -> Option<&Value> {
        let service = self.linked_services.get(name);
        if service.is_none() {
            tracing::warn!(
                linked_service = name,
                referenced_by,
                "referenced linked service not found in export"
            );
        }
        service
    }
}

fn reference_name(reference: Option<&Value>) -> Option<String> {
    reference?
        .get("referenceName")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn service_type(service: &Value) -> Option<&str> {
    service
        .get("properties")
        .and_then(|properties| properties.get("type"))
        .and_then(Value::as_str)
}

fn trigger_references(trigger: &Value, pipeline: &str) -> bool {
    trigger
        .get("properties")
        .and_then(|properties| properties.get("pipelines"))
        .and_then(Value::as_array)
        .is_some_and(|pipelines| {
            pipelines.iter().any(|entry| {
                reference_name(entry.get("pipelineReference")).as_deref() == Some(pipeline)
            })
        })
}
