use super::unsupported::UnsupportedValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Connection to a relational database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlLinkedService {
    pub service_name: String,
    pub service_type: String,
    pub host: String,
    pub database: Option<String>,
    pub user_name: Option<String>,
    pub authentication_type: Option<String>,
    pub password: Option<String>,
}

/// Storage account reached through a connection string or endpoint URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobStorageLinkedService {
    pub service_name: String,
    pub service_type: String,
    pub storage_account_name: String,
    pub url: String,
    pub account_key: Option<String>,
}

/// Cluster sizing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerPolicy {
    Fixed { num_workers: u32 },
    Autoscale { min_workers: u32, max_workers: u32 },
}

/// Init script location on the compute platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitScript {
    Dbfs { destination: String },
    Volumes { destination: String },
    Workspace { destination: String },
}

/// Compute cluster definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeClusterLinkedService {
    pub service_name: String,
    pub service_type: String,
    pub host_name: Option<String>,
    pub node_type_id: Option<String>,
    pub driver_node_type_id: Option<String>,
    pub spark_version: Option<String>,
    pub custom_tags: IndexMap<String, String>,
    pub spark_conf: IndexMap<String, String>,
    pub spark_env_vars: IndexMap<String, String>,
    pub init_scripts: Vec<InitScript>,
    pub log_destination: Option<String>,
    pub workers: Option<WorkerPolicy>,
    pub existing_cluster_id: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupportedLinkedService {
    pub service_name: String,
    pub service_type: String,
    pub unsupported: UnsupportedValue,
}

/// Linked service variants understood by the translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkedService {
    Sql(SqlLinkedService),
    BlobStorage(BlobStorageLinkedService),
    ComputeCluster(ComputeClusterLinkedService),
    Unsupported(UnsupportedLinkedService),
}

impl LinkedService {
    pub fn service_name(&self) -> &str {
        match self {
            LinkedService::Sql(service) => &service.service_name,
            LinkedService::BlobStorage(service) => &service.service_name,
            LinkedService::ComputeCluster(service) => &service.service_name,
            LinkedService::Unsupported(service) => &service.service_name,
        }
    }

    pub fn service_type(&self) -> &str {
        match self {
            LinkedService::Sql(service) => &service.service_type,
            LinkedService::BlobStorage(service) => &service.service_type,
            LinkedService::ComputeCluster(service) => &service.service_type,
            LinkedService::Unsupported(service) => &service.service_type,
        }
    }
}
