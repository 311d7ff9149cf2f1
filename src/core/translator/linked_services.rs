use crate::core::ir::{
    BlobStorageLinkedService, ComputeClusterLinkedService, InitScript, LinkedService,
    SqlLinkedService, Translation, UnsupportedLinkedService, UnsupportedValue, WorkerPolicy,
};
use crate::core::translator::values::{array_field, secure_string, str_field, string_map, text_field};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static ACCOUNT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)\s*AccountName=([A-Za-z0-9]+)\s*(?:;|$)").expect("valid account name regex")
});
static ENDPOINTS_PROTOCOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)\s*DefaultEndpointsProtocol=([A-Za-z0-9]+)\s*(?:;|$)")
        .expect("valid protocol regex")
});
static ENDPOINT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)\s*EndpointSuffix=([A-Za-z0-9.]+)\s*(?:;|$)").expect("valid suffix regex")
});
static ACCOUNT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)\s*AccountKey=([^;]+)").expect("valid account key regex")
});
static ENDPOINT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?)://([A-Za-z0-9]+)\.(?:dfs|blob)\.([A-Za-z0-9.]+?)/?$")
        .expect("valid endpoint url regex")
});

/// Translate a linked service definition, dispatching on `properties.type`.
pub fn translate_linked_service(payload: &Value) -> LinkedService {
    let service_type = service_type(payload);
    let translated = match service_type.as_str() {
        "AzureSqlDatabase" | "SqlServer" | "AzureSqlMI" => {
            translate_sql_service(payload).map(LinkedService::Sql)
        }
        "AzureBlobStorage" | "AzureBlobFS" => {
            translate_blob_storage_service(payload).map(LinkedService::BlobStorage)
        }
        "AzureDatabricks" | "AzureDatabricksDeltaLake" => {
            translate_compute_cluster(payload).map(LinkedService::ComputeCluster)
        }
        other => Err(UnsupportedValue::new(
            payload.clone(),
            format!("Unsupported linked service type '{}'", other),
        )),
    };
    translated.unwrap_or_else(|unsupported| {
        LinkedService::Unsupported(UnsupportedLinkedService {
            service_name: service_name(payload),
            service_type,
            unsupported,
        })
    })
}

pub fn translate_sql_service(payload: &Value) -> Translation<SqlLinkedService> {
    let properties = type_properties(payload);
    let host = text_field(properties, "server").ok_or_else(|| {
        UnsupportedValue::new(
            payload.clone(),
            "Missing property 'server' in SQL linked service definition",
        )
    })?;
    Ok(SqlLinkedService {
        service_name: service_name(payload),
        service_type: service_type(payload),
        host,
        database: text_field(properties, "database"),
        user_name: text_field(properties, "userName"),
        authentication_type: text_field(properties, "authenticationType"),
        password: secure_string(properties, "password"),
    })
}

pub fn translate_blob_storage_service(payload: &Value) -> Translation<BlobStorageLinkedService> {
    let properties = type_properties(payload);
    let (storage_account_name, url, connection_key) =
        if let Some(connection_string) = secure_string(properties, "connectionString") {
            let (account, url) = parse_connection_string(&connection_string).map_err(|err| {
                UnsupportedValue::new(
                    payload.clone(),
                    format!(
                        "Invalid property 'connectionString' in storage linked service definition; {}",
                        err.message
                    ),
                )
            })?;
            let key = capture(&ACCOUNT_KEY, &connection_string);
            (account, url, key)
        } else if let Some(endpoint) = text_field(properties, "url") {
            let (account, url) = parse_endpoint_url(&endpoint).map_err(|err| {
                UnsupportedValue::new(
                    payload.clone(),
                    format!(
                        "Invalid property 'url' in storage linked service definition; {}",
                        err.message
                    ),
                )
            })?;
            (account, url, None)
        } else {
            return Err(UnsupportedValue::new(
                payload.clone(),
                "Missing property 'connectionString' or 'url' in storage linked service definition",
            ));
        };

    Ok(BlobStorageLinkedService {
        service_name: service_name(payload),
        service_type: service_type(payload),
        storage_account_name,
        url,
        account_key: secure_string(properties, "accountKey").or(connection_key),
    })
}

/// Extract `(account name, blob endpoint URL)` from a storage connection string.
pub fn parse_connection_string(connection_string: &str) -> Translation<(String, String)> {
    let extract = |pattern: &Regex, label: &str| {
        capture(pattern, connection_string).ok_or_else(|| {
            UnsupportedValue::new(
                Value::String(connection_string.to_string()),
                format!("Could not parse {} from connection string", label),
            )
        })
    };
    let account = extract(&*ACCOUNT_NAME, "AccountName")?;
    let protocol = extract(&*ENDPOINTS_PROTOCOL, "DefaultEndpointsProtocol")?;
    let suffix = extract(&*ENDPOINT_SUFFIX, "EndpointSuffix")?;
    let url = format!("{}://{}.blob.{}/", protocol, account, suffix);
    Ok((account, url))
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .map(|captures| captures[1].trim().to_string())
}

fn parse_endpoint_url(endpoint: &str) -> Translation<(String, String)> {
    let captures = ENDPOINT_URL.captures(endpoint.trim()).ok_or_else(|| {
        UnsupportedValue::new(
            Value::String(endpoint.to_string()),
            format!("Could not parse storage account from URL '{}'", endpoint),
        )
    })?;
    let account = captures[2].to_string();
    let url = format!("{}://{}.blob.{}/", &captures[1], account, &captures[3]);
    Ok((account, url))
}

pub fn translate_compute_cluster(payload: &Value) -> Translation<ComputeClusterLinkedService> {
    let properties = type_properties(payload);
    let workers = parse_worker_policy(properties.get("newClusterNumOfWorker"))
        .map_err(|err| UnsupportedValue::new(payload.clone(), err.message))?;

    Ok(ComputeClusterLinkedService {
        service_name: service_name(payload),
        service_type: service_type(payload),
        host_name: text_field(properties, "domain"),
        node_type_id: text_field(properties, "newClusterNodeType"),
        driver_node_type_id: text_field(properties, "newClusterDriverNodeType"),
        spark_version: text_field(properties, "newClusterVersion"),
        custom_tags: string_map(properties, "newClusterCustomTags"),
        spark_conf: string_map(properties, "newClusterSparkConf"),
        spark_env_vars: string_map(properties, "newClusterSparkEnvVars"),
        init_scripts: array_field(properties, "newClusterInitScripts")
            .iter()
            .filter_map(Value::as_str)
            .map(init_script)
            .collect(),
        log_destination: text_field(properties, "newClusterLogDestination"),
        workers,
        existing_cluster_id: text_field(properties, "existingClusterId")
            .or_else(|| text_field(properties, "clusterId")),
        access_token: secure_string(properties, "accessToken"),
    })
}

/// Worker sizing from the single source field: a number or numeric string is a fixed size,
/// `min:max` is an autoscale range.
pub fn parse_worker_policy(value: Option<&Value>) -> Translation<Option<WorkerPolicy>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|count| u32::try_from(count).ok())
            .map(|num_workers| Some(WorkerPolicy::Fixed { num_workers }))
            .ok_or_else(|| {
                UnsupportedValue::new(
                    Value::Number(number.clone()),
                    format!("Invalid number of workers '{}'", number),
                )
            }),
        Some(Value::String(text)) if text.contains(':') => parse_autoscale_policy(Some(text)),
        Some(Value::String(text)) => text
            .trim()
            .parse::<u32>()
            .map(|num_workers| Some(WorkerPolicy::Fixed { num_workers }))
            .map_err(|_| {
                UnsupportedValue::new(
                    Value::String(text.clone()),
                    format!("Invalid number of workers '{}'", text),
                )
            }),
        Some(other) => Err(UnsupportedValue::new(
            other.clone(),
            "Invalid number of workers; expected a number or 'min:max'",
        )),
    }
}

/// Parse an autoscale range of the form `min:max`.
pub fn parse_autoscale_policy(policy: Option<&str>) -> Translation<Option<WorkerPolicy>> {
    let Some(policy) = policy else {
        return Ok(None);
    };
    let invalid = || {
        UnsupportedValue::new(
            Value::String(policy.to_string()),
            format!("Invalid autoscale policy '{}'", policy),
        )
    };
    let mut parts = policy.split(':');
    let (Some(min), Some(max), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let min_workers = min.trim().parse::<u32>().map_err(|_| invalid())?;
    let max_workers = max.trim().parse::<u32>().map_err(|_| invalid())?;
    if min_workers > max_workers {
        return Err(invalid());
    }
    Ok(Some(WorkerPolicy::Autoscale {
        min_workers,
        max_workers,
    }))
}

fn init_script(destination: &str) -> InitScript {
    let destination = destination.to_string();
    if destination.starts_with("dbfs:") {
        InitScript::Dbfs { destination }
    } else if destination.starts_with("/Volumes") {
        InitScript::Volumes { destination }
    } else {
        InitScript::Workspace { destination }
    }
}

fn type_properties(payload: &Value) -> &Value {
    let properties = payload.get("properties").unwrap_or(payload);
    properties.get("typeProperties").unwrap_or(properties)
}

fn service_type(payload: &Value) -> String {
    payload
        .get("properties")
        .and_then(|properties| str_field(properties, "type"))
        .or_else(|| str_field(payload, "type"))
        .unwrap_or("UNKNOWN")
        .to_string()
}

fn service_name(payload: &Value) -> String {
    text_field(payload, "name").unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
