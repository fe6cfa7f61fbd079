use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{store::DEFAULT_THEME, task::parse_reminder_timestamp};
use crate::storage::StorageError;

type MigrationFn = fn(Value) -> Result<Value, StorageError>;

fn get_migrations() -> Vec<MigrationFn> {
    vec![migrate_v1_to_v2]
}

/// Version 1 is the legacy browser layout: a bare task array, or an object
/// without a version field.
pub fn detect_version(value: &Value) -> Result<u32, StorageError> {
    match value {
        Value::Array(_) => Ok(1),
        Value::Object(obj) => match obj.get("version") {
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| StorageError::InvalidVersion(v.to_string())),
            None => Ok(1),
        },
        other => Err(StorageError::InvalidVersion(other.to_string())),
    }
}

/// Migrations are applied sequentially: v1→v2→v3→...→target
pub fn apply_migrations(
    mut data: Value,
    from_version: u32,
    to_version: u32,
) -> Result<Value, StorageError> {
    if from_version == to_version {
        return Ok(data);
    }

    if from_version > to_version {
        return Err(StorageError::FutureVersion(from_version));
    }

    let migrations = get_migrations();

    for version in from_version..to_version {
        let migration_idx = version.checked_sub(1).map(|i| i as usize);

        match migration_idx.and_then(|i| migrations.get(i)) {
            Some(migration) => data = migration(data)?,
            None => return Err(StorageError::UnsupportedVersion(version)),
        }
    }

    Ok(data)
}

fn migrate_v1_to_v2(value: Value) -> Result<Value, StorageError> {
    let mut obj = match value {
        Value::Array(tasks) => {
            let mut obj = Map::new();
            obj.insert("tasks".to_string(), Value::Array(tasks));
            obj
        }
        Value::Object(obj) => obj,
        other => return Err(StorageError::InvalidVersion(other.to_string())),
    };

    obj.insert("version".to_string(), Value::from(2));
    obj.entry("theme")
        .or_insert_with(|| Value::from(DEFAULT_THEME));

    if let Some(tasks) = obj.get_mut("tasks").and_then(|t| t.as_array_mut()) {
        for task in tasks.iter_mut().filter_map(|t| t.as_object_mut()) {
            normalize_v1_task(task);
        }
    }

    Ok(Value::Object(obj))
}

fn normalize_v1_task(task: &mut Map<String, Value>) {
    // The browser stored the raw `datetime-local` input, "" meaning no reminder
    match task.remove("reminderTime") {
        Some(Value::String(raw)) if !raw.trim().is_empty() => {
            match parse_reminder_timestamp(&raw) {
                Some(timestamp) => {
                    task.insert("reminderTime".to_string(), Value::from(timestamp.to_string()));
                }
                None => warn!(reminder = %raw, "dropping unreadable reminder"),
            }
        }
        _ => {}
    }

    let is_secret = task
        .get("isSecret")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    task.insert("isSecret".to_string(), Value::from(is_secret));

    if !is_secret {
        task.insert("password".to_string(), Value::Null);
    }

    if !task.get("revealed").is_some_and(Value::is_boolean) {
        task.insert("revealed".to_string(), Value::from(!is_secret));
    }
}
