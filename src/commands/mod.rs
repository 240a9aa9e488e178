pub mod app_command;

pub use app_command::{AppCommand, USAGE};

use crate::reading::{ReadingError, ReadingService, Submission};
use crate::storage::Store;
use log::{error, info};
use serde_json::{json, Value};

/// Runs one command against the store and returns its JSON result.
/// `Help` and `Unknown` are answered by the caller before a store exists.
pub async fn execute(
    cmd: AppCommand,
    service: &ReadingService,
    store: &Store,
) -> Result<Value, ReadingError> {
    let value = match cmd {
        AppCommand::Create { pairs } => {
            let submission = Submission::from_pairs(pairs)?;
            to_json(&service.create(&submission).await?)?
        }
        AppCommand::CreateJson { json } => {
            let submission = Submission::from_json(&json)?;
            to_json(&service.create(&submission).await?)?
        }
        AppCommand::Recent { limit } => to_json(&service.recent(limit).await?)?,
        AppCommand::Range { from, to } => to_json(&service.by_range(&from, &to).await?)?,
        AppCommand::Day { day } => to_json(&service.by_day(&day).await?)?,
        AppCommand::Stats => to_json(&service.stats().await?)?,
        AppCommand::Ping => {
            store.ping().await?;
            json!({ "status": "ok" })
        }
        AppCommand::Reset => {
            store.reset().await?;
            info!("All readings removed.");
            json!({ "status": "reset" })
        }
        AppCommand::Help => Value::String(USAGE.to_string()),
        AppCommand::Unknown(msg) => return Err(ReadingError::InvalidPayload(msg)),
    };
    Ok(value)
}

fn to_json<T: serde::Serialize>(v: &T) -> Result<Value, ReadingError> {
    serde_json::to_value(v).map_err(|e| {
        error!("Failed to encode response: {}", e);
        ReadingError::Encode(e)
    })
}
