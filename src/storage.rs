use crate::errors::AppError;
use crate::models::AppData;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::BadgeId;
    use crate::models::DailyRecord;

    #[test]
    fn state_roundtrips_through_json() {
        let mut data = AppData::default();
        let mut record = DailyRecord::empty("2024-01-01".to_string(), 3);
        record.checked_indices.insert(1);
        record.completed_count = 1;
        data.history.insert(record.date.clone(), record);
        data.meta.streak = 4;
        data.meta.badges.insert(BadgeId::Streak3);

        let bytes = serde_json::to_vec_pretty(&data).unwrap();
        let back: AppData = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(back.meta.streak, 4);
        assert!(back.meta.badges.contains(&BadgeId::Streak3));
        let record = &back.history["2024-01-01"];
        assert_eq!(record.completed_count, 1);
        assert!(record.checked_indices.contains(&1));
    }

    #[test]
    fn records_without_checked_indices_still_load() {
        // backfilled days were historically written without the field
        let raw = r#"{
            "goal": null,
            "history": {
                "2024-01-02": {
                    "date": "2024-01-02",
                    "completed_count": 0,
                    "total_count": 2,
                    "all_done": false
                }
            },
            "meta": { "streak": 0, "badges": [] }
        }"#;
        let data: AppData = serde_json::from_str(raw).unwrap();
        assert!(data.history["2024-01-02"].checked_indices.is_empty());
    }
}
