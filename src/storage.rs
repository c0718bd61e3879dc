use crate::errors::DatasetError;
use crate::models::Dataset;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

/// Loads the dataset once at startup. Without a path, or when the file cannot
/// be used, the built-in tables are served.
pub async fn load_dataset(path: Option<&Path>) -> Dataset {
    let Some(path) = path else {
        return Dataset::builtin();
    };

    match read_dataset(path).await {
        Ok(dataset) => {
            info!("loaded dataset from {}", path.display());
            dataset
        }
        Err(err) => {
            error!("{err}; falling back to built-in dataset");
            Dataset::builtin()
        }
    }
}

pub async fn read_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let bytes = fs::read(path).await?;
    let dataset: Dataset = serde_json::from_slice(&bytes)?;
    dataset.validate()?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "transfer_dashboard_{}_{}_{name}.json",
            std::process::id(),
            nanos
        ));
        path
    }

    #[tokio::test]
    async fn reads_partial_dataset_with_defaults() {
        let path = temp_path("partial");
        std::fs::write(
            &path,
            r#"{
                "currency": "USD",
                "monthly": [
                    { "label": "May", "transaction_count": 0, "volume": 0.0 },
                    { "label": "June", "transaction_count": 12, "volume": 400.5, "success_rate": 75.0 }
                ]
            }"#,
        )
        .unwrap();

        let dataset = read_dataset(&path).await.unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(dataset.currency, "USD");
        assert_eq!(dataset.monthly.len(), 2);
        assert_eq!(dataset.monthly[0].success_rate, None);
        assert_eq!(dataset.monthly[1].unique_senders, 0);
        assert!(dataset.clients.is_empty());
    }

    #[tokio::test]
    async fn invalid_dataset_is_an_error() {
        let path = temp_path("invalid");
        std::fs::write(
            &path,
            r#"{ "failures": [
                { "reason": "Timed Out", "count": 1, "percentage": 50.0 },
                { "reason": "Timed Out", "count": 1, "percentage": 50.0 }
            ] }"#,
        )
        .unwrap();

        let result = read_dataset(&path).await;
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(DatasetError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn unusable_file_falls_back_to_builtin() {
        let missing = temp_path("missing");
        assert_eq!(load_dataset(Some(missing.as_path())).await, Dataset::builtin());

        let garbage = temp_path("garbage");
        std::fs::write(&garbage, b"not json").unwrap();
        let dataset = load_dataset(Some(garbage.as_path())).await;
        let _ = std::fs::remove_file(&garbage);
        assert_eq!(dataset, Dataset::builtin());

        assert_eq!(load_dataset(None).await, Dataset::builtin());
    }
}
