// ==========================================
// ConfigManager integration tests
// ==========================================
// Goal: import tunables read from config_kv on a file database
// ==========================================


use tecnova_pos::config::{config_keys, ConfigManager, ImportConfigReader};
use tecnova_pos::ImportMode;
use test_helpers::create_test_db;

#[tokio::test]
async fn test_defaults_on_empty_database() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(config.get_batch_size().await.unwrap(), 500);
    assert_eq!(config.get_max_file_bytes().await.unwrap(), 5 * 1024 * 1024);
    assert_eq!(config.get_default_mode().await.unwrap(), ImportMode::Insert);
    assert!(config.get_default_dry_run().await.unwrap());
    assert_eq!(config.get_rate_limit_max_requests().await.unwrap(), 30);
    assert_eq!(config.get_rate_limit_window_ms().await.unwrap(), 60_000);
    assert!(config.get_config_snapshot().unwrap().is_empty());
}

#[tokio::test]
async fn test_values_persist_across_instances() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    {
        let config = ConfigManager::new(&db_path).unwrap();
        config
            .set_global_config_value(config_keys::DEFAULT_MODE, "upsert")
            .unwrap();
        config
            .set_global_config_value(config_keys::DEFAULT_DRY_RUN, "false")
            .unwrap();
        config
            .set_global_config_value(config_keys::RATE_LIMIT_MAX_REQUESTS, "5")
            .unwrap();
        config
            .set_global_config_value(config_keys::RATE_LIMIT_MAX_REQUESTS, "7")
            .unwrap();
    }

    let config = ConfigManager::new(&db_path).unwrap();
    assert_eq!(config.get_default_mode().await.unwrap(), ImportMode::Upsert);
    assert!(!config.get_default_dry_run().await.unwrap());
    assert_eq!(config.get_rate_limit_max_requests().await.unwrap(), 7);

    let snapshot = config.get_config_snapshot().unwrap();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(
        snapshot.get(config_keys::RATE_LIMIT_MAX_REQUESTS).map(String::as_str),
        Some("7")
    );
}

#[tokio::test]
async fn test_malformed_values_fall_back() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).unwrap();

    config.set_global_config_value(config_keys::BATCH_SIZE, "-1").unwrap();
    config.set_global_config_value(config_keys::MAX_FILE_BYTES, "5MB").unwrap();
    config.set_global_config_value(config_keys::DEFAULT_MODE, "merge").unwrap();
    config.set_global_config_value(config_keys::RATE_LIMIT_WINDOW_MS, "").unwrap();

    assert_eq!(config.get_batch_size().await.unwrap(), 500);
    assert_eq!(config.get_max_file_bytes().await.unwrap(), 5 * 1024 * 1024);
    assert_eq!(config.get_default_mode().await.unwrap(), ImportMode::Insert);
    assert_eq!(config.get_rate_limit_window_ms().await.unwrap(), 60_000);
}
