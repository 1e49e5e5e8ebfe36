use super::ApiLogRepository;
use crate::config::StorageConfig;
use crate::db::{create_pool, ensure_schema};
use crate::domain::api_log::NewApiLog;

fn setup_test_repo() -> (tempfile::TempDir, ApiLogRepository) {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        pool_size: 1,
        max_overflow: 1,
        ..StorageConfig::for_path(dir.path().join("logs.db").to_string_lossy().to_string())
    };
    let pool = create_pool(&config).unwrap();
    ensure_schema(&pool.get().unwrap(), &config.namespace).unwrap();
    (dir, ApiLogRepository::new(pool, config.namespace))
}

fn make_test_log(user_name: &str, voucher: &str) -> NewApiLog {
    NewApiLog {
        user_name: user_name.to_string(),
        voucher_id: voucher.to_string(),
        api_endpoint: "/credit-balances/by-voucher".to_string(),
        ip_address: Some("10.0.0.1".to_string()),
        user_agent: None,
    }
}

#[test]
fn test_insert_and_list_newest_first() {
    let (_dir, repo) = setup_test_repo();

    let first = repo.insert(&make_test_log("alice", "GK1")).unwrap();
    let second = repo.insert(&make_test_log("bob", "PV2")).unwrap();
    assert!(second > first);

    let logs = repo.list(None, 0, Some(100)).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].id, second);
    assert_eq!(logs[1].id, first);
    assert_eq!(logs[0].api_endpoint, "/credit-balances/by-voucher");
}

#[test]
fn test_list_filters_by_user_name_partial() {
    let (_dir, repo) = setup_test_repo();
    repo.insert(&make_test_log("Alice Admin", "GK1")).unwrap();
    repo.insert(&make_test_log("bob", "PV2")).unwrap();
    repo.insert(&make_test_log("alice", "GK3")).unwrap();

    let logs = repo.list(Some("ALICE"), 0, Some(100)).unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.user_name.to_lowercase().contains("alice")));
}

#[test]
fn test_list_respects_limit() {
    let (_dir, repo) = setup_test_repo();
    for i in 0..5 {
        repo.insert(&make_test_log("u", &format!("V{}", i))).unwrap();
    }
    assert_eq!(repo.list(None, 0, Some(3)).unwrap().len(), 3);
    assert_eq!(repo.list(None, 4, None).unwrap().len(), 1);
    assert_eq!(repo.count().unwrap(), 5);
}
