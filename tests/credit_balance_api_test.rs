// ==========================================
// CreditBalanceApi 集成测试
// ==========================================
// 覆盖: 增删改查、条件过滤、分页、汇总、券号检索与访问日志、按用户中心查询
// ==========================================

use clinic_credit_balance::api::{ApiError, CreateUserRequest, LoginRequest, VoucherSearchRequest};
use clinic_credit_balance::domain::{
    CreditBalanceFilter, CreditBalanceUpdate, NewCenter, NewCreditBalance,
};
use clinic_credit_balance::AppState;

mod test_helpers;
use test_helpers::create_test_state;

fn record(code: &str, name: &str, center: &str, phone: &str, balance: f64) -> NewCreditBalance {
    NewCreditBalance {
        center: Some(center.to_string()),
        phone_no: Some(phone.to_string()),
        balance_amount: balance,
        balance_sessions: 2.0,
        ..NewCreditBalance::new(code, name)
    }
}

fn seed(state: &AppState) {
    let api = &state.credit_balance_api;
    api.create(&record("C123", "Asha Rao", "GK Center", "98-765 43210", 1500.0))
        .unwrap();
    api.create(&record("C124", "Vikram Shah", "Preet Vihar", "9811122233", 250.5))
        .unwrap();
    api.create(&record("D900", "asha mehta", "GK Center", "9999", 0.0))
        .unwrap();
}

#[test]
fn test_create_generates_voucher_and_get_by_id() {
    let (_dir, state) = create_test_state();
    let api = &state.credit_balance_api;

    let mut request = record("C123", "Asha Rao", "GK Center", "98-765 43210", 1500.0);
    request.voucher_number = Some("IGNORED".to_string());
    let created = api.create(&request).unwrap();

    assert_eq!(created.voucher_number.as_deref(), Some("GK1236543"));
    assert!(created.updated_at.is_none());

    let fetched = api.get(created.id).unwrap();
    assert_eq!(fetched, created);

    assert!(matches!(api.get(9999), Err(ApiError::NotFound(_))));
}

#[test]
fn test_create_without_phone_has_no_voucher() {
    let (_dir, state) = create_test_state();
    let created = state
        .credit_balance_api
        .create(&NewCreditBalance {
            center: Some("GK Center".to_string()),
            ..NewCreditBalance::new("C1", "No Phone")
        })
        .unwrap();
    assert_eq!(created.voucher_number, None);

    let blank = state
        .credit_balance_api
        .create(&NewCreditBalance::new("  ", "Nobody"));
    assert!(matches!(blank, Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_update_regenerates_voucher_when_identity_changes() {
    let (_dir, state) = create_test_state();
    let api = &state.credit_balance_api;
    let created = api
        .create(&record("C123", "Asha Rao", "GK Center", "98-765 43210", 1500.0))
        .unwrap();

    // 非券号字段修改: 券号不变
    let updated = api
        .update(
            created.id,
            CreditBalanceUpdate {
                balance_amount: Some(900.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.balance_amount, 900.0);
    assert_eq!(updated.voucher_number.as_deref(), Some("GK1236543"));
    assert!(updated.updated_at.is_some());

    // 修改中心: 券号重新派生
    let moved = api
        .update(
            created.id,
            CreditBalanceUpdate {
                center: Some(Some("Preet Vihar".to_string())),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(moved.voucher_number.as_deref(), Some("PV1236543"));

    let missing = api.update(4242, CreditBalanceUpdate::default());
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}

#[test]
fn test_update_ignores_voucher_in_request_body() {
    let (_dir, state) = create_test_state();
    let api = &state.credit_balance_api;
    let created = api
        .create(&record("C123", "Asha Rao", "GK Center", "98-765 43210", 1500.0))
        .unwrap();

    let changes: CreditBalanceUpdate =
        serde_json::from_str(r#"{"voucher_number": "BOGUS-1", "balance_amount": 1.0}"#).unwrap();
    let updated = api.update(created.id, changes).unwrap();
    assert_eq!(updated.balance_amount, 1.0);
    assert_eq!(updated.voucher_number.as_deref(), Some("GK1236543"));

    let reloaded = api.get(created.id).unwrap();
    assert_eq!(reloaded.voucher_number.as_deref(), Some("GK1236543"));
}

#[test]
fn test_blank_optional_text_stored_as_null() {
    let (_dir, state) = create_test_state();
    let api = &state.credit_balance_api;

    let created = api
        .create(&NewCreditBalance {
            center: Some("GK Center".to_string()),
            phone_no: Some("   ".to_string()),
            email: Some("".to_string()),
            treatment_name: Some("  Laser  ".to_string()),
            ..NewCreditBalance::new("C7", "Blank Phone")
        })
        .unwrap();
    assert_eq!(created.phone_no, None);
    assert_eq!(created.email, None);
    assert_eq!(created.treatment_name.as_deref(), Some("Laser"));
    assert_eq!(created.voucher_number, None);

    // 补上电话后派生券号，再用 null 清空中心
    let with_phone = api
        .update(
            created.id,
            CreditBalanceUpdate {
                phone_no: Some(Some("9876543210".to_string())),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(with_phone.voucher_number.as_deref(), Some("GK0076543"));

    let changes: CreditBalanceUpdate = serde_json::from_str(r#"{"center": null}"#).unwrap();
    let cleared = api.update(created.id, changes).unwrap();
    assert_eq!(cleared.center, None);
    assert_eq!(cleared.voucher_number, None);

    let blanked = api
        .update(
            created.id,
            CreditBalanceUpdate {
                center: Some(Some("Preet Vihar".to_string())),
                phone_no: Some(Some("  ".to_string())),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(blanked.center.as_deref(), Some("Preet Vihar"));
    assert_eq!(blanked.phone_no, None);
    assert_eq!(blanked.voucher_number, None);
}

#[test]
fn test_delete() {
    let (_dir, state) = create_test_state();
    let api = &state.credit_balance_api;
    let created = api
        .create(&record("C123", "Asha Rao", "GK Center", "9876543210", 10.0))
        .unwrap();

    api.delete(created.id).unwrap();
    assert!(matches!(api.get(created.id), Err(ApiError::NotFound(_))));
    assert!(matches!(api.delete(created.id), Err(ApiError::NotFound(_))));
}

#[test]
fn test_list_filters_and_pagination() {
    let (_dir, state) = create_test_state();
    seed(&state);
    let api = &state.credit_balance_api;

    // 大小写不敏感的部分匹配
    let by_name = api
        .list(&CreditBalanceFilter {
            client_name: Some("ASHA".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_name.len(), 2);

    let by_code = api
        .list(&CreditBalanceFilter {
            client_code: Some("c12".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_code.len(), 2);

    // 按 id 升序分页
    let page = api
        .list(&CreditBalanceFilter {
            skip: 1,
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].client_code, "C124");

    // 不传 limit 返回全部
    assert_eq!(api.list(&CreditBalanceFilter::default()).unwrap().len(), 3);

    let negative = api.list(&CreditBalanceFilter {
        skip: -1,
        ..Default::default()
    });
    assert!(matches!(negative, Err(ApiError::InvalidInput(_))));

    let by_center = api.list_by_center("gk", 0, None).unwrap();
    assert_eq!(by_center.len(), 2);
}

#[test]
fn test_summary_empty_and_populated() {
    let (_dir, state) = create_test_state();
    let api = &state.credit_balance_api;

    let empty = api.summary().unwrap();
    assert_eq!(empty.total_records, 0);
    assert_eq!(empty.total_balance_amount, 0.0);
    assert_eq!(empty.total_balance_sessions, 0.0);
    assert!(empty.centers.is_empty());

    seed(&state);
    let summary = api.summary().unwrap();
    assert_eq!(summary.total_records, 3);
    assert_eq!(summary.total_balance_amount, 1750.5);
    assert_eq!(summary.total_balance_sessions, 6.0);
    assert_eq!(summary.centers, vec!["GK Center", "Preet Vihar"]);
}

#[test]
fn test_voucher_search_appends_access_log() {
    let (_dir, state) = create_test_state();
    seed(&state);

    let request = VoucherSearchRequest {
        voucher_id: "gk123".to_string(),
        user_name: "front-desk".to_string(),
        ip_address: Some("10.0.0.7".to_string()),
        user_agent: Some("tests".to_string()),
    };
    let found = state.credit_balance_api.search_by_voucher(&request).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].client_code, "C123");

    let logs = state.api_log_api.list_logs(None, 0, None).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user_name, "front-desk");
    assert_eq!(logs[0].voucher_id, "gk123");
    assert_eq!(logs[0].api_endpoint, "/credit-balances/by-voucher");
    assert_eq!(logs[0].ip_address.as_deref(), Some("10.0.0.7"));

    let empty = VoucherSearchRequest {
        voucher_id: "  ".to_string(),
        ..request
    };
    assert!(matches!(
        state.credit_balance_api.search_by_voucher(&empty),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_failed_voucher_search_writes_no_access_log() {
    let (_dir, state) = create_test_state();
    seed(&state);

    let conn = state.pool.get().unwrap();
    conn.execute_batch("DROP TABLE credit_balances").unwrap();
    drop(conn);

    let result = state.credit_balance_api.search_by_voucher(&VoucherSearchRequest {
        voucher_id: "GK".to_string(),
        user_name: "front-desk".to_string(),
        ip_address: None,
        user_agent: None,
    });
    assert!(matches!(result, Err(ApiError::DatabaseError(_))));

    let logs = state.api_log_api.list_logs(None, 0, None).unwrap();
    assert!(logs.is_empty());
}

#[test]
fn test_access_logs_newest_first_and_filtered() {
    let (_dir, state) = create_test_state();
    for (user, voucher) in [("alice", "GK1"), ("bob", "PV2"), ("Alice.B", "GK3")] {
        state
            .credit_balance_api
            .search_by_voucher(&VoucherSearchRequest {
                voucher_id: voucher.to_string(),
                user_name: user.to_string(),
                ip_address: None,
                user_agent: None,
            })
            .unwrap();
    }

    let logs = state.api_log_api.list_logs(None, 0, None).unwrap();
    let vouchers: Vec<&str> = logs.iter().map(|l| l.voucher_id.as_str()).collect();
    assert_eq!(vouchers, vec!["GK3", "PV2", "GK1"]);

    let alice = state.api_log_api.list_logs(Some("ALICE"), 0, None).unwrap();
    assert_eq!(alice.len(), 2);

    let limited = state.api_log_api.list_logs(None, 1, Some(1)).unwrap();
    assert_eq!(limited[0].voucher_id, "PV2");
}

#[test]
fn test_list_by_user_center() {
    let (_dir, state) = create_test_state();
    seed(&state);

    let center = state
        .center_api
        .create_center(&NewCenter {
            name: "GK Center".to_string(),
            code: "GK1".to_string(),
            address: None,
            phone: None,
            email: None,
            is_active: true,
        })
        .unwrap();

    for (username, center_id) in [("gk.staff", Some(center.id)), ("roaming", None)] {
        state
            .auth_api
            .create_user(&CreateUserRequest {
                username: username.to_string(),
                email: format!("{}@clinic.test", username),
                password: "s3cret!".to_string(),
                full_name: username.to_string(),
                role: "USER".to_string(),
                role_id: None,
                center_id,
            })
            .unwrap();
    }

    let login = |username: &str| {
        state
            .auth_api
            .login(&LoginRequest {
                username: username.to_string(),
                password: "s3cret!".to_string(),
            })
            .unwrap()
            .access_token
    };

    let records = state
        .credit_balance_api
        .list_by_user_center(&login("gk.staff"), 0, None)
        .unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.center.as_deref() == Some("GK Center")));

    let no_center = state
        .credit_balance_api
        .list_by_user_center(&login("roaming"), 0, None);
    assert!(matches!(no_center, Err(ApiError::InvalidInput(_))));

    let bad_token = state
        .credit_balance_api
        .list_by_user_center("not-a-token", 0, None);
    assert!(matches!(bad_token, Err(ApiError::Unauthorized(_))));
}
