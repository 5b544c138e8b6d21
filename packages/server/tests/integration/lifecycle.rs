use asset_server::entity::asset;
use sea_orm::EntityTrait;
use serde_json::json;

use crate::common::{Fixture, TestApp, routes};

/// Assert the stored asset row pairs its holder with `assigned`.
async fn assert_holder_consistent(app: &TestApp, asset_id: i32) {
    let row = asset::Entity::find_by_id(asset_id)
        .one(&app.db)
        .await
        .unwrap()
        .expect("asset row missing");
    assert!(
        row.holder_consistent(),
        "status {} with holder {:?}",
        row.status,
        row.current_holder_id
    );
}

async fn checkout_to_new_user(app: &TestApp, f: &Fixture, username: &str) -> i32 {
    let user_id = app.insert_user(username, "employee").await;
    let res = app
        .lifecycle(
            f.asset_id,
            "checkout",
            json!({"user_id": user_id}),
            &f.admin.token,
        )
        .await;
    assert_eq!(res.status, 201, "checkout failed: {}", res.text);
    user_id
}

async fn send_to_repair(app: &TestApp, f: &Fixture) {
    let res = app
        .lifecycle(f.asset_id, "repair", json!({}), &f.admin.token)
        .await;
    assert_eq!(res.status, 201, "repair failed: {}", res.text);
}

async fn dispose(app: &TestApp, f: &Fixture) {
    let res = app
        .lifecycle(f.asset_id, "dispose", json!({}), &f.admin.token)
        .await;
    assert_eq!(res.status, 201, "dispose failed: {}", res.text);
}

mod checkout {
    use super::*;

    #[tokio::test]
    async fn assigns_an_available_asset_and_records_the_receiver() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let user_id = app.insert_user("bob", "employee").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkout",
                json!({"user_id": user_id, "notes": "new hire"}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["asset"]["id"], f.asset_id);
        assert_eq!(res.body["asset"]["status"], "assigned");
        assert_eq!(res.body["asset"]["current_holder_id"], user_id);
        assert_eq!(res.body["asset"]["location_id"], f.location_id);
        assert!(res.body["asset"]["asset_tag"].is_string());

        let tx = &res.body["transaction"];
        assert_eq!(tx["action"], "checkout");
        assert_eq!(tx["asset_id"], f.asset_id);
        assert_eq!(tx["from_status"], "available");
        assert_eq!(tx["to_status"], "assigned");
        assert_eq!(tx["user_id"], user_id);
        assert_eq!(tx["actor_id"], f.admin.id);
        assert_eq!(tx["notes"], "new hire");

        assert_eq!(app.ledger_count(f.asset_id).await, 1);
        assert_holder_consistent(&app, f.asset_id).await;
    }

    #[tokio::test]
    async fn second_checkout_conflicts_without_a_ledger_row() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let first = checkout_to_new_user(&app, &f, "bob").await;
        let other = app.insert_user("carol", "employee").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkout",
                json!({"user_id": other}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "INVALID_TRANSITION");
        assert_eq!(res.body["current_status"], "assigned");
        assert_eq!(app.ledger_count(f.asset_id).await, 1);

        let asset = app
            .get_with_token(&routes::asset(f.asset_id), &f.admin.token)
            .await;
        assert_eq!(asset.body["current_holder_id"], first);
    }

    #[tokio::test]
    async fn refused_from_repair_and_retired() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let user_id = app.insert_user("bob", "employee").await;

        send_to_repair(&app, &f).await;
        let res = app
            .lifecycle(
                f.asset_id,
                "checkout",
                json!({"user_id": user_id}),
                &f.admin.token,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["current_status"], "repair");

        dispose(&app, &f).await;
        let res = app
            .lifecycle(
                f.asset_id,
                "checkout",
                json!({"user_id": user_id}),
                &f.admin.token,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["current_status"], "retired");
        assert_eq!(app.ledger_count(f.asset_id).await, 2);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkout",
                json!({"user_id": 99999}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert_eq!(app.ledger_count(f.asset_id).await, 0);
    }

    #[tokio::test]
    async fn unknown_asset_is_not_found() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;

        let res = app
            .lifecycle(99999, "checkout", json!({"user_id": f.admin.id}), &f.admin.token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn inactive_user_cannot_receive_assets() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let user_id = app.insert_user("bob", "employee").await;

        let res = app
            .patch_with_token(
                &routes::user(user_id),
                &json!({"is_active": false}),
                &f.admin.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .lifecycle(
                f.asset_id,
                "checkout",
                json!({"user_id": user_id}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USER_INACTIVE");
        assert_eq!(app.ledger_count(f.asset_id).await, 0);
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;

        let res = app
            .lifecycle(f.asset_id, "checkout", json!({}), &f.admin.token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app
            .lifecycle(f.asset_id, "checkout", json!({"user_id": 0}), &f.admin.token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn simultaneous_checkouts_yield_exactly_one_success() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let bob = app.insert_user("bob", "employee").await;
        let carol = app.insert_user("carol", "employee").await;

        let (a, b) = tokio::join!(
            app.lifecycle(f.asset_id, "checkout", json!({"user_id": bob}), &f.admin.token),
            app.lifecycle(f.asset_id, "checkout", json!({"user_id": carol}), &f.admin.token),
        );

        let mut statuses = [a.status, b.status];
        statuses.sort();
        assert_eq!(statuses, [201, 409], "a: {} / b: {}", a.text, b.text);

        let winner = if a.status == 201 { &a } else { &b };
        let holder = winner.body["asset"]["current_holder_id"].as_i64().unwrap() as i32;
        assert!(holder == bob || holder == carol);

        assert_eq!(app.ledger_count(f.asset_id).await, 1);
        assert_holder_consistent(&app, f.asset_id).await;
    }
}

mod checkin {
    use super::*;

    #[tokio::test]
    async fn good_condition_returns_to_available_at_location() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let holder = checkout_to_new_user(&app, &f, "bob").await;
        let store = app.create_location(&f.admin.token, "Storeroom").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkin",
                json!({"condition": "good", "location_id": store}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["asset"]["status"], "available");
        assert!(res.body["asset"]["current_holder_id"].is_null());
        assert_eq!(res.body["asset"]["location_id"], store);

        let tx = &res.body["transaction"];
        assert_eq!(tx["action"], "checkin");
        assert_eq!(tx["user_id"], holder);
        assert_eq!(tx["condition"], "good");
        assert_eq!(tx["location_id"], store);

        assert_eq!(app.ledger_count(f.asset_id).await, 2);
        assert_holder_consistent(&app, f.asset_id).await;
    }

    #[tokio::test]
    async fn damaged_condition_goes_to_repair() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        checkout_to_new_user(&app, &f, "bob").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkin",
                json!({"condition": "damaged", "notes": "cracked screen"}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["asset"]["status"], "repair");
        assert!(res.body["asset"]["current_holder_id"].is_null());
        assert_eq!(res.body["asset"]["location_id"], f.location_id);
        assert_eq!(res.body["transaction"]["condition"], "damaged");
        assert_eq!(res.body["transaction"]["to_status"], "repair");
        assert_holder_consistent(&app, f.asset_id).await;
    }

    #[tokio::test]
    async fn good_checkin_requires_a_location() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        checkout_to_new_user(&app, &f, "bob").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkin",
                json!({"condition": "good"}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.ledger_count(f.asset_id).await, 1);
    }

    #[tokio::test]
    async fn refused_unless_assigned() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkin",
                json!({"condition": "good", "location_id": f.location_id}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "INVALID_TRANSITION");
        assert_eq!(res.body["current_status"], "available");
        assert_eq!(app.ledger_count(f.asset_id).await, 0);
    }

    #[tokio::test]
    async fn unknown_location_rolls_back() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let holder = checkout_to_new_user(&app, &f, "bob").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkin",
                json!({"condition": "good", "location_id": 99999}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 404);
        let asset = app
            .get_with_token(&routes::asset(f.asset_id), &f.admin.token)
            .await;
        assert_eq!(asset.body["status"], "assigned");
        assert_eq!(asset.body["current_holder_id"], holder);
        assert_eq!(app.ledger_count(f.asset_id).await, 1);
    }
}

mod transfer {
    use super::*;

    #[tokio::test]
    async fn moves_without_changing_status() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let annex = app.create_location(&f.admin.token, "Annex").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "transfer",
                json!({"location_id": annex}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["asset"]["status"], "available");
        assert_eq!(res.body["asset"]["location_id"], annex);
        assert_eq!(res.body["transaction"]["from_status"], "available");
        assert_eq!(res.body["transaction"]["to_status"], "available");
        assert!(res.body["transaction"]["user_id"].is_null());
    }

    #[tokio::test]
    async fn accepted_from_repair() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let workshop = app.create_location(&f.admin.token, "Workshop").await;
        send_to_repair(&app, &f).await;

        let res = app
            .lifecycle(
                f.asset_id,
                "transfer",
                json!({"location_id": workshop}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["asset"]["status"], "repair");
    }

    #[tokio::test]
    async fn refused_while_assigned() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let annex = app.create_location(&f.admin.token, "Annex").await;
        checkout_to_new_user(&app, &f, "bob").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "transfer",
                json!({"location_id": annex}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["current_status"], "assigned");
        assert_eq!(app.ledger_count(f.asset_id).await, 1);
    }

    #[tokio::test]
    async fn racing_location_delete_is_not_an_internal_error() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;

        for i in 0..5 {
            let target = app
                .create_location(&f.admin.token, &format!("Bay {i}"))
                .await;
            let path = routes::lifecycle(f.asset_id, "transfer");
            let body = json!({"location_id": target});
            let location_path = routes::location(target);

            let (transfer, delete) = tokio::join!(
                app.post_with_token(&path, &body, &f.admin.token),
                app.delete_with_token(&location_path, &f.admin.token),
            );

            match (transfer.status, delete.status) {
                (201, 409) | (404, 204) => {}
                other => panic!(
                    "unexpected outcome {other:?}: {} / {}",
                    transfer.text, delete.text
                ),
            }
        }
    }
}

mod repair {
    use super::*;

    #[tokio::test]
    async fn repair_and_dispose_accept_a_missing_body() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;

        let res = app
            .post_empty_with_token(&routes::lifecycle(f.asset_id, "repair"), &f.admin.token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["asset"]["status"], "repair");
        assert!(res.body["transaction"]["notes"].is_null());

        let res = app
            .post_empty_with_token(&routes::lifecycle(f.asset_id, "dispose"), &f.admin.token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["asset"]["status"], "retired");
        assert_eq!(app.ledger_count(f.asset_id).await, 2);
    }

    #[tokio::test]
    async fn repair_notes_are_recorded_when_sent() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;

        let res = app
            .lifecycle(
                f.asset_id,
                "repair",
                json!({"notes": "fan noise"}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["transaction"]["notes"], "fan noise");
    }

    #[tokio::test]
    async fn only_available_assets_can_be_sent_to_repair() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        checkout_to_new_user(&app, &f, "bob").await;

        let res = app
            .lifecycle(f.asset_id, "repair", json!({}), &f.admin.token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["current_status"], "assigned");
    }

    #[tokio::test]
    async fn repair_complete_applies_location() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let shelf = app.create_location(&f.admin.token, "Shelf").await;
        send_to_repair(&app, &f).await;

        let res = app
            .lifecycle(
                f.asset_id,
                "repair-complete",
                json!({"location_id": shelf}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["asset"]["status"], "available");
        assert_eq!(res.body["asset"]["location_id"], shelf);
        assert_eq!(res.body["transaction"]["action"], "repair_complete");
    }

    #[tokio::test]
    async fn repair_complete_refused_outside_repair() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;

        let res = app
            .lifecycle(
                f.asset_id,
                "repair-complete",
                json!({"location_id": f.location_id}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["current_status"], "available");
    }
}

mod dispose {
    use super::*;

    #[tokio::test]
    async fn retires_from_available_and_repair() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        dispose(&app, &f).await;

        let asset = app
            .get_with_token(&routes::asset(f.asset_id), &f.admin.token)
            .await;
        assert_eq!(asset.body["status"], "retired");

        let other = app
            .create_asset(&f.admin.token, "Monitor", f.category_id, f.location_id)
            .await;
        let res = app
            .lifecycle(other, "repair", json!({}), &f.admin.token)
            .await;
        assert_eq!(res.status, 201);
        let res = app
            .lifecycle(other, "dispose", json!({}), &f.admin.token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["transaction"]["from_status"], "repair");
        assert_eq!(res.body["transaction"]["to_status"], "retired");
    }

    #[tokio::test]
    async fn refused_while_assigned_or_already_retired() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        checkout_to_new_user(&app, &f, "bob").await;

        let res = app
            .lifecycle(f.asset_id, "dispose", json!({}), &f.admin.token)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["current_status"], "assigned");

        let other = app
            .create_asset(&f.admin.token, "Monitor", f.category_id, f.location_id)
            .await;
        let res = app
            .lifecycle(other, "dispose", json!({}), &f.admin.token)
            .await;
        assert_eq!(res.status, 201);
        let res = app
            .lifecycle(other, "dispose", json!({}), &f.admin.token)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["current_status"], "retired");
    }

    #[tokio::test]
    async fn retired_assets_can_still_be_transferred() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let archive = app.create_location(&f.admin.token, "Archive").await;
        dispose(&app, &f).await;

        let res = app
            .lifecycle(
                f.asset_id,
                "transfer",
                json!({"location_id": archive}),
                &f.admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["asset"]["status"], "retired");
    }
}

mod permissions {
    use super::*;

    #[tokio::test]
    async fn staff_can_run_lifecycle_operations() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let staff = app.create_user_with_role("stan", "staff").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkout",
                json!({"user_id": staff.id}),
                &staff.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["transaction"]["actor_id"], staff.id);
    }

    #[tokio::test]
    async fn employees_cannot_run_lifecycle_operations() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;
        let employee = app.create_user_with_role("emma", "employee").await;

        let res = app
            .lifecycle(
                f.asset_id,
                "checkout",
                json!({"user_id": employee.id}),
                &employee.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert_eq!(app.ledger_count(f.asset_id).await, 0);
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;
        let f = app.fixture().await;

        let res = app
            .post_without_token(&routes::lifecycle(f.asset_id, "repair"), &json!({}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

#[tokio::test]
async fn checkout_damaged_checkin_repair_complete_scenario() {
    let app = TestApp::spawn().await;
    let f = app.fixture().await;
    let bob = app.insert_user("bob", "employee").await;

    let res = app
        .lifecycle(f.asset_id, "checkout", json!({"user_id": bob}), &f.admin.token)
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["asset"]["status"], "assigned");
    assert_holder_consistent(&app, f.asset_id).await;

    let res = app
        .lifecycle(
            f.asset_id,
            "checkin",
            json!({"condition": "damaged"}),
            &f.admin.token,
        )
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["asset"]["status"], "repair");
    assert_holder_consistent(&app, f.asset_id).await;

    let res = app
        .lifecycle(
            f.asset_id,
            "repair-complete",
            json!({"location_id": f.location_id}),
            &f.admin.token,
        )
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["asset"]["status"], "available");
    assert_holder_consistent(&app, f.asset_id).await;

    let history = app
        .get_with_token(&routes::asset_history(f.asset_id), &f.admin.token)
        .await;
    assert_eq!(history.status, 200);
    let entries = history.body.as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let actions: Vec<&str> = entries
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, ["checkout", "checkin", "repair_complete"]);
    assert!(entries.iter().all(|e| e["asset_id"] == f.asset_id));
    assert_eq!(entries[0]["user_id"], bob);
    assert_eq!(entries[1]["user_id"], bob);
    assert_eq!(entries[1]["condition"], "damaged");
}
