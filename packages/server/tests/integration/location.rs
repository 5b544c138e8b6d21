use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn create_update_and_search() {
    let app = TestApp::spawn().await;
    let admin = app.create_user_with_role("admin", "admin").await;

    let res = app
        .post_with_token(
            routes::LOCATIONS,
            &json!({"name": "Warehouse", "address": "12 Dock Road"}),
            &admin.token,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["address"], "12 Dock Road");
    let id = res.id();
    app.create_location(&admin.token, "Branch Office").await;

    let res = app
        .get_with_token(&format!("{}?search=dock", routes::LOCATIONS), &admin.token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["pagination"]["total"], 1);
    assert_eq!(res.body["data"][0]["id"], id);

    let res = app
        .patch_with_token(
            &routes::location(id),
            &json!({"name": "Main Warehouse"}),
            &admin.token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["name"], "Main Warehouse");
    assert_eq!(res.body["address"], "12 Dock Road");

    let res = app
        .patch_with_token(
            &routes::location(id),
            &json!({"name": "Branch Office"}),
            &admin.token,
        )
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn unused_locations_can_be_deleted() {
    let app = TestApp::spawn().await;
    let admin = app.create_user_with_role("admin", "admin").await;
    let id = app.create_location(&admin.token, "Pop-up Store").await;

    let res = app
        .delete_with_token(&routes::location(id), &admin.token)
        .await;
    assert_eq!(res.status, 204);

    let res = app.get_with_token(&routes::location(id), &admin.token).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn locations_holding_assets_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let f = app.fixture().await;

    let res = app
        .delete_with_token(&routes::location(f.location_id), &f.admin.token)
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn locations_in_the_ledger_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let f = app.fixture().await;
    let depot = app.create_location(&f.admin.token, "Depot").await;

    // Move the asset through the depot and back out again.
    for location_id in [depot, f.location_id] {
        let res = app
            .lifecycle(
                f.asset_id,
                "transfer",
                json!({"location_id": location_id}),
                &f.admin.token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app
        .delete_with_token(&routes::location(depot), &f.admin.token)
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn employees_cannot_list_locations() {
    let app = TestApp::spawn().await;
    let emma = app.create_user_with_role("emma", "employee").await;

    let res = app.get_with_token(routes::LOCATIONS, &emma.token).await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}
