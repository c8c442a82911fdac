use barnacle_shop_api::routes::health::{health_check, home};

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
}

#[tokio::test]
async fn home_points_at_docs() {
    let response = home().await;
    let data = response.0.data.expect("home data");
    assert_eq!(data["docs"], "/docs");
}
