//! Bike resource handlers
//!
//! Read-only endpoints under `/api/bike`. Each call opens one store session,
//! runs one query and releases the session before the response is built.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::model::Include;
use crate::store::{BikeFilter, StoreError};

/// `GET /api/bike`: every bike with its owner
pub async fn list(state: &AppState, is_head: bool) -> Response<Full<Bytes>> {
    match state
        .store
        .run(|session| session.bikes(Include::OWNER, BikeFilter::All))
        .await
    {
        Ok(bikes) => http::build_json_response(StatusCode::OK, &bikes, is_head),
        Err(e) => store_failure("list bikes", &e),
    }
}

/// `GET /api/bike/{id}`: one bike with owner, bike type and work orders
pub async fn get_by_id(state: &AppState, raw_id: &str, is_head: bool) -> Response<Full<Bytes>> {
    let Ok(id) = raw_id.parse::<i64>() else {
        return http::build_400_response(&format!("'{raw_id}' is not a valid bike id"));
    };

    match state.store.run(move |session| session.find_bike(id)).await {
        Ok(Some(bike)) => http::build_json_response(StatusCode::OK, &bike, is_head),
        Ok(None) => http::build_empty_response(StatusCode::NOT_FOUND),
        Err(e) => store_failure("get bike", &e),
    }
}

/// `GET /api/bike/inventory`: number of bikes with an open work order
pub async fn inventory(state: &AppState, is_head: bool) -> Response<Full<Bytes>> {
    match state
        .store
        .run(|session| session.count_bikes_in_service())
        .await
    {
        Ok(count) => http::build_json_response(StatusCode::OK, &count, is_head),
        Err(e) => store_failure("count inventory", &e),
    }
}

fn store_failure(operation: &str, error: &StoreError) -> Response<Full<Bytes>> {
    logger::log_error(&format!("[Store] {operation} failed: {error}"));
    http::build_500_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::testing;
    use crate::store::fixtures::TestDb;
    use http_body_util::BodyExt;
    use serde_json::Value;

    fn state_for(db: &TestDb) -> AppState {
        AppState::new(&testing::config(db.store.path().to_str().unwrap()))
    }

    async fn body_json(resp: Response<Full<Bytes>>) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_empty_store() {
        let db = TestDb::new();
        let state = state_for(&db);

        let resp = list(&state, false).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([]));

        let resp = inventory(&state, false).await;
        assert_eq!(body_json(resp).await, serde_json::json!(0));
    }

    #[tokio::test]
    async fn test_bike_without_work_orders() {
        let db = TestDb::new();
        let owner = db.add_owner("A");
        let kind = db.add_bike_type("Road");
        db.add_bike_with_id(1, owner, kind);
        let state = state_for(&db);

        let resp = get_by_id(&state, "1", false).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let bike = body_json(resp).await;
        assert_eq!(bike["id"], 1);
        assert_eq!(bike["owner"]["name"], "A");
        assert_eq!(bike["bikeType"]["name"], "Road");
        assert_eq!(bike["workOrders"], serde_json::json!([]));

        let resp = inventory(&state, false).await;
        assert_eq!(body_json(resp).await, serde_json::json!(0));
    }

    #[tokio::test]
    async fn test_open_work_order_counts() {
        let db = TestDb::new();
        let owner = db.add_owner("A");
        let kind = db.add_bike_type("Road");
        db.add_bike_with_id(2, owner, kind);
        let order = db.add_work_order(2, false);
        db.add_bike_with_id(3, owner, kind);
        db.add_work_order(3, true);
        let state = state_for(&db);

        let resp = inventory(&state, false).await;
        assert_eq!(body_json(resp).await, serde_json::json!(1));

        let bike = body_json(get_by_id(&state, "2", false).await).await;
        assert_eq!(bike, body_json(get_by_id(&state, "2", false).await).await);
        let orders = bike["workOrders"].as_array().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["id"], order);
        assert!(orders[0]["dateCompleted"].is_null());
        assert!(orders[0]["dateInitiated"].is_string());

        let bike = body_json(get_by_id(&state, "3", false).await).await;
        assert!(bike["workOrders"][0]["dateCompleted"].is_string());
    }

    #[tokio::test]
    async fn test_missing_bike_is_404_without_body() {
        let db = TestDb::new();
        let state = state_for(&db);

        let resp = get_by_id(&state, "999", false).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_non_integer_id_is_rejected() {
        let db = TestDb::new();
        let state = state_for(&db);
        assert_eq!(
            get_by_id(&state, "abc", false).await.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_by_id(&state, "1.5", false).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_list_has_owners_and_is_idempotent() {
        let db = TestDb::new();
        let a = db.add_owner("A");
        let b = db.add_owner("B");
        let kind = db.add_bike_type("Cruiser");
        db.add_bike(a, kind);
        db.add_bike(b, kind);
        let state = state_for(&db);

        let first = body_json(list(&state, false).await).await;
        let second = body_json(list(&state, false).await).await;
        assert_eq!(first, second);

        let bikes = first.as_array().unwrap();
        assert_eq!(bikes.len(), 2);
        assert!(bikes.iter().all(|bike| bike["owner"].is_object()));
        assert!(bikes.iter().all(|bike| bike["bikeType"].is_null()));
        assert!(bikes.iter().all(|bike| bike["workOrders"].is_null()));
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.db");
        let state = AppState::new(&testing::config(absent.to_str().unwrap()));
        assert!(state.store.session().is_err());
        assert_eq!(
            list(&state, false).await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
