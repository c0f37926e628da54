// Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

mod actions;
mod api;
mod pages;

pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/view", get(api::get_view))
        .route("/cars", get(api::query_cars))
        .route("/intents", post(api::apply_intent))
        .route("/filters", post(api::patch_filters))
        .route("/wishlist", get(api::get_wishlist))
        .route("/wishlist/export.csv", get(api::export_wishlist))
        .route("/wishlist/:id", post(api::toggle_wishlist))
        .route("/theme", post(api::toggle_theme))
        .with_state(app_state.clone());

    let action_router = Router::new()
        .route("/filters", post(actions::apply_filters))
        .route("/page", post(actions::change_page))
        .route("/wishlist/:id", post(actions::toggle_wishlist))
        .route("/theme", post(actions::toggle_theme))
        .with_state(app_state.clone());

    Router::new()
        .route("/", get(pages::index_page))
        .nest("/api", api_router)
        .nest("/actions", action_router)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_car;
    use crate::session::Session;
    use crate::store::{KeyValueStore, MemoryStore};
    use reqwest::{Client, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    async fn spawn_app(session: Session) -> String {
        let app_state = AppState {
            session: session.shared(),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = create_router(app_state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn ready_session(page_size: usize) -> Session {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = Session::new(store, page_size);
        session.finish_load(Ok(vec![
            test_car(1, "Toyota", "Corolla", "20000"),
            test_car(2, "Honda", "Civic", "22000"),
        ]));
        session
    }

    fn page_ids(view: &Value) -> Vec<u64> {
        view["page"]["cars"]
            .as_array()
            .unwrap()
            .iter()
            .map(|car| car["id"].as_u64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn stateless_query_filters_sorts_and_pages() {
        let base = spawn_app(ready_session(1)).await;
        let client = Client::new();

        let page: Value = client
            .get(format!("{}/api/cars?brand=toy", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page["total"], 1);
        assert_eq!(page["cars"][0]["id"], 1);

        let page: Value = client
            .get(format!("{}/api/cars?sort=high&page=2", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page["count"], 2);
        assert_eq!(page["cars"][0]["id"], 1);

        let page: Value = client
            .get(format!("{}/api/cars?page=3", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page["cars"], json!([]));
    }

    #[tokio::test]
    async fn query_is_unavailable_until_catalog_loads() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let base = spawn_app(Session::new(store, 10)).await;

        let response = Client::new().get(format!("{}/api/cars", base)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let view: Value = Client::new()
            .get(format!("{}/api/view", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["loading"], true);
        assert_eq!(view["loadState"]["status"], "loading");
    }

    #[tokio::test]
    async fn intents_and_filter_patches_update_the_session() {
        let base = spawn_app(ready_session(10)).await;
        let client = Client::new();

        let view: Value = client
            .post(format!("{}/api/intents", base))
            .json(&json!({ "type": "setSort", "sort": "priceDescending" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page_ids(&view), vec![2, 1]);

        let view: Value = client
            .post(format!("{}/api/filters", base))
            .json(&json!({ "maxPrice": 21000, "colour": "red" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page_ids(&view), vec![1]);
        assert_eq!(view["criteria"]["maxPrice"], "21000");

        let view: Value = client
            .post(format!("{}/api/filters", base))
            .json(&json!({ "maxPrice": null }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page_ids(&view), vec![2, 1]);
    }

    #[tokio::test]
    async fn wishlist_toggle_export_and_unknown_id() {
        let base = spawn_app(ready_session(10)).await;
        let client = Client::new();

        let view: Value = client
            .post(format!("{}/api/wishlist/2", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["wishlist"][0]["name"], "Civic");

        let entries: Value = client
            .get(format!("{}/api/wishlist", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(entries.as_array().unwrap().len(), 1);

        let csv = client
            .get(format!("{}/api/wishlist/export.csv", base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(csv.contains("2,Honda,Civic"));

        let missing = client.post(format!("{}/api/wishlist/404", base)).send().await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn html_page_renders_cards_and_form_actions_redirect_back() {
        let base = spawn_app(ready_session(10)).await;
        let client = Client::new();

        let html = client.get(&base).send().await.unwrap().text().await.unwrap();
        assert!(html.contains("Toyota Corolla"));
        assert!(html.contains("₹22,000"));
        assert!(html.contains("No Cars Wishlisted"));

        // Redirects are followed, so the response is the re-rendered page
        let html = client
            .post(format!("{}/actions/filters", base))
            .form(&[("search", "civic"), ("brand", ""), ("sort", "low")])
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Honda Civic"));
        assert!(!html.contains("Toyota Corolla"));

        let html = client
            .post(format!("{}/actions/wishlist/2", base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Remove from Wishlist"));
        assert!(!html.contains("No Cars Wishlisted"));

        let html = client
            .post(format!("{}/actions/theme", base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Light Mode"));
    }

    #[tokio::test]
    async fn error_state_page_shows_single_message() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = Session::new(store, 10);
        session.finish_load(crate::normalizer::normalize(json!("not an array")));
        let base = spawn_app(session).await;

        let html = Client::new().get(&base).send().await.unwrap().text().await.unwrap();
        assert!(html.contains(crate::error::FETCH_FAILURE_MESSAGE));
        assert!(!html.contains("name=\"brand\""));
    }

    #[tokio::test]
    async fn encoded_text_id_toggles_through_form_action() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = Session::new(store, 10);
        let mut rio = test_car(1, "Kia", "Rio", "9000");
        rio.id = crate::models::CarId::Text("rio/2019?lx".to_string());
        session.finish_load(Ok(vec![rio]));
        let base = spawn_app(session).await;
        let client = Client::new();

        let html = client.get(&base).send().await.unwrap().text().await.unwrap();
        let action = html
            .split("action=\"")
            .find_map(|rest| rest.split('"').next().filter(|a| a.starts_with("/actions/wishlist/")))
            .unwrap()
            .to_string();
        assert_eq!(action, "/actions/wishlist/rio%2F2019%3Flx");

        let html = client
            .post(format!("{}{}", base, action))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Remove from Wishlist"));
        assert!(html.contains("https://via.placeholder.com/150x100"));
    }
}
