use poem::web::Json;
use poem::{handler, IntoResponse};

use crate::prelude::*;
use crate::web::models::IndexResponse;

#[handler]
#[instrument(skip_all, level = "debug")]
pub async fn get_index() -> impl IntoResponse {
    Json(IndexResponse {
        message: "House Price Prediction API",
        status: "running",
    })
}

#[cfg(test)]
mod tests {
    use poem::http::StatusCode;

    use crate::model::ProvidedModel;
    use crate::prelude::*;
    use crate::web::test::{create_test_client, read_json};

    #[tokio::test]
    async fn get_index_ok() -> Result {
        let client = create_test_client(ProvidedModel::unavailable());
        let response = client.get("/").send().await;
        response.assert_status_is_ok();
        assert_eq!(
            read_json(response).await?,
            serde_json::json!({"message": "House Price Prediction API", "status": "running"}),
        );
        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_route_not_found() -> Result {
        let client = create_test_client(ProvidedModel::unavailable());
        let response = client.get("/api/unknown").send().await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await?["status"], "error");
        Ok(())
    }

    #[tokio::test]
    async fn cross_origin_ok() -> Result {
        let client = create_test_client(ProvidedModel::unavailable());
        let response = client
            .get("/")
            .header("Origin", "http://localhost:3000")
            .send()
            .await;
        response.assert_status_is_ok();
        assert!(response.0.headers().contains_key("access-control-allow-origin"));
        Ok(())
    }
}
