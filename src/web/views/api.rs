use poem::http::StatusCode;
use poem::web::{Data, Json};
use poem::{handler, IntoResponse, Response};

use crate::prelude::*;
use crate::service::ServiceContext;
use crate::web::models::{HealthResponse, PredictRequest, PredictResponse};

/// Any failure, malformed body included, is a `400` carrying the error message.
#[handler]
#[instrument(skip_all, level = "info")]
pub async fn post_predict(body: Vec<u8>, Data(context): Data<&ServiceContext>) -> Response {
    match predict(&body, context) {
        Ok(prediction) => {
            debug!(prediction);
            Json(PredictResponse::Success { prediction }).into_response()
        }
        Err(error) => {
            let error = format!("{:#}", error);
            info!(error = error.as_str(), "rejected");
            Json(PredictResponse::Error { error })
                .with_status(StatusCode::BAD_REQUEST)
                .into_response()
        }
    }
}

fn predict(body: &[u8], context: &ServiceContext) -> Result<f64> {
    let request: PredictRequest =
        serde_json::from_slice(body).context("failed to parse the request body")?;
    Ok(context.predict(&request.features)?)
}

#[handler]
#[instrument(skip_all, level = "debug")]
pub async fn get_health(Data(context): Data<&ServiceContext>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: context.is_model_loaded(),
        model_source: context.source(),
    })
    .with_header("Cache-Control", "no-cache")
}

#[cfg(test)]
mod tests {
    use poem::http::StatusCode;
    use serde_json::{json, Value};

    use crate::model::{LinearRegression, ModelSource, ProvidedModel, N_FEATURES};
    use crate::prelude::*;
    use crate::synthetic::fit_sample_model;
    use crate::web::test::{create_test_client, read_json};

    fn unit_model() -> ProvidedModel {
        ProvidedModel::artifact(LinearRegression::from_parameters(vec![1.0; N_FEATURES], 0.5))
    }

    fn assert_error(body: &Value) {
        assert_eq!(body["status"], "error");
        assert!(!body["error"].as_str().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn predict_reference_house_ok() -> Result {
        let (model, _) = fit_sample_model(506, 42)?;
        let client = create_test_client(ProvidedModel::artifact(model));
        let response = client
            .post("/api/predict")
            .content_type("application/json")
            .body(
                // language=JSON
                r#"{"features": {"CRIM": 0.00632, "ZN": 18.0, "INDUS": 2.31, "CHAS": 0, "NOX": 0.538, "RM": 6.575, "AGE": 65.2, "DIS": 4.09, "RAD": 1, "TAX": 296.0, "PTRATIO": 15.3, "B": 396.9, "LSTAT": 4.98}}"#,
            )
            .send()
            .await;
        response.assert_status_is_ok();

        let body = read_json(response).await?;
        assert_eq!(body["status"], "success");
        let prediction = body["prediction"]
            .as_f64()
            .ok_or_else(|| anyhow!("prediction is not a number"))?;
        assert!(prediction.is_finite());
        Ok(())
    }

    #[tokio::test]
    async fn predict_empty_features_ok() -> Result {
        let client = create_test_client(unit_model());
        let response = client
            .post("/api/predict")
            .body_json(&json!({"features": {}}))
            .send()
            .await;
        response.assert_status_is_ok();
        assert_eq!(read_json(response).await?, json!({"prediction": 0.5, "status": "success"}));
        Ok(())
    }

    #[tokio::test]
    async fn predict_without_features_key_ok() -> Result {
        let client = create_test_client(unit_model());
        let response = client.post("/api/predict").body_json(&json!({})).send().await;
        response.assert_status_is_ok();
        assert_eq!(read_json(response).await?["prediction"], 0.5);
        Ok(())
    }

    #[tokio::test]
    async fn predict_partial_features_ok() -> Result {
        let client = create_test_client(unit_model());
        let response = client
            .post("/api/predict")
            .body_json(&json!({"features": {"RM": "6", "LSTAT": 4, "PRICE": 1000}}))
            .send()
            .await;
        response.assert_status_is_ok();
        assert_eq!(read_json(response).await?["prediction"], 10.5);
        Ok(())
    }

    #[tokio::test]
    async fn predict_twice_same_result_ok() -> Result {
        let (model, _) = fit_sample_model(506, 42)?;
        let client = create_test_client(ProvidedModel::artifact(model));
        let request = json!({"features": {"RM": 6.575, "LSTAT": 4.98, "TAX": 296}});

        let first = read_json(client.post("/api/predict").body_json(&request).send().await).await?;
        let second = read_json(client.post("/api/predict").body_json(&request).send().await).await?;
        assert_eq!(first["status"], "success");
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn predict_non_numeric_bad_request() -> Result {
        let client = create_test_client(unit_model());
        let response = client
            .post("/api/predict")
            .body_json(&json!({"features": {"CRIM": "a lot"}}))
            .send()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = read_json(response).await?;
        assert_error(&body);
        assert!(body["error"].as_str().unwrap_or_default().contains("CRIM"));
        Ok(())
    }

    #[tokio::test]
    async fn predict_invalid_json_bad_request() -> Result {
        let client = create_test_client(unit_model());
        let response = client
            .post("/api/predict")
            .content_type("application/json")
            .body("{\"features\": ")
            .send()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error(&read_json(response).await?);
        Ok(())
    }

    #[tokio::test]
    async fn predict_features_not_object_bad_request() -> Result {
        let client = create_test_client(unit_model());
        let response = client
            .post("/api/predict")
            .body_json(&json!({"features": [0.1, 18.0]}))
            .send()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error(&read_json(response).await?);
        Ok(())
    }

    #[tokio::test]
    async fn predict_placeholder_not_fitted_bad_request() -> Result {
        let client = create_test_client(ProvidedModel::placeholder());
        let response = client
            .post("/api/predict")
            .body_json(&json!({"features": {"RM": 6.0}}))
            .send()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = read_json(response).await?;
        assert_error(&body);
        assert!(body["error"].as_str().unwrap_or_default().contains("not fitted"));
        Ok(())
    }

    #[tokio::test]
    async fn predict_unavailable_bad_request() -> Result {
        let client = create_test_client(ProvidedModel::unavailable());
        let response = client
            .post("/api/predict")
            .body_json(&json!({"features": {}}))
            .send()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            read_json(response).await?,
            json!({"error": "model is not loaded", "status": "error"}),
        );
        Ok(())
    }

    #[tokio::test]
    async fn predict_wrong_method_not_allowed() -> Result {
        let client = create_test_client(unit_model());
        let response = client.get("/api/predict").send().await;
        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        Ok(())
    }

    #[tokio::test]
    async fn health_artifact_ok() -> Result {
        let client = create_test_client(unit_model());
        let response = client.get("/api/health").send().await;
        response.assert_status_is_ok();
        assert_eq!(
            read_json(response).await?,
            json!({"status": "healthy", "model_loaded": true, "model_source": "artifact"}),
        );
        Ok(())
    }

    #[tokio::test]
    async fn health_placeholder_ok() -> Result {
        let client = create_test_client(ProvidedModel::placeholder());
        let body = read_json(client.get("/api/health").send().await).await?;
        assert_eq!(body["model_loaded"], true);
        assert_eq!(
            body["model_source"],
            serde_json::to_value(ModelSource::Placeholder)?,
        );
        Ok(())
    }

    #[tokio::test]
    async fn health_unavailable_ok() -> Result {
        let client = create_test_client(ProvidedModel::unavailable());
        let body = read_json(client.get("/api/health").send().await).await?;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model_loaded"], false);
        assert_eq!(body["model_source"], "none");
        Ok(())
    }
}
