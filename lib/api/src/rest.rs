use crate::error::ApiError;
use crate::state::ServiceState;
use actix_cors::Cors;
use actix_web::{error, middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use creditx_core::{
    AttributionEntry, ClientAnalysis, CompleteClientInput, Decision, DemoClientInput, Error,
    InputVariant, RiskLevel, Scored,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_CLIENT_LIMIT: usize = 100;
const INTERPRETATION: &str =
    "positive impact increases the default risk | negative impact decreases it";

type ApiResult = Result<HttpResponse, ApiError>;

#[derive(Deserialize)]
struct PredictClientRequest {
    client_id: u64,
}

#[derive(Deserialize)]
struct ClientsQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct PredictionBody {
    probability: f64,
    decision: Decision,
    confidence: f64,
    risk_level: RiskLevel,
}

#[derive(Serialize)]
struct DemoResponse {
    method: &'static str,
    prediction: PredictionBody,
    client_analysis: ClientAnalysis,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct CompleteResponse {
    method: &'static str,
    features_used: usize,
    total_features: usize,
    probability: f64,
    decision: Decision,
    confidence: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct ClientPrediction {
    client_id: u64,
    risk_score: f64,
    risk_percentage: String,
    threshold: f64,
    decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    real_target: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    real_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prediction_correct: Option<bool>,
}

#[derive(Serialize)]
struct ClientSummary {
    client_id: u64,
    risk_score: f64,
    decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    real_target: Option<u8>,
}

#[derive(Serialize)]
struct ExplainResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<u64>,
    top_features: Vec<AttributionEntry>,
    interpretation: &'static str,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn warnings(scored: &Scored) -> Vec<String> {
    scored
        .fallbacks
        .iter()
        .map(|f| {
            format!(
                "unrecognised {} value '{}', encoded as {}",
                f.field, f.raw, f.code
            )
        })
        .collect()
}

/// Malformed bodies, queries and paths are validation failures
fn bad_input(err: impl std::fmt::Display, _req: &HttpRequest) -> error::Error {
    ApiError(Error::validation("request", err.to_string())).into()
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: Arc<ServiceState>, host: String, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .wrap(middleware::Logger::default())
                .app_data(web::Data::new(state.clone()))
                .configure(configure)
        })
        .bind((host.as_str(), port))?
        .run()
        .await
    }
}

/// Register routes and extractor error handlers
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|e, req| bad_input(e, req)))
        .app_data(web::QueryConfig::default().error_handler(|e, req| bad_input(e, req)))
        .app_data(web::PathConfig::default().error_handler(|e, req| bad_input(e, req)))
        .route("/", web::get().to(root))
        .route("/status", web::get().to(status))
        .route("/model/info", web::get().to(model_info))
        .route("/predict", web::post().to(predict_client))
        .route("/predict/demo", web::post().to(predict_demo))
        .route("/predict/complete", web::post().to(predict_complete))
        .route("/clients", web::get().to(list_clients))
        .route("/explain/demo", web::post().to(explain_demo))
        .route("/explain/{client_id}", web::get().to(explain_client));
}

async fn root(state: web::Data<Arc<ServiceState>>) -> HttpResponse {
    let (status, model_type, threshold) = match state.artifacts() {
        Ok(a) => ("online", Some(a.model_type), Some(a.context.threshold())),
        Err(_) => ("unavailable", None, None),
    };
    HttpResponse::Ok().json(serde_json::json!({
        "api": "creditx",
        "version": env!("CARGO_PKG_VERSION"),
        "status": status,
        "model_type": model_type,
        "threshold": threshold,
        "modes": {
            "demo": "POST /predict/demo - high-signal fields with range checks",
            "complete": "POST /predict/complete - all fields",
        }
    }))
}

async fn status(state: web::Data<Arc<ServiceState>>) -> HttpResponse {
    match &**state.get_ref() {
        ServiceState::Ready(a) => HttpResponse::Ok().json(serde_json::json!({
            "status": "operational",
            "model_loaded": true,
            "model_type": a.model_type,
            "features_count": a.context.schema().len(),
            "threshold": a.context.threshold(),
            "explainer_available": a.context.has_explainer(),
            "imputer_available": a.context.has_imputer(),
            "imputation": a.context.imputation(),
            "clients_available": a.clients.is_some(),
            "loaded_at": a.loaded_at,
        })),
        ServiceState::Unavailable { reason } => {
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unavailable",
                "model_loaded": false,
                "reason": reason,
            }))
        }
    }
}

async fn model_info(state: web::Data<Arc<ServiceState>>) -> ApiResult {
    let a = state.artifacts()?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "model_type": a.metadata.model_type.as_deref().unwrap_or(a.model_type),
        "model_format": a.model_type,
        "auc_score": a.metadata.auc_score,
        "threshold": a.context.threshold(),
        "threshold_source": a.threshold_source,
        "optimal_cost": a.metadata.optimal_cost,
        "features_count": a.context.schema().len(),
        "training_date": a.metadata.training_date,
        "confusion_matrix": a.metadata.confusion_matrix,
        "model_sha256": a.model_sha256,
        "loaded_at": a.loaded_at,
    })))
}

async fn predict_demo(
    state: web::Data<Arc<ServiceState>>,
    req: web::Json<DemoClientInput>,
) -> ApiResult {
    let a = state.artifacts()?;
    let prediction = a.context.score_demo(&req)?;
    let result = prediction.scored.result;

    Ok(HttpResponse::Ok().json(DemoResponse {
        method: "demo_mode",
        prediction: PredictionBody {
            probability: round_to(result.probability, 4),
            decision: result.decision,
            confidence: round_to(result.confidence, 3),
            risk_level: prediction.risk_level,
        },
        warnings: warnings(&prediction.scored),
        client_analysis: prediction.analysis,
    }))
}

async fn predict_complete(
    state: web::Data<Arc<ServiceState>>,
    req: web::Json<CompleteClientInput>,
) -> ApiResult {
    let a = state.artifacts()?;
    let scored = a.context.score_complete(&req)?;

    Ok(HttpResponse::Ok().json(CompleteResponse {
        method: "complete_mode",
        features_used: scored.features_used(),
        total_features: a.context.schema().len(),
        probability: round_to(scored.result.probability, 4),
        decision: scored.result.decision,
        confidence: round_to(scored.result.confidence, 3),
        warnings: warnings(&scored),
    }))
}

async fn predict_client(
    state: web::Data<Arc<ServiceState>>,
    req: web::Json<PredictClientRequest>,
) -> ApiResult {
    let a = state.artifacts()?;
    let client = state
        .clients()?
        .get(req.client_id)
        .ok_or_else(|| Error::NotFound(format!("client {}", req.client_id)))?;

    let scored = a
        .context
        .score_record(&client.features, InputVariant::Complete)?;
    let result = scored.result;

    let predicted_default = result.decision == Decision::Reject;
    Ok(HttpResponse::Ok().json(ClientPrediction {
        client_id: client.client_id,
        risk_score: result.probability,
        risk_percentage: format!("{:.2}%", result.probability * 100.0),
        threshold: a.context.threshold(),
        decision: result.decision,
        real_target: client.real_target,
        real_label: client
            .real_target
            .map(|t| if t == 1 { "default" } else { "repaid" }),
        prediction_correct: client.real_target.map(|t| (t == 1) == predicted_default),
    }))
}

async fn list_clients(
    state: web::Data<Arc<ServiceState>>,
    query: web::Query<ClientsQuery>,
) -> ApiResult {
    let a = state.artifacts()?;
    let store = state.clients()?;
    let limit = query.limit.unwrap_or(DEFAULT_CLIENT_LIMIT);

    let clients = store
        .list(limit)
        .iter()
        .map(|client| {
            let scored = a
                .context
                .score_record(&client.features, InputVariant::Complete)?;
            Ok(ClientSummary {
                client_id: client.client_id,
                risk_score: scored.result.probability,
                decision: scored.result.decision,
                real_target: client.real_target,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "total_clients": store.len(),
        "clients_returned": clients.len(),
        "clients": clients,
    })))
}

async fn explain_client(
    state: web::Data<Arc<ServiceState>>,
    path: web::Path<u64>,
) -> ApiResult {
    let client_id = path.into_inner();
    let a = state.artifacts()?;
    let client = state
        .clients()?
        .get(client_id)
        .ok_or_else(|| Error::NotFound(format!("client {}", client_id)))?;

    let top_features = a
        .context
        .explain_record(&client.features, InputVariant::Complete)?;

    Ok(HttpResponse::Ok().json(ExplainResponse {
        client_id: Some(client_id),
        top_features,
        interpretation: INTERPRETATION,
    }))
}

async fn explain_demo(
    state: web::Data<Arc<ServiceState>>,
    req: web::Json<DemoClientInput>,
) -> ApiResult {
    let a = state.artifacts()?;
    let top_features = a.context.explain_demo(&req)?;

    Ok(HttpResponse::Ok().json(ExplainResponse {
        client_id: None,
        top_features,
        interpretation: INTERPRETATION,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use chrono::Utc;
    use creditx_core::{
        Explainer, FeatureSchema, PartialClientRecord, Result as CoreResult, Scorer,
        ScoringContext,
    };
    use creditx_storage::{ClientStore, LoadedArtifacts, ModelMetadata, StoredClient, ThresholdSource};
    use serde_json::{json, Value};

    struct Linear(Vec<f64>);

    impl Scorer for Linear {
        fn predict_probability(&self, features: &[f64]) -> CoreResult<f64> {
            let z: f64 = -1.0 + self.0.iter().zip(features).map(|(w, x)| w * x).sum::<f64>();
            Ok(1.0 / (1.0 + (-z).exp()))
        }
    }

    impl Explainer for Linear {
        fn explain(&self, features: &[f64]) -> CoreResult<Vec<f64>> {
            Ok(self.0.iter().zip(features).map(|(w, x)| w * x).collect())
        }
    }

    fn ready_state() -> Arc<ServiceState> {
        let schema = FeatureSchema::from_names([
            "EXT_SOURCE_1",
            "EXT_SOURCE_2",
            "EXT_SOURCE_3",
            "AMT_CREDIT",
            "AMT_GOODS_PRICE",
            "CODE_GENDER",
            "NAME_EDUCATION_TYPE",
        ])
        .unwrap();
        let model = Arc::new(Linear(vec![-2.0, -3.0, -2.5, 0.000002, -0.000001, 0.1, -0.2]));
        let context = ScoringContext::builder(schema, model.clone())
            .explainer(model)
            .threshold(0.09)
            .build()
            .unwrap();

        let clients = ClientStore::new(vec![
            StoredClient {
                client_id: 396899,
                real_target: Some(0),
                features: PartialClientRecord::new()
                    .with("EXT_SOURCE_2", 0.9)
                    .with("EXT_SOURCE_3", 0.9)
                    .with("AMT_CREDIT", 150000.0),
            },
            StoredClient {
                client_id: 345558,
                real_target: Some(1),
                features: PartialClientRecord::new()
                    .with("EXT_SOURCE_2", 0.05)
                    .with("AMT_CREDIT", 900000.0),
            },
        ])
        .unwrap();

        Arc::new(ServiceState::ready(LoadedArtifacts {
            context: Arc::new(context),
            model_type: "logistic",
            metadata: ModelMetadata {
                model_type: Some("lightgbm".to_string()),
                auc_score: Some(0.78),
                ..ModelMetadata::default()
            },
            clients: Some(Arc::new(clients)),
            model_sha256: "0".repeat(64),
            threshold_source: ThresholdSource::Override,
            loaded_at: Utc::now(),
        }))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_status_ready() {
        let app = app!(ready_state());
        let resp = test::call_service(&app, test::TestRequest::get().uri("/status").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "operational");
        assert_eq!(body["features_count"], 7);
        assert_eq!(body["explainer_available"], true);
    }

    #[actix_web::test]
    async fn test_status_unavailable() {
        let state = Arc::new(ServiceState::unavailable("missing feature_columns.json"));
        let app = app!(state);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/status").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["model_loaded"], false);

        let req = test::TestRequest::post()
            .uri("/predict/demo")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "unavailable");
    }

    #[actix_web::test]
    async fn test_predict_demo() {
        let app = app!(ready_state());
        let req = test::TestRequest::post()
            .uri("/predict/demo")
            .set_json(json!({
                "AMT_GOODS_PRICE": 450000,
                "AMT_CREDIT": 500000,
                "AMT_ANNUITY": 25000,
                "DAYS_BIRTH": -15000,
                "EXT_SOURCE_1": 0.5,
                "EXT_SOURCE_2": 0.5,
                "EXT_SOURCE_3": 0.5,
                "CODE_GENDER": "M"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["method"], "demo_mode");
        let p = body["prediction"]["probability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&p));
        let expected = if p >= 0.09 { "reject" } else { "accept" };
        assert_eq!(body["prediction"]["decision"], expected);
        let confidence = body["prediction"]["confidence"].as_f64().unwrap();
        assert!((0.5..=1.0).contains(&confidence));
        assert_eq!(body["client_analysis"]["age_years"], 41);
        assert_eq!(body["client_analysis"]["credit_goods_ratio_label"], "111.1%");
        assert!(body.get("warnings").is_none());
    }

    #[actix_web::test]
    async fn test_predict_demo_fallback_warning() {
        let app = app!(ready_state());
        let req = test::TestRequest::post()
            .uri("/predict/demo")
            .set_json(json!({ "CODE_GENDER": "unknown" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_predict_demo_validation() {
        let app = app!(ready_state());
        let req = test::TestRequest::post()
            .uri("/predict/demo")
            .set_json(json!({ "AMT_CREDIT": -100000, "AMT_GOODS_PRICE": 300000 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "validation");
        assert!(body["error"].as_str().unwrap().contains("AMT_CREDIT"));
    }

    #[actix_web::test]
    async fn test_malformed_body() {
        let app = app!(ready_state());
        let req = test::TestRequest::post()
            .uri("/predict/complete")
            .set_json(json!({ "AMT_CREDIT": 1.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_predict_complete() {
        let app = app!(ready_state());
        let req = test::TestRequest::post()
            .uri("/predict/complete")
            .set_json(json!({
                "AMT_INCOME_TOTAL": 200000.0,
                "AMT_CREDIT": 500000.0,
                "AMT_ANNUITY": 25000.0,
                "AMT_GOODS_PRICE": 450000.0,
                "DAYS_BIRTH": -12000,
                "EXT_SOURCE_2": 0.7,
                "NAME_EDUCATION_TYPE": "Higher education"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["method"], "complete_mode");
        assert_eq!(body["total_features"], 7);
        // AMT_CREDIT, AMT_GOODS_PRICE, EXT_SOURCE_2, CODE_GENDER (M -> 1), education (1)
        assert_eq!(body["features_used"], 5);
    }

    #[actix_web::test]
    async fn test_predict_stored_client() {
        let app = app!(ready_state());
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(json!({ "client_id": 396899 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["client_id"], 396899);
        assert_eq!(body["real_label"], "repaid");
        let accepted = body["decision"] == "accept";
        assert_eq!(body["prediction_correct"], accepted);

        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(json!({ "client_id": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_list_clients() {
        let app = app!(ready_state());
        let req = test::TestRequest::get().uri("/clients?limit=1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total_clients"], 2);
        assert_eq!(body["clients_returned"], 1);
        assert_eq!(body["clients"][0]["client_id"], 396899);

        let req = test::TestRequest::get().uri("/clients?limit=abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_explain_client() {
        let app = app!(ready_state());
        let req = test::TestRequest::get().uri("/explain/345558").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let features = body["top_features"].as_array().unwrap();
        assert_eq!(features.len(), 7);
        // AMT_CREDIT: 0.000002 * 900000 = 1.8
        assert_eq!(features[0]["feature"], "AMT_CREDIT");
        assert_eq!(features[0]["direction"], "increases risk");

        let req = test::TestRequest::get().uri("/explain/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_explain_demo() {
        let app = app!(ready_state());
        let req = test::TestRequest::post()
            .uri("/explain/demo")
            .set_json(json!({}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert!(body.get("client_id").is_none());
        let features = body["top_features"].as_array().unwrap();
        assert!(!features.is_empty());
        assert!(features.len() <= 10);
    }

    #[actix_web::test]
    async fn test_model_info() {
        let app = app!(ready_state());
        let req = test::TestRequest::get().uri("/model/info").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["model_type"], "lightgbm");
        assert_eq!(body["model_format"], "logistic");
        assert_eq!(body["threshold"], 0.09);
        assert_eq!(body["threshold_source"], "override");
    }
}
