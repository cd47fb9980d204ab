//! Thin HTTP wrapper over the prover.
//!
//! POST /api/prove   — validate a CompactLog inside the zkVM, return a proof
//! POST /api/verify  — cryptographically verify a previously issued proof
//! GET  /health      — liveness plus the active guest image id

use actix_cors::Cors;
use actix_web::{http::StatusCode, middleware, web, App, HttpResponse, HttpServer, Responder};
use host::{generate_pong_proof, verify_pong_proof, PongProof, ReceiptKind};
use pong_core::CompactLog;
use serde::{Deserialize, Serialize};

/// Mirrors the host-side log file cap.
const JSON_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Deserialize)]
struct ProveRequest {
    log: CompactLog,
    #[serde(default)]
    receipt_kind: Option<ReceiptKind>,
}

#[derive(Serialize)]
struct ProveResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    proof: Option<PongProof>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct VerifyRequest {
    proof: PongProof,
}

#[derive(Serialize)]
struct VerifyResponse {
    success: bool,
    is_valid: bool,
    fair: bool,
    left_score: u32,
    right_score: u32,
    game_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn json_error(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "error": message.into(),
    }))
}

async fn prove(req: web::Json<ProveRequest>) -> impl Responder {
    let ProveRequest { log, receipt_kind } = req.into_inner();
    let receipt_kind = receipt_kind.unwrap_or_default();
    tracing::info!(game_id = log.game_id, %receipt_kind, "prove request");

    // Proving is CPU-bound for minutes; keep it off the async workers.
    let result = web::block(move || generate_pong_proof(&log, receipt_kind)).await;

    match result {
        Ok(Ok(proof)) => {
            tracing::info!(game_id = proof.game_id, fair = proof.fair, "proof generated");
            HttpResponse::Ok().json(ProveResponse {
                success: true,
                proof: Some(proof),
                error: None,
            })
        }
        Ok(Err(e)) => {
            tracing::error!("proof generation failed: {e:#}");
            HttpResponse::InternalServerError().json(ProveResponse {
                success: false,
                proof: None,
                error: Some(format!("{e:#}")),
            })
        }
        Err(e) => {
            tracing::error!("prover task failed: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "prover task failed")
        }
    }
}

async fn verify(req: web::Json<VerifyRequest>) -> impl Responder {
    let proof = req.into_inner().proof;
    tracing::info!(game_id = proof.game_id, "verify request");

    match verify_pong_proof(&proof) {
        Ok(()) => HttpResponse::Ok().json(VerifyResponse {
            success: true,
            is_valid: true,
            fair: proof.fair,
            left_score: proof.left_score,
            right_score: proof.right_score,
            game_id: proof.game_id,
            error: None,
        }),
        Err(e) => {
            tracing::warn!(game_id = proof.game_id, "receipt rejected: {e:#}");
            HttpResponse::Ok().json(VerifyResponse {
                success: true,
                is_valid: false,
                fair: false,
                left_score: 0,
                right_score: 0,
                game_id: proof.game_id,
                error: Some(format!("{e:#}")),
            })
        }
    }
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "pong-prover-api",
        "image_id": host::image_id_hex(),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let bind_address =
        std::env::var("API_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    tracing::info!(%bind_address, "starting pong prover API");

    HttpServer::new(|| {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_any_header()
            .max_age(86400);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT_BYTES))
            .route("/health", web::get().to(health))
            .route("/api/prove", web::post().to(prove))
            .route("/api/verify", web::post().to(verify))
    })
    .bind(bind_address)?
    .run()
    .await
}
