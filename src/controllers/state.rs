use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WalletStatusRequest {
    pub connected: bool,
    #[serde(default)]
    pub address: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/state").route(web::get().to(get_state)));
    cfg.service(web::resource("/wallet/status").route(web::post().to(set_wallet_status)));
}

/// Form state snapshot for UI reconciliation.
async fn get_state(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.form.lock().clone();
    HttpResponse::Ok().json(snapshot)
}

/// Out-of-band wallet event from the external provider. Idempotent; distinct
/// from action dispatch.
async fn set_wallet_status(
    state: web::Data<AppState>,
    body: web::Json<WalletStatusRequest>,
) -> impl Responder {
    let body = body.into_inner();
    let mut form = state.form.lock();
    match form.apply_wallet_status(body.connected, body.address) {
        Ok(()) => HttpResponse::Ok().json(form.clone()),
        Err(err) => HttpResponse::BadRequest().json(json!({
            "error": { "message": err.message, "type": err.kind.as_str() }
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::Value;

    const ADDR: &str = "0x1234567890123456789012345678901234567890";

    #[actix_web::test]
    async fn snapshot_and_wallet_event_round_trip() {
        let app_state = web::Data::new(crate::test_app_state());
        let app = test::init_service(
            App::new().app_data(app_state.clone()).configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/state").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["currentPage"], "home");
        assert_eq!(body["wallet"]["connected"], false);

        let req = test::TestRequest::post()
            .uri("/wallet/status")
            .set_json(json!({ "connected": true, "address": ADDR }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["wallet"]["connected"], true);
        assert_eq!(body["wallet"]["address"], ADDR);
    }

    #[actix_web::test]
    async fn invalid_wallet_address_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::test_app_state()))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/wallet/status")
            .set_json(json!({ "connected": true, "address": "0xnope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
