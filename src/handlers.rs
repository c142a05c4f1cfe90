use actix_web::{get, post, web, HttpResponse, Responder};
use log::info;
use crate::AppState;

#[get("/snapshot")]
pub async fn get_snapshot(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.store.snapshot().as_ref())
}

#[get("/table")]
pub async fn get_table(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&data.store.snapshot().table)
}

#[get("/chart")]
pub async fn get_chart(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&data.store.snapshot().chart)
}

#[get("/health")]
pub async fn get_health(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.store.health())
}

/// Asks the scheduler for an immediate refresh, the result shows up in the next snapshot
#[post("/refresh")]
pub async fn post_refresh(data: web::Data<AppState>) -> impl Responder {
    info!("refresh requested over http");
    data.trigger.request();

    HttpResponse::Accepted().finish()
}
