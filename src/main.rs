mod errors;
mod logging;
mod initialization;
mod handlers;
mod models;
mod manager_weather;
mod reducer;
mod scheduler;
mod store;
mod serialize_timestamp;

use std::sync::Arc;
use actix_web::{middleware, web, App, HttpServer};
use actix_files::Files;
use log::info;
use crate::errors::UnrecoverableError;
use crate::handlers::{get_chart, get_health, get_snapshot, get_table, post_refresh};
use crate::initialization::config;
use crate::logging::setup_logger;
use crate::manager_weather::Weather;
use crate::scheduler::{RefreshScheduler, RefreshSettings, RefreshTrigger};
use crate::store::ProjectionStore;

struct AppState {
    store: Arc<ProjectionStore>,
    trigger: RefreshTrigger,
}

#[actix_web::main]
async fn main() -> Result<(), UnrecoverableError> {
    let config = config()?;
    setup_logger(config.log_level);

    info!(
        "weather endpoint {}, {} records per refresh",
        config.weather.base_url, config.weather.limit
    );

    let store = Arc::new(ProjectionStore::new());
    let weather = Weather::new(&config.weather)?;
    let scheduler = RefreshScheduler::start(
        Arc::new(weather),
        store.clone(),
        RefreshSettings { limit: config.weather.limit, interval: config.refresh.interval },
    );

    let web_data = web::Data::new(AppState { store, trigger: scheduler.trigger() });
    let static_dir = config.web_server.static_dir.clone();

    info!(
        "starting web server on {}:{}",
        config.web_server.bind_address, config.web_server.bind_port
    );
    let served = match HttpServer::new(move || {
        App::new()
            .app_data(web_data.clone())
            .service(get_snapshot)
            .service(get_table)
            .service(get_chart)
            .service(get_health)
            .service(post_refresh)
            .service(
                web::scope("")
                    .wrap(middleware::DefaultHeaders::new().add(("Cache-Control", "no-cache")))
                    .service(Files::new("/", static_dir.as_str()).index_file("index.html"))
            )
    })
        .bind((config.web_server.bind_address.as_str(), config.web_server.bind_port))
    {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    scheduler.stop().await;
    info!("web server stopped");

    Ok(served?)
}
