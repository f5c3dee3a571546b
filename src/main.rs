use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use smartclass_helper::{
    app_state::AppState,
    config::Config,
    handlers::{chat_webhook, health_check, health_check_live, run_file_task, run_text_task},
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|err| {
        log::error!("{}", err);
        std::io::Error::other(err.to_string())
    })?;
    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let max_upload_bytes = config.max_upload_bytes;

    let state = AppState::new(config).await.map_err(|err| {
        log::error!("{}", err);
        std::io::Error::other(err.to_string())
    })?;

    log::info!("starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .wrap(cors)
            .wrap(RequestIdMiddleware)
            .wrap(Logger::default())
            .service(health_check)
            .service(health_check_live)
            .service(chat_webhook)
            .service(run_text_task)
            .service(run_file_task)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
