use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use lexquest_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = Arc::new(
        AppState::new(config)
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );

    log::info!("starting HTTP server on {}:{}", host, port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            .service(handlers::upload_document)
            .service(handlers::get_document)
            .service(handlers::list_documents)
            .service(handlers::delete_document)
            .service(handlers::start_session)
            .service(handlers::get_session)
            .service(handlers::submit_answer)
            .service(handlers::reveal_answer)
            .service(handlers::tick)
            .service(handlers::advance_round)
            .service(handlers::get_hint)
            .service(handlers::abandon_session)
    })
    .bind((host, port))?
    .run()
    .await
}
