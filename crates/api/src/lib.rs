mod availability;
mod booking;
mod error;
mod expert;
mod job_schedulers;
mod off_time;
mod schedule;
mod shared;
mod status;

use actix_web::{
    dev::Server,
    error::{JsonPayloadError, PathError, QueryPayloadError},
    middleware, web, App, HttpRequest, HttpServer,
};
use consultation_booking_infra::BookingContext;
use job_schedulers::{start_kv_purge_job_scheduler, start_missed_bookings_job_scheduler};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub use error::BookingError;
pub use shared::auth::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    availability::configure_routes(cfg);
    booking::configure_routes(cfg);
    expert::configure_routes(cfg);
    off_time::configure_routes(cfg);
    schedule::configure_routes(cfg);
    status::configure_routes(cfg);
}

fn json_error(e: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    BookingError::Validation(e.to_string()).into()
}

fn path_error(e: PathError, _: &HttpRequest) -> actix_web::Error {
    BookingError::Validation(e.to_string()).into()
}

fn query_error(e: QueryPayloadError, _: &HttpRequest) -> actix_web::Error {
    BookingError::Validation(e.to_string()).into()
}

/// Registers the request extractors and routes on an `App`. Used by the
/// server and by tests driving the service in memory.
pub fn configure_app(cfg: &mut web::ServiceConfig, ctx: BookingContext) {
    cfg.app_data(web::Data::new(ctx))
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(web::scope("/api/v1").configure(configure_server_api));
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: BookingContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        Application::start_job_schedulers(context);

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: BookingContext) {
        start_missed_bookings_job_scheduler(context.clone());
        start_kv_purge_job_scheduler(context);
    }

    async fn configure_server(context: BookingContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .configure(|cfg| configure_app(cfg, ctx))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
