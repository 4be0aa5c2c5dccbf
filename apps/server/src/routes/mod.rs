use actix_web::web;

mod health;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_route)
        .service(health::api_health_route)
        .default_service(web::to(health::not_found));
}
