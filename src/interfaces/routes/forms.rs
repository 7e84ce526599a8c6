use actix_web::web;

use crate::handlers::forms;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/forms")
            .service(forms::submit_contact)
            .service(forms::submit_donate_car)
            .service(forms::preflight)
    );
}
