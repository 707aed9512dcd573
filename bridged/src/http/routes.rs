use crate::{
    http::{auth::require_auth, handlers as h},
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, put},
};

pub fn build(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/accessories", get(h::list_accessories))
        .route("/accessories/{uuid}", get(h::get_accessory))
        .route("/accessories/{uuid}/characteristics/{characteristic}", put(h::write_characteristic))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new().route("/healthz", get(h::healthz)).merge(guarded).with_state(state)
}
