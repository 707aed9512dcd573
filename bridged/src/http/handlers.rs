use crate::{http::auth::Caller, state::AppState};
use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use bridge_core::{
    error::WriteError,
    host::{Characteristic, CharacteristicValue, WriteIntent},
    model::DeviceId,
};
use uuid::Uuid;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn list_accessories(State(app): State<AppState>) -> impl IntoResponse {
    match app.bridge.accessories().await {
        Ok(v) => Json(v).into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
    }
}

pub async fn get_accessory(
    State(app): State<AppState>,
    Path(uuid): Path<String>,
) -> impl IntoResponse {
    let Ok(uuid) = parse_device_id(&uuid) else {
        return (StatusCode::BAD_REQUEST, "invalid uuid").into_response();
    };
    match app.bridge.accessory(uuid).await {
        Ok(Some(a)) => Json(a).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "no accessory").into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
    }
}

#[derive(serde::Deserialize)]
pub struct WriteBody {
    value: serde_json::Value,
}

pub async fn write_characteristic(
    State(app): State<AppState>,
    Path((uuid, characteristic)): Path<(String, String)>,
    caller: Option<Extension<Caller>>,
    Json(body): Json<WriteBody>,
) -> impl IntoResponse {
    let Ok(uuid) = parse_device_id(&uuid) else {
        return (StatusCode::BAD_REQUEST, "invalid uuid").into_response();
    };
    let Ok(characteristic) = characteristic.parse::<Characteristic>() else {
        return (StatusCode::BAD_REQUEST, "unknown characteristic").into_response();
    };
    let Some(value) = CharacteristicValue::from_json(&body.value) else {
        return (StatusCode::BAD_REQUEST, "value must be a bool, number or string").into_response();
    };

    let caller_label = caller.as_ref().map(|Extension(c)| c.label()).unwrap_or("anonymous");
    tracing::info!(
        uuid = %uuid,
        characteristic = characteristic.as_str(),
        caller = %caller_label,
        "characteristic write"
    );

    let intent = WriteIntent { accessory: uuid, characteristic, value };
    match app.bridge.write(intent).await {
        Ok(()) => (StatusCode::ACCEPTED, "").into_response(),
        Err(e) => (status_for(&e), e.to_string()).into_response(),
    }
}

fn status_for(err: &WriteError) -> StatusCode {
    match err {
        WriteError::UnknownAccessory(_) => StatusCode::NOT_FOUND,
        WriteError::NotWritable(_) | WriteError::InvalidValue { .. } => StatusCode::BAD_REQUEST,
        WriteError::Send(_) => StatusCode::BAD_GATEWAY,
        WriteError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn parse_device_id(s: &str) -> Result<DeviceId, ()> {
    Uuid::try_parse(s).map(DeviceId).map_err(|_| ())
}
