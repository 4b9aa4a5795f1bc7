//! Amount setting handlers. Settings are addressed by name, e.g.
//! `/admin/settings/Minimum%20Bet%20Amount`.

use axum::extract::{Extension, State};
use betting_admin::{
    auth::AccessTokenClaims,
    settings::NewAmountSetting,
};
use serde::Deserialize;

use super::AppState;
use super::response::{self, ApiJson, ApiPath, ApiResult};

#[derive(Debug, Deserialize)]
pub struct SettingValue {
    pub value: f64,
}

pub async fn list(State(state): State<AppState>) -> ApiResult {
    let settings = state.settings.list().await?;
    response::ok("Settings listed", settings)
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewAmountSetting>,
) -> ApiResult {
    let setting = state.settings.create(request).await?;
    response::created("Setting created", setting)
}

pub async fn get(State(state): State<AppState>, ApiPath(name): ApiPath<String>) -> ApiResult {
    let setting = state.settings.get(&name).await?;
    response::ok("Setting fetched", setting)
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<SettingValue>,
) -> ApiResult {
    let current = state.settings.get(&name).await?;
    let setting = state.settings.update(current.id, payload.value).await?;
    tracing::info!(
        admin_id = claims.user_id,
        setting = %setting.name,
        from = current.value,
        to = setting.value,
        "Setting changed"
    );
    response::ok("Setting updated", setting)
}

pub async fn delete(State(state): State<AppState>, ApiPath(name): ApiPath<String>) -> ApiResult {
    let current = state.settings.get(&name).await?;
    state.settings.delete(current.id).await?;
    response::done(format!("Setting '{}' deleted", current.name))
}
