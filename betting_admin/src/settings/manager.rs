//! AmountSetup management.

use uuid::Uuid;

use super::models::{AmountSetting, NewAmountSetting, PER_REFERRAL_BONUS};
use crate::db::SharedStore;
use crate::error::{AdminError, AdminResult};

/// Check a value against what `name` is used for
///
/// The referral bonus is credited to an integer balance, so it must be a
/// whole, non-negative amount.
pub fn check_value(name: &str, value: f64) -> AdminResult<()> {
    if !value.is_finite() {
        return Err(AdminError::validation("Setting value must be a finite number"));
    }
    if name == PER_REFERRAL_BONUS
        && (value < 0.0 || value.fract() != 0.0 || value > i64::MAX as f64)
    {
        return Err(AdminError::validation(format!(
            "Setting '{name}' must be a whole non-negative amount"
        )));
    }
    Ok(())
}

/// Settings manager
#[derive(Clone)]
pub struct SettingsManager {
    store: SharedStore,
}

impl SettingsManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Create a setting. Names are unique.
    pub async fn create(&self, request: NewAmountSetting) -> AdminResult<AmountSetting> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AdminError::validation("Setting name must not be empty"));
        }
        check_value(name, request.value)?;

        let setting = self
            .store
            .create_setting(name, request.value)
            .await
            .map_err(|e| match e {
                AdminError::Duplicate(_) => {
                    AdminError::validation(format!("Setting '{name}' already exists"))
                }
                other => other,
            })?;

        log::info!("Created setting '{}' = {}", setting.name, setting.value);
        Ok(setting)
    }

    pub async fn list(&self) -> AdminResult<Vec<AmountSetting>> {
        self.store.list_settings().await
    }

    /// Fetch a setting by exact name
    pub async fn get(&self, name: &str) -> AdminResult<AmountSetting> {
        self.store
            .find_setting(name)
            .await?
            .ok_or_else(|| AdminError::not_found("AmountSetup", name))
    }

    /// Value of a setting that must be configured
    pub async fn require(&self, name: &str) -> AdminResult<f64> {
        Ok(self.get(name).await?.value)
    }

    pub async fn update(&self, id: Uuid, value: f64) -> AdminResult<AmountSetting> {
        if !value.is_finite() {
            return Err(AdminError::validation("Setting value must be a finite number"));
        }
        let current = self.store.list_settings().await?.into_iter().find(|s| s.id == id);
        if let Some(current) = current {
            check_value(&current.name, value)?;
        }

        let setting = self.store.update_setting(id, value).await?;
        log::info!("Updated setting '{}' = {}", setting.name, setting.value);
        Ok(setting)
    }

    pub async fn delete(&self, id: Uuid) -> AdminResult<()> {
        if !self.store.delete_setting(id).await? {
            return Err(AdminError::not_found("AmountSetup", id));
        }
        log::info!("Deleted setting {}", id);
        Ok(())
    }
}
