//! Referral manager implementation.
//!
//! Every setting the cascade needs is read before anything is written, so a
//! missing setting aborts the registration without side effects. The new
//! account and the referrer's credit are then stored in one atomic call.

use super::models::{COMMISSION_TIERS, ReferralCredit, Registration, ResolvedTier, Signup};
use crate::accounts::{NewUser, Role, User, UserId};
use crate::db::SharedStore;
use crate::error::{AdminError, AdminResult};
use crate::ids::{random_promo_code, random_public_id, retry_on_duplicate};
use crate::settings::{PER_REFERRAL_BONUS, SettingsManager, manager::check_value};

/// Referral manager
#[derive(Clone)]
pub struct ReferralManager {
    store: SharedStore,
    settings: SettingsManager,
    default_referrer: Option<UserId>,
}

impl ReferralManager {
    pub fn new(store: SharedStore) -> Self {
        let settings = SettingsManager::new(store.clone());
        Self {
            store,
            settings,
            default_referrer: None,
        }
    }

    /// Account credited when a signup carries no usable promo code. Without
    /// one, the earliest admin account is used.
    pub fn with_default_referrer(mut self, user_id: Option<UserId>) -> Self {
        self.default_referrer = user_id;
        self
    }

    /// Create an account and credit its referrer
    ///
    /// # Errors
    ///
    /// * `AdminError::NotFound` - A referral setting is not configured
    /// * `AdminError::Validation` - Email already registered
    pub async fn register(&self, signup: Signup) -> AdminResult<Registration> {
        let referrer = self.resolve_referrer(signup.reference_code.as_deref()).await?;
        let credit = match &referrer {
            Some(referrer) => Some(self.credit_for(referrer).await?),
            None => None,
        };

        // Affiliates hand their game list down instead of earning a tier
        let accessible_games = referrer
            .as_ref()
            .filter(|r| r.role == Role::Affiliate)
            .map(|r| r.accessible_games.clone())
            .unwrap_or_default();

        let registration = retry_on_duplicate(&["user_id", "promo_code"], || {
            let store = self.store.clone();
            let credit = credit.clone();
            let new_user = NewUser {
                user_id: random_public_id(),
                name: signup.name.clone(),
                email: signup.email.clone(),
                phone: signup.phone.clone(),
                password_hash: signup.password_hash.clone(),
                role: signup.role,
                promo_code: random_promo_code(),
                reference_code: referrer.as_ref().map(|r| r.promo_code.clone()),
                referred_by: referrer.as_ref().map(|r| r.user_id),
                accessible_games: accessible_games.clone(),
            };
            async move { store.create_user(new_user, credit).await }
        })
        .await
        .map_err(|e| match e {
            AdminError::Duplicate(field) if field == "email" => {
                AdminError::validation("Email is already registered")
            }
            other => other,
        })?;

        match &registration.referrer {
            Some(referrer) => log::info!(
                "Registered user {} referred by {} ({} referrals, commission {}%)",
                registration.user.user_id,
                referrer.user_id,
                referrer.number_of_referrals,
                referrer.commission_percentage
            ),
            None => log::info!("Registered user {} without referrer", registration.user.user_id),
        }
        Ok(registration)
    }

    /// Promo code owner, else the configured default, else the earliest admin
    async fn resolve_referrer(&self, code: Option<&str>) -> AdminResult<Option<User>> {
        if let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) {
            if let Some(owner) = self.store.find_by_promo_code(code).await? {
                return Ok(Some(owner));
            }
            log::debug!("Promo code {} matched no account, using default referrer", code);
        }

        if let Some(user_id) = self.default_referrer {
            match self.store.find_user(user_id).await? {
                Some(user) => return Ok(Some(user)),
                None => log::warn!("Default referrer {} does not exist", user_id),
            }
        }

        let admin = self.store.find_first_admin().await?;
        if admin.is_none() {
            log::warn!("No admin account to act as default referrer");
        }
        Ok(admin)
    }

    async fn credit_for(&self, referrer: &User) -> AdminResult<ReferralCredit> {
        // Rows written before validation existed are checked again here
        let bonus = self.settings.require(PER_REFERRAL_BONUS).await?;
        check_value(PER_REFERRAL_BONUS, bonus)?;

        let mut tiers = Vec::new();
        if referrer.role == Role::User {
            for tier in COMMISSION_TIERS {
                tiers.push(ResolvedTier {
                    min_referrals: tier.min_referrals,
                    percentage: self.settings.require(tier.setting).await?,
                });
            }
        }

        Ok(ReferralCredit {
            referrer_id: referrer.user_id,
            bonus: bonus as i64,
            tiers,
        })
    }
}
