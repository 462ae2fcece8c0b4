use std::collections::HashMap;

use agora_core::config::EngineConfig;
use agora_core::types::{AccountId, AssetRef};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::SettlementError;

/// Fee rate ceiling: 1000 bps = 10%.
pub const MAX_FEE_RATE_BPS: u16 = 1000;

/// Process-wide settlement policy: admin identity, treasury, fee rate,
/// escrow timeout, and the supported-asset allow-list.
///
/// Every mutator takes the caller's identity and fails with
/// `NotAuthorized` unless the caller is the current admin. The engine
/// owns one instance behind a lock; tests build isolated instances from
/// their own configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPolicy {
    admin: AccountId,
    treasury: AccountId,
    fee_rate_bps: u16,
    /// Stored as whole seconds; `chrono::Duration` is not serde-friendly.
    escrow_timeout_secs: i64,
    supported_assets: HashMap<AssetRef, bool>,
}

impl AdminPolicy {
    /// Build a policy from an engine config, validating every field.
    pub fn from_config(config: &EngineConfig) -> Result<Self, SettlementError> {
        let admin = AccountId::new(config.admin.clone())
            .map_err(|e| SettlementError::PolicyViolation(e.to_string()))?;
        let treasury = AccountId::new(config.treasury.clone())
            .map_err(|e| SettlementError::PolicyViolation(e.to_string()))?;

        if config.fee_rate_bps > MAX_FEE_RATE_BPS {
            return Err(SettlementError::PolicyViolation(format!(
                "fee rate {} bps exceeds cap of {} bps",
                config.fee_rate_bps, MAX_FEE_RATE_BPS
            )));
        }
        if config.escrow_timeout_secs < 0 {
            return Err(SettlementError::PolicyViolation(format!(
                "negative escrow timeout: {}s",
                config.escrow_timeout_secs
            )));
        }

        let mut supported_assets = HashMap::new();
        if config.support_native {
            supported_assets.insert(AssetRef::Native, true);
        }

        Ok(Self {
            admin,
            treasury,
            fee_rate_bps: config.fee_rate_bps,
            escrow_timeout_secs: config.escrow_timeout_secs,
            supported_assets,
        })
    }

    /// Fail unless `caller` is the current admin.
    pub fn ensure_admin(&self, caller: &AccountId) -> Result<(), SettlementError> {
        if caller != &self.admin {
            return Err(SettlementError::NotAuthorized(format!(
                "{} is not the admin",
                caller
            )));
        }
        Ok(())
    }

    /// The current admin identity.
    pub fn admin(&self) -> &AccountId {
        &self.admin
    }

    /// The treasury account that receives fee proceeds.
    pub fn treasury(&self) -> &AccountId {
        &self.treasury
    }

    /// The current fee rate in basis points.
    pub fn fee_rate_bps(&self) -> u16 {
        self.fee_rate_bps
    }

    /// How long a pending escrow stays refund-locked.
    pub fn escrow_timeout(&self) -> Duration {
        Duration::seconds(self.escrow_timeout_secs)
    }

    /// Whether the asset is currently accepted for new escrows.
    /// Consulted at creation time only; existing escrows keep their
    /// original asset regardless of later de-listing.
    pub fn is_asset_supported(&self, asset: &AssetRef) -> bool {
        self.supported_assets.get(asset).copied().unwrap_or(false)
    }

    /// Set the fee rate. Admin only; capped at [`MAX_FEE_RATE_BPS`].
    pub fn set_fee_rate(
        &mut self,
        caller: &AccountId,
        rate_bps: u16,
    ) -> Result<(), SettlementError> {
        self.ensure_admin(caller)?;
        if rate_bps > MAX_FEE_RATE_BPS {
            return Err(SettlementError::PolicyViolation(format!(
                "fee rate {} bps exceeds cap of {} bps",
                rate_bps, MAX_FEE_RATE_BPS
            )));
        }
        tracing::info!(old = self.fee_rate_bps, new = rate_bps, "fee rate updated");
        self.fee_rate_bps = rate_bps;
        Ok(())
    }

    /// Set the treasury account. Admin only.
    pub fn set_treasury(
        &mut self,
        caller: &AccountId,
        treasury: AccountId,
    ) -> Result<(), SettlementError> {
        self.ensure_admin(caller)?;
        tracing::info!(treasury = %treasury, "treasury updated");
        self.treasury = treasury;
        Ok(())
    }

    /// Set the escrow timeout. Admin only; must not be negative.
    pub fn set_escrow_timeout(
        &mut self,
        caller: &AccountId,
        timeout: Duration,
    ) -> Result<(), SettlementError> {
        self.ensure_admin(caller)?;
        let secs = timeout.num_seconds();
        if secs < 0 {
            return Err(SettlementError::PolicyViolation(format!(
                "negative escrow timeout: {}s",
                secs
            )));
        }
        tracing::info!(timeout_secs = secs, "escrow timeout updated");
        self.escrow_timeout_secs = secs;
        Ok(())
    }

    /// Enable or disable an asset for new escrows. Admin only.
    pub fn set_asset_enabled(
        &mut self,
        caller: &AccountId,
        asset: AssetRef,
        enabled: bool,
    ) -> Result<(), SettlementError> {
        self.ensure_admin(caller)?;
        tracing::info!(asset = %asset, enabled, "asset support updated");
        self.supported_assets.insert(asset, enabled);
        Ok(())
    }

    /// Hand the admin role to `new_admin`, effective immediately.
    /// Single-step: there is no acceptance round, so a typo here locks
    /// the policy. Admin only.
    pub fn transfer_admin(
        &mut self,
        caller: &AccountId,
        new_admin: AccountId,
    ) -> Result<(), SettlementError> {
        self.ensure_admin(caller)?;
        tracing::info!(old = %self.admin, new = %new_admin, "admin transferred");
        self.admin = new_admin;
        Ok(())
    }
}
