// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Economic parameters of an elastic subnet.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationNanoSeconds};
use thiserror::Error;

use crate::ids::Id;

/// Denominator of the rates and percentages of a `TransformSubnetTx`.
pub const PERCENT_DENOMINATOR: u64 = 1_000_000;

pub const DEFAULT_INITIAL_SUPPLY: u64 = 240_000_000;
pub const DEFAULT_MAX_SUPPLY: u64 = 720_000_000;
pub const DEFAULT_MIN_CONSUMPTION_RATE: u64 = PERCENT_DENOMINATOR / 10;
pub const DEFAULT_MAX_CONSUMPTION_RATE: u64 = PERCENT_DENOMINATOR * 12 / 100;
pub const DEFAULT_MIN_VALIDATOR_STAKE: u64 = 2_000;
pub const DEFAULT_MAX_VALIDATOR_STAKE: u64 = 3_000_000;
pub const DEFAULT_MIN_STAKE_DURATION: Duration = Duration::from_secs(14 * 24 * 3600);
pub const DEFAULT_MAX_STAKE_DURATION: Duration = Duration::from_secs(365 * 24 * 3600);
pub const DEFAULT_MIN_DELEGATION_FEE: u32 = 20_000;
pub const DEFAULT_MIN_DELEGATOR_STAKE: u64 = 25;
pub const DEFAULT_MAX_VALIDATOR_WEIGHT_FACTOR: u8 = 5;
pub const DEFAULT_UPTIME_REQUIREMENT: u32 = (PERCENT_DENOMINATOR * 8 / 10) as u32;

/// Upper bound of the stake durations.
pub const MAX_STAKE_DURATION_LIMIT: Duration = Duration::from_secs(365 * 24 * 3600);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElasticConfigError {
    #[error("max supply {max} is lower than initial supply {initial}")]
    MaxSupplyBelowInitial { initial: u64, max: u64 },
    #[error("consumption rates cannot exceed {PERCENT_DENOMINATOR}")]
    ConsumptionRateTooHigh,
    #[error("max consumption rate {max} is lower than min consumption rate {min}")]
    ConsumptionRatesInverted { min: u64, max: u64 },
    #[error("min validator stake must be positive and not exceed the initial supply")]
    InvalidMinValidatorStake,
    #[error("max validator stake must be between min validator stake and max supply")]
    InvalidMaxValidatorStake,
    #[error("min stake duration must be positive and at most 365 days")]
    InvalidMinStakeDuration,
    #[error("max stake duration must be between min stake duration and 365 days")]
    InvalidMaxStakeDuration,
    #[error("min delegation fee cannot exceed {PERCENT_DENOMINATOR}")]
    InvalidDelegationFee,
    #[error("min delegator stake must be positive")]
    InvalidDelegatorStake,
    #[error("max validator weight factor must be positive")]
    InvalidWeightFactor,
    #[error("uptime requirement cannot exceed {PERCENT_DENOMINATOR}")]
    InvalidUptimeRequirement,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticSubnetConfig {
    #[serde(rename = "SubnetID", default)]
    pub subnet_id: Id,
    #[serde(rename = "AssetID", default)]
    pub asset_id: Id,
    #[serde(rename = "InitialSupply")]
    pub initial_supply: u64,
    #[serde(rename = "MaxSupply")]
    pub max_supply: u64,
    #[serde(rename = "MinConsumptionRate")]
    pub min_consumption_rate: u64,
    #[serde(rename = "MaxConsumptionRate")]
    pub max_consumption_rate: u64,
    #[serde(rename = "MinValidatorStake")]
    pub min_validator_stake: u64,
    #[serde(rename = "MaxValidatorStake")]
    pub max_validator_stake: u64,
    #[serde(rename = "MinStakeDuration")]
    #[serde_as(as = "DurationNanoSeconds<u64>")]
    pub min_stake_duration: Duration,
    #[serde(rename = "MaxStakeDuration")]
    #[serde_as(as = "DurationNanoSeconds<u64>")]
    pub max_stake_duration: Duration,
    #[serde(rename = "MinDelegationFee")]
    pub min_delegation_fee: u32,
    #[serde(rename = "MinDelegatorStake")]
    pub min_delegator_stake: u64,
    #[serde(rename = "MaxValidatorWeightFactor")]
    pub max_validator_weight_factor: u8,
    #[serde(rename = "UptimeRequirement")]
    pub uptime_requirement: u32,
}

impl Default for ElasticSubnetConfig {
    fn default() -> Self {
        Self {
            subnet_id: Id::EMPTY,
            asset_id: Id::EMPTY,
            initial_supply: DEFAULT_INITIAL_SUPPLY,
            max_supply: DEFAULT_MAX_SUPPLY,
            min_consumption_rate: DEFAULT_MIN_CONSUMPTION_RATE,
            max_consumption_rate: DEFAULT_MAX_CONSUMPTION_RATE,
            min_validator_stake: DEFAULT_MIN_VALIDATOR_STAKE,
            max_validator_stake: DEFAULT_MAX_VALIDATOR_STAKE,
            min_stake_duration: DEFAULT_MIN_STAKE_DURATION,
            max_stake_duration: DEFAULT_MAX_STAKE_DURATION,
            min_delegation_fee: DEFAULT_MIN_DELEGATION_FEE,
            min_delegator_stake: DEFAULT_MIN_DELEGATOR_STAKE,
            max_validator_weight_factor: DEFAULT_MAX_VALIDATOR_WEIGHT_FACTOR,
            uptime_requirement: DEFAULT_UPTIME_REQUIREMENT,
        }
    }
}

impl ElasticSubnetConfig {
    pub fn validate(&self) -> Result<(), ElasticConfigError> {
        if self.max_supply < self.initial_supply {
            return Err(ElasticConfigError::MaxSupplyBelowInitial {
                initial: self.initial_supply,
                max: self.max_supply,
            });
        }
        if self.min_consumption_rate > PERCENT_DENOMINATOR
            || self.max_consumption_rate > PERCENT_DENOMINATOR
        {
            return Err(ElasticConfigError::ConsumptionRateTooHigh);
        }
        if self.max_consumption_rate < self.min_consumption_rate {
            return Err(ElasticConfigError::ConsumptionRatesInverted {
                min: self.min_consumption_rate,
                max: self.max_consumption_rate,
            });
        }
        if self.min_validator_stake == 0 || self.min_validator_stake > self.initial_supply {
            return Err(ElasticConfigError::InvalidMinValidatorStake);
        }
        if self.max_validator_stake < self.min_validator_stake
            || self.max_validator_stake > self.max_supply
        {
            return Err(ElasticConfigError::InvalidMaxValidatorStake);
        }
        if self.min_stake_duration.is_zero() || self.min_stake_duration > MAX_STAKE_DURATION_LIMIT
        {
            return Err(ElasticConfigError::InvalidMinStakeDuration);
        }
        if self.max_stake_duration < self.min_stake_duration
            || self.max_stake_duration > MAX_STAKE_DURATION_LIMIT
        {
            return Err(ElasticConfigError::InvalidMaxStakeDuration);
        }
        if u64::from(self.min_delegation_fee) > PERCENT_DENOMINATOR {
            return Err(ElasticConfigError::InvalidDelegationFee);
        }
        if self.min_delegator_stake == 0 {
            return Err(ElasticConfigError::InvalidDelegatorStake);
        }
        if self.max_validator_weight_factor == 0 {
            return Err(ElasticConfigError::InvalidWeightFactor);
        }
        if u64::from(self.uptime_requirement) > PERCENT_DENOMINATOR {
            return Err(ElasticConfigError::InvalidUptimeRequirement);
        }
        Ok(())
    }

    /// Stake durations in the whole seconds carried by the transform transaction.
    pub fn stake_duration_secs(&self) -> (u32, u32) {
        (
            self.min_stake_duration.as_secs() as u32,
            self.max_stake_duration.as_secs() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ElasticSubnetConfig::default();
        assert_eq!(config.min_consumption_rate, 100_000);
        assert_eq!(config.max_consumption_rate, 120_000);
        assert_eq!(config.uptime_requirement, 800_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let base = ElasticSubnetConfig::default();

        let mut c = base.clone();
        c.max_supply = c.initial_supply - 1;
        assert!(matches!(
            c.validate(),
            Err(ElasticConfigError::MaxSupplyBelowInitial { .. })
        ));

        let mut c = base.clone();
        c.max_consumption_rate = PERCENT_DENOMINATOR + 1;
        assert_eq!(c.validate(), Err(ElasticConfigError::ConsumptionRateTooHigh));

        let mut c = base.clone();
        c.min_consumption_rate = c.max_consumption_rate + 1;
        assert!(matches!(
            c.validate(),
            Err(ElasticConfigError::ConsumptionRatesInverted { .. })
        ));

        let mut c = base.clone();
        c.min_validator_stake = 0;
        assert_eq!(c.validate(), Err(ElasticConfigError::InvalidMinValidatorStake));

        let mut c = base.clone();
        c.max_validator_stake = c.max_supply + 1;
        assert_eq!(c.validate(), Err(ElasticConfigError::InvalidMaxValidatorStake));

        let mut c = base.clone();
        c.min_stake_duration = Duration::ZERO;
        assert_eq!(c.validate(), Err(ElasticConfigError::InvalidMinStakeDuration));

        let mut c = base.clone();
        c.max_stake_duration = MAX_STAKE_DURATION_LIMIT + Duration::from_secs(1);
        assert_eq!(c.validate(), Err(ElasticConfigError::InvalidMaxStakeDuration));

        let mut c = base.clone();
        c.min_delegator_stake = 0;
        assert_eq!(c.validate(), Err(ElasticConfigError::InvalidDelegatorStake));

        let mut c = base.clone();
        c.max_validator_weight_factor = 0;
        assert_eq!(c.validate(), Err(ElasticConfigError::InvalidWeightFactor));

        let mut c = base;
        c.uptime_requirement = (PERCENT_DENOMINATOR + 1) as u32;
        assert_eq!(c.validate(), Err(ElasticConfigError::InvalidUptimeRequirement));
    }

    #[test]
    fn test_durations_in_nanoseconds() {
        let config = ElasticSubnetConfig::default();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value["MinStakeDuration"],
            serde_json::json!(14u64 * 24 * 3600 * 1_000_000_000)
        );
        assert_eq!(config.stake_duration_secs(), (1_209_600, 31_536_000));
    }
}
