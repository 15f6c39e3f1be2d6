//! Submission configuration.
//!
//! Lookup tables are resolved once at startup and passed into the
//! orchestrator; nothing is fetched or read from the environment while a
//! submission runs.

use std::collections::BTreeMap;

use consult_orders_notify::{
    DEFAULT_TEMPLATE, ED_TEMPLATE, MENTAL_HEALTH_TEMPLATE, PRIMARY_CARE_TEMPLATE,
    WEIGHT_MANAGEMENT_TEMPLATE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::PricingTable;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Service id → notification template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationTemplates {
    pub by_service: BTreeMap<String, String>,
    pub default_template: String,
}

impl Default for NotificationTemplates {
    fn default() -> Self {
        let by_service = [
            ("weight-management", WEIGHT_MANAGEMENT_TEMPLATE),
            ("ed", ED_TEMPLATE),
            ("primary-care", PRIMARY_CARE_TEMPLATE),
            ("mental-health", MENTAL_HEALTH_TEMPLATE),
        ]
        .into_iter()
        .map(|(service, template)| (service.to_string(), template.to_string()))
        .collect();

        Self {
            by_service,
            default_template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl NotificationTemplates {
    /// Template for a service, or the default.
    pub fn template_for(&self, service_id: Option<&str>) -> &str {
        service_id
            .and_then(|id| self.by_service.get(id))
            .map(String::as_str)
            .unwrap_or(&self.default_template)
    }
}

/// Configuration for consultation submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrdersConfig {
    pub pricing: PricingTable,
    pub notification_templates: NotificationTemplates,
    /// Days from issue until an invoice is due
    pub invoice_due_days: u32,
    /// ISO 4217 currency code for invoices
    pub currency: String,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            pricing: PricingTable::default(),
            notification_templates: NotificationTemplates::default(),
            invoice_due_days: 14,
            currency: "USD".to_string(),
        }
    }
}

impl OrdersConfig {
    /// Parse from JSON. Missing sections fall back to defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: OrdersConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.currency.trim().len() != 3 {
            return Err(ConfigError::Invalid(format!(
                "currency must be a 3-letter code, got '{}'",
                self.currency
            )));
        }
        if self.notification_templates.default_template.trim().is_empty() {
            return Err(ConfigError::Invalid("default_template cannot be empty".into()));
        }
        if self.invoice_due_days > 365 {
            return Err(ConfigError::Invalid("invoice_due_days cannot exceed 365".into()));
        }
        Ok(())
    }
}
