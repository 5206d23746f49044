use serde::{Deserialize, Serialize};

use crate::plan::Plan;

const DEFAULT_EMAIL: &str = "admin@acme.com";

/// Who is signed in and on which plan
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionSettings {
    pub email: String,
    #[serde(default)]
    pub business_name: Option<String>,
    pub plan: Plan,
    /// Start the session with the two demo ledger entries
    #[serde(default)]
    pub seed_samples: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            business_name: None,
            plan: Plan::Sme,
            seed_samples: false,
        }
    }
}

impl SessionSettings {
    /// Audit user: the local part of the email address
    pub fn user(&self) -> String {
        self.email
            .split('@')
            .next()
            .unwrap_or(&self.email)
            .to_string()
    }

    /// Business shown for the session. Without an explicit name, a
    /// non-default email signs in as "<user> Business".
    pub fn display_business_name(&self, company_name: &str) -> String {
        match &self.business_name {
            Some(name) => name.clone(),
            None if self.email != DEFAULT_EMAIL => format!("{} Business", self.user()),
            None => company_name.to_string(),
        }
    }
}
