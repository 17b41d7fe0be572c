//! This crate's own copy of C4's adapter config (spec §4.9: "transaction_service
//! holds its own gateway adapters configuration, since verification only
//! needs the provider's API key, not the ledger"). Built once at startup from
//! environment configuration, looked up by provider code on every inbound
//! webhook and by the reconciliation consumer.

use std::collections::HashMap;

use common::gateway::GatewayAdapter;

pub struct GatewayRegistry {
    adapters: HashMap<String, GatewayAdapter>,
}

impl GatewayRegistry {
    pub fn new(adapters: HashMap<String, GatewayAdapter>) -> Self {
        Self { adapters }
    }

    pub fn get(&self, code: &str) -> Option<&GatewayAdapter> {
        self.adapters.get(code)
    }
}
