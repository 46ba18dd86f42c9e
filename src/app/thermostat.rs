//! Thermostat name resolution with a per-controller cache.
//!
//! Zones name their thermostat; the house hands out live handles.  A
//! successful lookup is cached for the lifetime of the controller.  A
//! miss is not cached and is retried on the next cycle.

use std::collections::HashMap;

use log::debug;

use crate::error::ReadError;

use super::ports::{ThermostatId, ThermostatPort};

#[derive(Debug, Default)]
pub struct CachedThermostats {
    /// Keyed by lowercase name.
    resolved: HashMap<String, ThermostatId>,
}

impl CachedThermostats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &mut self,
        port: &mut impl ThermostatPort,
        name: &str,
    ) -> Result<ThermostatId, ReadError> {
        let key = name.to_lowercase();
        if let Some(id) = self.resolved.get(&key) {
            return Ok(*id);
        }
        let id = port.find_thermostat(name)?;
        debug!("thermostat '{}' resolved to {:?}", name, id);
        self.resolved.insert(key, id);
        Ok(id)
    }

    /// Drop a cached handle, e.g. after the device stopped answering.
    pub fn forget(&mut self, name: &str) {
        self.resolved.remove(&name.to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}
