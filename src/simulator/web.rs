use wasm_bindgen::prelude::*;

use crate::utils::set_panic_hook;

use super::{Network as CoreNetwork, NetworkConfig};

/// The web `Network` provides JS/WASM-compatible interfaces to the core
/// `Network` struct.  For additional insight on these methods, refer to the
/// associated core `Network` methods.  Errors are unwrapped, instead of
/// returned, in the web `Network` methods.
#[wasm_bindgen]
pub struct Network {
    network: CoreNetwork,
}

#[wasm_bindgen]
impl Network {
    /// A JS/WASM interface for `Network.post`, which uses a JSON
    /// representation of the network configuration.
    pub fn post_json(config: &str) -> Self {
        set_panic_hook();
        Self {
            network: CoreNetwork::post(&NetworkConfig::from_json(config).unwrap()).unwrap(),
        }
    }

    /// A JS/WASM interface for `Network.post`, which uses a YAML
    /// representation of the network configuration.
    pub fn post_yaml(config: &str) -> Self {
        set_panic_hook();
        Self {
            network: CoreNetwork::post(&NetworkConfig::from_yaml(config).unwrap()).unwrap(),
        }
    }

    /// A JS/WASM interface for `Network.run`, which converts the outcome
    /// to a JSON string.
    pub fn run_json(&mut self) -> String {
        serde_json::to_string(&self.network.run().unwrap()).unwrap()
    }

    /// A JS/WASM interface for `Network.run`, which converts the outcome
    /// to a YAML string.
    pub fn run_yaml(&mut self) -> String {
        serde_yaml::to_string(&self.network.run().unwrap()).unwrap()
    }

    /// An interface to `Network.step_n`, returning the number of
    /// observable transitions.
    pub fn step_n(&mut self, n: usize) -> usize {
        self.network.step_n(n).unwrap().len()
    }

    /// An interface to `Network.get_global_time`.
    pub fn get_global_time(&self) -> f64 {
        self.network.get_global_time()
    }

    /// An interface to `Network.get_status`.
    pub fn get_status(&self, entity_id: &str) -> String {
        self.network.get_status(entity_id).unwrap()
    }

    /// An interface to `Network.queue_len`.
    pub fn queue_len(&self, queue_id: &str) -> usize {
        self.network.queue_len(queue_id).unwrap()
    }

    /// An interface to `Network.in_flight`.
    pub fn in_flight(&self) -> u64 {
        self.network.in_flight()
    }

    /// A JS/WASM interface for `Network.get_metrics`, which converts the
    /// metrics to a JSON string.
    pub fn get_metrics_json(&self) -> String {
        serde_json::to_string(&self.network.get_metrics()).unwrap()
    }

    /// A JS/WASM interface for `Network.get_metrics`, which converts the
    /// metrics to a YAML string.
    pub fn get_metrics_yaml(&self) -> String {
        serde_yaml::to_string(&self.network.get_metrics()).unwrap()
    }
}
