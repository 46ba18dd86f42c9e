//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements         | Connects to                    |
//! |---------------|--------------------|--------------------------------|
//! | `config_file` | ConfigPort         | JSON configuration file        |
//! | `home_file`   | SensorPort         | JSON home-state document       |
//! |               | ThermostatPort     |                                |
//! |               | ActuatorPort       |                                |
//! |               | StoragePort        |                                |
//! |               | HousePort          |                                |
//! | `log_sink`    | EventSink          | `log` facade                   |
//! | `memory`      | StoragePort        | In-memory map                  |
//! | `time`        | (wall clock)       | `chrono::Local`                |

pub mod config_file;
pub mod home_file;
pub mod log_sink;
pub mod memory;
pub mod time;
