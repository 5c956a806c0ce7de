//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements     | Connects to                   |
//! |--------------|----------------|-------------------------------|
//! | `hardware`   | LampTransport  | HID bridge (hidraw / hidapi)  |
//! | `log_sink`   | EventSink      | `log` facade                  |
//! | `planner`    | ActionPlanner  | keyword rules over user text  |
//! | `state_file` | StatePort      | JSON file, atomic rename      |
//! | `time`       | Clock          | `std::time` + `thread::sleep` |

pub mod hardware;
pub mod log_sink;
pub mod planner;
pub mod state_file;
pub mod time;
