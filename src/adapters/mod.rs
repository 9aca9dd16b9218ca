//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to                 |
//! |------------|------------|-----------------------------|
//! | `log_sink` | EventSink  | Serial log output           |
//! | `wifi`     | (none)     | ESP-IDF WiFi soft-AP        |

pub mod log_sink;
pub mod wifi;
