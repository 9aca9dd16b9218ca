//! Network command surface.
//!
//! A phone on the soft-AP opens the status page and holds buttons; each
//! press or release is one short `GET /?key=value` connection.
//!
//! | Module        | Role                                        |
//! |---------------|---------------------------------------------|
//! | `request`     | request-line and query parsing              |
//! | `dispatch`    | query → at most one `ArmCommand`            |
//! | `response`    | fixed header block + body                   |
//! | `status_page` | HTML document for a bare `GET /`            |
//! | `server`      | TCP accept loop driving `ArmService`        |

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;
pub mod status_page;
