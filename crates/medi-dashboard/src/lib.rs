//! # medi-dashboard
//!
//! REST and WebSocket API behind the MediConnect hospital dashboard.
//!
//! ## Features
//!
//! - **REST API**: beds, wards, doctors, patients, appointments, organ
//!   donors, alerts and a chatbot, all under `/api`
//! - **Graceful degradation**: reads fall back to a fixed data set when
//!   storage cannot answer; writes report the failure
//! - **WebSocket**: `{type, data}` updates pushed to every viewer on `/ws`
//!   after each successful mutation
//!
//! ## Example
//!
//! ```rust,no_run
//! use medi_assistant::Assistant;
//! use medi_dashboard::{DashboardConfig, DashboardServer};
//! use medi_store::{Storage, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DashboardConfig::default();
//!     let storage = Storage::connect(&StoreConfig::new("postgres://localhost/medi")).await;
//!
//!     let server = DashboardServer::new(config.clone(), storage, Assistant::Offline);
//!     // server.serve_with_shutdown(config.bind_addr, async {}).await.unwrap();
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/api/health` | GET | Liveness and storage availability |
//! | `/api/dashboard/stats` | GET | Headline counts |
//! | `/api/beds` | GET, POST | Beds with their wards (`?status=`) |
//! | `/api/beds/{id}/status` | PATCH | Occupy or release a bed |
//! | `/api/appointments` | GET, POST | Appointments (`?date=&doctorId=&patientId=`) |
//! | `/api/organ-donors` | GET, POST | Donor registry (`?bloodType=&organType=`) |
//! | `/api/alerts` | GET, POST | Alerts |
//! | `/api/chatbot/message` | POST | Chat with the assistant |
//! | `/ws` | GET | WebSocket for real-time updates |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fallback;
pub mod fanout;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod types;
pub mod websocket;

// Re-export main types
pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use fanout::{Subscribers, Subscription};
pub use server::DashboardServer;
pub use state::DashboardState;
pub use types::{DashboardStats, HealthResponse, LiveUpdate};
