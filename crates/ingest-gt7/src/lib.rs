//! Gran Turismo 7 telemetry over UDP.
//!
//! The console streams Salsa20-encrypted packets to port 33740 for as long as
//! it keeps receiving heartbeats on 33739. [`Gt7Source`] binds the receive
//! socket, keeps the stream alive, decodes every packet into a
//! [`TelemetryRecord`](gt7_model::TelemetryRecord) and publishes it together
//! with the current session snapshot.
//!
//! ```no_run
//! use gt7_ingest::{Gt7Config, Gt7Source};
//! use gt7_ingest_core::{channel, ChannelSink, Sinks};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), gt7_ingest_core::IngestError> {
//! let (tx, rx) = channel();
//! let shutdown = CancellationToken::new();
//! let receiver = Gt7Source::new(Gt7Config::from_env()?).bind().await?;
//! let task = receiver.spawn(Sinks::new().with(ChannelSink::new(tx)), shutdown.clone());
//!
//! for update in rx.iter().take(60) {
//!     println!("lap {} {}", update.session.current_lap, update.session.lap_time);
//! }
//! shutdown.cancel();
//! let stats = task.await.map_err(anyhow::Error::from)??;
//! println!("{stats:?}");
//! # Ok(())
//! # }
//! ```

pub mod cipher;
mod config;
pub mod decoder;
mod error;
pub mod heartbeat;
pub mod layout;
mod pipeline;
pub mod rate;
pub mod session;
mod source;

pub use config::{Gt7Config, HEARTBEAT_PORT, RECV_BUFFER_LEN, RECV_PORT};
pub use error::{ConfigError, PacketError};
pub use pipeline::Pipeline;
pub use rate::RateMeter;
pub use session::{SessionState, SessionTracker};
pub use source::{Gt7Receiver, Gt7Source};
