//! Live warnings for risky files as they are created.
//!
//! # Overview
//!
//! - [`FileWatcher`]: streams `notify` creation events into tokio
//! - [`EventBatcher`]: qualifies events against the active rules and
//!   collapses bursts into one [`Flush`] after a quiet period
//! - [`WatchSession`]: drives both and hands each flush to a [`WatchHost`]
//!
//! # Usage
//!
//! ```no_run
//! use camino::Utf8Path;
//! use gw_core::Config;
//! use gw_rules::{IgnoreFileModel, RuleEngine};
//! use gw_watcher::{Decision, EventBatcher, FileWatcher, Flush, WatchHost, WatchSession};
//!
//! struct AlwaysAdd;
//!
//! impl WatchHost for AlwaysAdd {
//!     fn decide(&mut self, _flush: &Flush) -> Decision {
//!         Decision::AddToIgnoreFile
//!     }
//! }
//!
//! # async fn example(detections: Vec<gw_core::FrameworkDetection>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut watcher = FileWatcher::new(Utf8Path::new("."), &config.watch)?;
//! let root = watcher.watch_path().to_owned();
//!
//! let ignore_file = IgnoreFileModel::new();
//! let rules = RuleEngine::builtin().active_rules(&detections, &config);
//! let batcher = EventBatcher::new(rules, ignore_file.coverage(&root)?, &config);
//!
//! let mut session = WatchSession::new(&root, batcher, ignore_file, AlwaysAdd);
//! let stats = session.run(watcher.events(), async { let _ = tokio::signal::ctrl_c().await; }).await;
//! println!("{} warnings shown", stats.flushes);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod batcher;
pub mod error;
pub mod events;
pub mod session;
pub mod watcher;

pub use batcher::{BatcherState, EventBatcher, Offer, SkipReason};
pub use error::WatchError;
pub use events::{CreationEvent, Decision, Flush, PatternGroup, PendingEvent};
pub use session::{SessionStats, WatchHost, WatchSession};
pub use watcher::FileWatcher;
