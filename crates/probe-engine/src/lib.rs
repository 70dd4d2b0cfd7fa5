// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # probe-engine
//!
//! The contract between the idle-latency harness and the inference engine
//! it measures, plus a simulated engine that honours that contract.
//!
//! The harness never computes anything itself. It needs a handful of
//! capabilities from a black-box runtime, modelled here as three traits:
//!
//! - [`Backend`]: loads a model file into a [`Model`].
//! - [`Model`]: owns weights, yields the placeholder token, creates sessions.
//! - [`Session`]: the working state: `decode`, `synchronize`, cache
//!   `reset`/`rebuild`, and the engine's own monotonic clock.
//!
//! # Ownership Model
//!
//! ```text
//! Backend::load_model(path)
//!       │
//!       ▼
//!     Model  ◄─── Arc<ModelInner>
//!       │  create_session()
//!       ▼
//!    Session ◄─── holds a clone of the Arc
//!       │
//!       │  drop()
//!       ▼
//!   engine state released
//! ```
//!
//! Teardown is `Drop`: a session keeps the model's inner state alive, so
//! releasing handles in any order is sound.
//!
//! # Example
//! ```no_run
//! use probe_engine::{Backend, Model, ModelParams, ProbeBatch, Session, SessionParams};
//! use probe_engine::synthetic::SyntheticBackend;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), probe_engine::EngineError> {
//! let backend = SyntheticBackend::default();
//! let model = backend.load_model(Path::new("model.gguf"), &ModelParams::default())?;
//! let mut session = model.create_session(&SessionParams::default())?;
//! let batch = ProbeBatch::single(model.placeholder_token());
//!
//! let start = session.now();
//! session.decode(&batch)?;
//! session.synchronize()?;
//! println!("decode took {:?}", session.now() - start);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod batch;
mod clock;
mod error;
mod params;
pub mod synthetic;

pub use adapter::{Backend, Model, Session};
pub use batch::{ProbeBatch, TokenId};
pub use clock::{EngineClock, Timestamp, VirtualClock};
pub use error::EngineError;
pub use params::{ModelParams, SessionParams};
