// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `idle-bench config`: print a default configuration file.

use idle_harness::HarnessConfig;
use std::path::PathBuf;

pub fn execute(model: PathBuf) -> anyhow::Result<()> {
    let toml = HarnessConfig::new(model).to_toml()?;
    print!("{toml}");
    Ok(())
}
