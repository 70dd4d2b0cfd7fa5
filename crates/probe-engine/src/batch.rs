// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The probe workload.

/// A vocabulary token identifier.
pub type TokenId = u32;

/// The fixed unit of work submitted on every trial.
///
/// A probe batch holds exactly one placeholder token. It is built once per
/// run and only ever lent out immutably, so every decode sees the same
/// workload shape.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProbeBatch {
    tokens: Vec<TokenId>,
}

impl ProbeBatch {
    /// Builds a single-element batch from `token`.
    pub fn single(token: TokenId) -> Self {
        Self {
            tokens: vec![token],
        }
    }

    /// The tokens in submission order.
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Number of tokens (always 1 for a probe).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
