// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Errors reported by the Monte Carlo tree search engine.
//!
//! Limits that stop a search early are not errors; they surface as
//! `TerminationReason::Aborted` in the outcome. Errors are reserved for
//! invalid configuration and for nodes that break the `TreeNode` contract.

use thiserror::Error;

/// Errors returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MctsError {
    /// The configuration was rejected by `MctsConfigBuilder::build`.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A node violated the `TreeNode` contract, e.g. by reporting a `NaN`
    /// objective value or bound.
    #[error("tree node contract violation: {0}")]
    ContractViolation(String),
}

pub type MctsResult<T> = Result<T, MctsError>;
