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

//! # Canopy Search
//!
//! Problem-agnostic vocabulary shared by search engines: what a solution is,
//! how solutions are ranked and tracked, why a search stopped, and how
//! external observers watch and steer a running search.
//!
//! ## Modules
//!
//! - `solution`: immutable `Solution<T, D>` records with feasibility-first
//!   ordering (minimization convention).
//! - `tracker`: `SolutionTracker<T>`, best/worst feasible and infeasible
//!   values plus counts over every solution seen.
//! - `result`: `TerminationReason` reported by solvers.
//! - `monitor`: the `SearchMonitor` trait, `SearchCommand`, and stock monitors
//!   for time limits, iteration limits, interrupts and composition.

pub mod monitor;
pub mod result;
pub mod solution;
pub mod tracker;
