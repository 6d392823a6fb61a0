/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! # cube-core
//!
//! Shared vocabulary for the OLAP cube engine: the auction-event schema, the
//! time-dimension encoder (C1), the cube algebra (partial aggregates and
//! their combine rules), and the closed family of cubes the engine builds.
//!
//! Every other crate in this workspace (`cube-ingest`, `cube-store`,
//! `cube-query`, `cube-cli`) depends on this one; it has no dependency on
//! any of them.
//!
//! ```
//! use cube_core::{CUBE_FAMILY, Partials};
//!
//! let p = Partials::from_measures(Some(1.5), None);
//! assert_eq!(CUBE_FAMILY.len(), 11);
//! assert_eq!(p.bid_sum_or_null(), Some(1.5));
//! ```

pub mod agg;
pub mod catalog;
pub mod cube;
pub mod error;
pub mod event;
pub mod pattern;
pub mod result;
pub mod time;

pub use agg::{AggFn, AggRequest, COUNT_STAR_ALIAS};
pub use catalog::{CubeSpec, CUBE_FAMILY};
pub use cube::{Cube, CubeMeta, Partials, MEASURE_COLUMNS};
pub use error::{Error, Result};
pub use event::{DimValue, Dimension, Event, EventType};
pub use pattern::{Filter, FilterOp, FilterValue, OrderBy, OrderDir, QueryPattern};
pub use result::{OutputValue, QueryResult};
