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

//! # cube-query
//!
//! The run phase's query side: parses the raw query JSON (C6), routes each
//! parsed pattern to the cheapest cube that can answer it or to the
//! fallback (C7), and executes against whichever cube was chosen (C8).
//!
//! The fallback path itself (C9) lives in `cube-store`, since it answers
//! directly against the raw event table with no dependency on this crate;
//! `run_query` below is the one place that ties routing and both executors
//! together.

pub mod error;
pub mod executor;
pub mod parser;
pub mod router;

pub use error::{QueryError, QueryResult};
pub use executor::{execute_against, Executor};
pub use parser::{parse_query, parse_query_value};
pub use router::{route, RouteDecision};

use cube_core::pattern::QueryPattern;
use cube_core::result::QueryResult as ResultSet;
use cube_store::{CubeStore, FallbackExecutor};
use duckdb::Connection;

/// Routes and executes one already-parsed pattern against either the
/// rollup family (`store`) or the fallback connection, whichever the
/// router picked (§4.7, §4.8, §4.5).
pub fn run_query(pattern: &QueryPattern, store: &CubeStore, fallback_conn: &Connection) -> QueryResult<ResultSet> {
  match route(pattern, store) {
    RouteDecision::Cube(name) => Executor::new(store).execute(&name, pattern),
    RouteDecision::Fallback => Ok(FallbackExecutor::new(fallback_conn).execute(pattern)?),
  }
}

pub mod prelude {
  pub use crate::{parse_query, parse_query_value, route, run_query, Executor, QueryError, QueryResult, RouteDecision};
}
