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

//! The auction-event schema (§3.1) and the small closed set of dimension
//! names and values the rest of the engine is built around.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The small categorical event type. Stored as a `u8` discriminant so cube
/// keys carry it without a heap allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
  Serve,
  Impression,
  Click,
  Purchase,
}

impl EventType {
  pub fn as_str(&self) -> &'static str {
    match self {
      EventType::Serve => "serve",
      EventType::Impression => "impression",
      EventType::Click => "click",
      EventType::Purchase => "purchase",
    }
  }
}

impl fmt::Display for EventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for EventType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "serve" => Ok(EventType::Serve),
      "impression" => Ok(EventType::Impression),
      "click" => Ok(EventType::Click),
      "purchase" => Ok(EventType::Purchase),
      other => Err(Error::UnknownEventType(other.to_string())),
    }
  }
}

/// One raw logical event (§3.1). Never materialized as a batch of these —
/// `cube-ingest`'s `EventBatch` carries the columnar equivalent — but this is
/// the row-shaped view filters and fixtures reason about.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
  pub ts: i64,
  pub event_type: EventType,
  pub auction_id: String,
  pub advertiser_id: i64,
  pub publisher_id: i64,
  pub bid_price: Option<f64>,
  pub user_id: String,
  pub total_price: Option<f64>,
  pub country: String,
}

/// The dimensions a cube can be keyed on: the four derived time columns plus
/// the raw categorical/id columns (§3.1, §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
  Day,
  Hour,
  Minute,
  Week,
  Country,
  Type,
  AdvertiserId,
  PublisherId,
}

impl Dimension {
  pub fn as_str(&self) -> &'static str {
    match self {
      Dimension::Day => "day",
      Dimension::Hour => "hour",
      Dimension::Minute => "minute",
      Dimension::Week => "week",
      Dimension::Country => "country",
      Dimension::Type => "type",
      Dimension::AdvertiserId => "advertiser_id",
      Dimension::PublisherId => "publisher_id",
    }
  }

  /// Dimensions whose values are strings rather than integers. Used by C9's
  /// filter-value quoting rule (§4.5) and by the time-derivability rules.
  pub fn is_string_typed(&self) -> bool {
    !matches!(self, Dimension::AdvertiserId | Dimension::PublisherId)
  }
}

impl fmt::Display for Dimension {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Dimension {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "day" => Ok(Dimension::Day),
      "hour" => Ok(Dimension::Hour),
      "minute" => Ok(Dimension::Minute),
      "week" => Ok(Dimension::Week),
      "country" => Ok(Dimension::Country),
      "type" => Ok(Dimension::Type),
      "advertiser_id" => Ok(Dimension::AdvertiserId),
      "publisher_id" => Ok(Dimension::PublisherId),
      other => Err(Error::UnknownDimension(other.to_string())),
    }
  }
}

/// A single dimension value in a cube key. Every dimension in §3.3's closed
/// family is either a string (the four time columns, `country`, `type`) or
/// an integer (`advertiser_id`, `publisher_id`), so this has exactly two
/// variants rather than a general dynamic-typing scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DimValue {
  Str(String),
  Int(i64),
}

impl DimValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      DimValue::Str(s) => Some(s),
      DimValue::Int(_) => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      DimValue::Int(i) => Some(*i),
      DimValue::Str(_) => None,
    }
  }
}

impl fmt::Display for DimValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DimValue::Str(s) => write!(f, "{}", s),
      DimValue::Int(i) => write!(f, "{}", i),
    }
  }
}
