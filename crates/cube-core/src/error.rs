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

use thiserror::Error;

/// Errors shared by every crate in the cube engine: malformed dimension
/// values, out-of-range timestamps, and sidecar-metadata decoding failures.
#[derive(Error, Debug)]
pub enum Error {
  #[error("timestamp {0} out of representable range for timezone {1}")]
  TimeDecode(i64, String),

  #[error("unknown event type: {0}")]
  UnknownEventType(String),

  #[error("unknown dimension: {0}")]
  UnknownDimension(String),

  #[error("configuration error: {0}")]
  Config(String),

  #[error("serialization error")]
  Serde(#[from] serde_json::Error),

  #[error("date parsing error")]
  ParseDate(#[from] chrono::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display_time_decode() {
    let err = Error::TimeDecode(i64::MAX, "UTC".to_string());
    assert!(err.to_string().contains("out of representable range"));
  }

  #[test]
  fn test_error_display_unknown_event_type() {
    let err = Error::UnknownEventType("bounce".to_string());
    assert_eq!(err.to_string(), "unknown event type: bounce");
  }

  #[test]
  fn test_error_display_unknown_dimension() {
    let err = Error::UnknownDimension("region".to_string());
    assert_eq!(err.to_string(), "unknown dimension: region");
  }

  #[test]
  fn test_error_display_config() {
    let err = Error::Config("missing timezone".to_string());
    assert_eq!(err.to_string(), "configuration error: missing timezone");
  }

  #[test]
  fn test_error_from_serde_json() {
    let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
    let err = Error::from(json_err);
    assert!(matches!(err, Error::Serde(_)));
  }

  #[test]
  fn test_error_from_chrono_parse() {
    let parse_err = chrono::NaiveDate::parse_from_str("invalid", "%Y-%m-%d").unwrap_err();
    let err = Error::from(parse_err);
    assert!(matches!(err, Error::ParseDate(_)));
  }

  #[test]
  fn test_result_type_alias() {
    fn returns_ok() -> Result<i32> {
      Ok(42)
    }
    fn returns_err() -> Result<i32> {
      Err(Error::Config("test".to_string()))
    }
    assert_eq!(returns_ok().unwrap(), 42);
    assert!(returns_err().is_err());
  }
}
