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

//! The closed cube family (§3.3). Fixed at compile time: the workload this
//! engine serves is fixed, so the family is a static table, not something
//! discovered or configured at runtime.

use crate::event::Dimension;

/// One entry in the closed family: a cube name and its ordered dimension
/// list. Row-count estimates are *not* carried here — per SPEC_FULL.md, the
/// router reads those from each cube's `CubeMeta` (a build artifact), not
/// from a hand-maintained constant.
#[derive(Debug, Clone, Copy)]
pub struct CubeSpec {
  pub name: &'static str,
  pub dimensions: &'static [Dimension],
}

use Dimension::{AdvertiserId, Country, Day, Hour, Minute, PublisherId, Type, Week};

pub const CUBE_FAMILY: &[CubeSpec] = &[
  CubeSpec { name: "day_type", dimensions: &[Day, Type] },
  CubeSpec { name: "hour_type", dimensions: &[Hour, Type] },
  CubeSpec { name: "minute_type", dimensions: &[Minute, Type] },
  CubeSpec { name: "week_type", dimensions: &[Week, Type] },
  CubeSpec { name: "country_type", dimensions: &[Country, Type] },
  CubeSpec { name: "advertiser_type", dimensions: &[AdvertiserId, Type] },
  CubeSpec { name: "publisher_type", dimensions: &[PublisherId, Type] },
  CubeSpec { name: "day_country_type", dimensions: &[Day, Country, Type] },
  CubeSpec { name: "day_advertiser_type", dimensions: &[Day, AdvertiserId, Type] },
  CubeSpec { name: "hour_country_type", dimensions: &[Hour, Country, Type] },
  CubeSpec { name: "day_publisher_country_type", dimensions: &[Day, PublisherId, Country, Type] },
];

pub fn spec_by_name(name: &str) -> Option<&'static CubeSpec> {
  CUBE_FAMILY.iter().find(|c| c.name == name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_family_has_eleven_cubes() {
    assert_eq!(CUBE_FAMILY.len(), 11);
  }

  #[test]
  fn test_every_cube_includes_type() {
    for spec in CUBE_FAMILY {
      assert!(spec.dimensions.contains(&Type), "{} is missing type", spec.name);
    }
  }

  #[test]
  fn test_spec_by_name_found() {
    let spec = spec_by_name("day_publisher_country_type").unwrap();
    assert_eq!(spec.dimensions, &[Day, PublisherId, Country, Type]);
  }

  #[test]
  fn test_spec_by_name_missing() {
    assert!(spec_by_name("nonexistent").is_none());
  }

  #[test]
  fn test_cube_names_are_unique() {
    let mut names: Vec<&str> = CUBE_FAMILY.iter().map(|c| c.name).collect();
    let before = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), before);
  }
}
