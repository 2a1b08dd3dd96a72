use crate::serde_term;
use crate::{ModelError, Tuple};
use oxrdf::{Literal, NamedNode};
use serde::{Deserialize, Serialize};
use spargebra::Query;
use std::fmt;
use time::{Date, Month};

/// A resource picked as a value, e.g. from an autocomplete or a facet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(with = "serde_term::named_node")]
    pub iri: NamedNode,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Tuple::is_empty", with = "serde_term::tuple")]
    pub tuple: Tuple,
}

impl Resource {
    pub fn new(iri: NamedNode, label: impl Into<String>) -> Self {
        Self {
            iri,
            label: label.into(),
            description: None,
            tuple: Tuple::new(),
        }
    }
}

/// A literal picked as a value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiteralValue {
    #[serde(with = "serde_term::literal")]
    pub literal: Literal,
    #[serde(default, skip_serializing_if = "Tuple::is_empty", with = "serde_term::tuple")]
    pub tuple: Tuple,
}

impl LiteralValue {
    pub fn new(literal: Literal) -> Self {
        Self {
            literal,
            tuple: Tuple::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub begin: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Tuple::is_empty", with = "serde_term::tuple")]
    pub tuple: Tuple,
}

impl NumericRange {
    pub fn new(begin: f64, end: f64) -> Self {
        Self {
            begin,
            end,
            tuple: Tuple::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "xsd_date")]
    pub begin: Date,
    #[serde(with = "xsd_date")]
    pub end: Date,
}

/// A date plus or minus a number of days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDeviation {
    #[serde(with = "xsd_date")]
    pub date: Date,
    pub deviation: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Epoch {
    #[serde(rename = "AD")]
    Ad,
    #[serde(rename = "BC")]
    Bc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Year {
    pub year: i32,
    pub epoch: Epoch,
}

impl Year {
    pub fn ad(year: i32) -> Self {
        Self {
            year,
            epoch: Epoch::Ad,
        }
    }

    pub fn bc(year: i32) -> Self {
        Self {
            year,
            epoch: Epoch::Bc,
        }
    }

    /// The astronomical year number, negative for years before Christ. `None` if the negated
    /// year does not fit into an `i32`.
    pub fn signed(self) -> Option<i32> {
        match self.epoch {
            Epoch::Ad => Some(self.year),
            Epoch::Bc => self.year.checked_neg(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub begin: Year,
    pub end: Year,
}

/// A year plus or minus a number of years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearDeviation {
    pub year: Year,
    pub deviation: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub long: f64,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.lat, self.long)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub center: Coordinate,
    pub distance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

/// A search that was stored earlier and is referenced by its query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    #[serde(with = "serde_term::named_node")]
    pub iri: NamedNode,
    pub label: String,
    #[serde(with = "query_string")]
    pub query: Query,
}

/// Formats a date the way `xsd:date` expects it, e.g. `2001-02-03` or `-0044-03-15`.
pub fn format_xsd_date(date: Date) -> String {
    let year = date.year();
    let sign = if year < 0 { "-" } else { "" };
    format!(
        "{sign}{:04}-{:02}-{:02}",
        year.unsigned_abs(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parses the date part of an `xsd:date` or `xsd:dateTime` lexical form.
pub fn parse_xsd_date(value: &str) -> Option<Date> {
    let value = value.trim();
    let (negative, rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let mut parts = rest.splitn(3, '-');
    let year = parts.next()?;
    let month = parts.next()?;
    let day = parts.next()?.get(..2)?;
    if year.len() < 4 || month.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    let day: u8 = day.parse().ok()?;
    Date::from_calendar_date(if negative { -year } else { year }, month, day).ok()
}

/// Like [`parse_xsd_date`] but with an error naming the offending value.
pub fn parse_date(value: &str) -> Result<Date, ModelError> {
    parse_xsd_date(value).ok_or_else(|| ModelError::InvalidDate(value.to_owned()))
}

mod xsd_date {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_xsd_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(D::Error::custom)
    }
}

mod query_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use spargebra::Query;

    pub fn serialize<S: Serializer>(query: &Query, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(query)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Query, D::Error> {
        let value = String::deserialize(deserializer)?;
        Query::parse(&value, None).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: Month, day: u8) -> Result<Date, time::error::ComponentRange> {
        Date::from_calendar_date(year, month, day)
    }

    #[test]
    fn xsd_dates() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(format_xsd_date(date(2001, Month::February, 3)?), "2001-02-03");
        assert_eq!(format_xsd_date(date(-44, Month::March, 15)?), "-0044-03-15");
        assert_eq!(parse_xsd_date("-0044-03-15"), Some(date(-44, Month::March, 15)?));
        assert_eq!(
            parse_xsd_date("1990-06-01T12:00:00Z"),
            Some(date(1990, Month::June, 1)?)
        );
        assert_eq!(parse_xsd_date("1990-6-1"), None);
        assert_eq!(parse_xsd_date("yesterday"), None);
        Ok(())
    }

    #[test]
    fn resource_json_shape() -> Result<(), serde_json::Error> {
        let resource = Resource::new(NamedNode::new_unchecked("http://example.com/London"), "London");
        assert_eq!(
            serde_json::to_value(&resource)?,
            serde_json::json!({
                "iri": {"#type": "Iri", "#value": "http://example.com/London"},
                "label": "London"
            })
        );
        Ok(())
    }

    #[test]
    fn year_sign_follows_epoch() {
        assert_eq!(Year::ad(1066).signed(), Some(1066));
        assert_eq!(Year::bc(44).signed(), Some(-44));
        assert_eq!(Year::bc(i32::MIN).signed(), None);
    }

    #[test]
    fn coordinate_literal_form() {
        let coordinate = Coordinate {
            lat: 48.2,
            long: 16.37,
        };
        assert_eq!(coordinate.to_string(), "48.2#16.37");
    }
}
