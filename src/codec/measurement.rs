use crate::codec::category::Category;
use serde::{Deserialize, Serialize};

pub const DELIMITER: char = '$';

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} fields separated by '$', found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("field {field} is not an integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasuredValue {
    Single(i32),
    /// Wind speed carries the mean and the peak of the sampling window.
    Wind { mean: i32, max: i32 },
}

/// One sensor's measurement, decoded from a delimited entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub sensor: String,
    pub value: MeasuredValue,
    pub unit: String,
    pub magnitude: i32,
}

/// Decodes `sensor$valor$unidade$ordemGrandeza`, or
/// `sensor$media$maximo$unidade$ordemGrandeza` for wind speed.
pub fn decode(category: Category, token: &str) -> Result<Measurement, ParseError> {
    let parts: Vec<&str> = token.split(DELIMITER).collect();
    let expected = category.field_count();
    if parts.len() != expected {
        return Err(ParseError::FieldCount {
            expected,
            found: parts.len(),
        });
    }

    match category {
        Category::VelocidadeVento => Ok(Measurement {
            sensor: parts[0].to_string(),
            value: MeasuredValue::Wind {
                mean: parse_int("media", parts[1])?,
                max: parse_int("maximo", parts[2])?,
            },
            unit: parts[3].to_string(),
            magnitude: parse_int("ordemGrandeza", parts[4])?,
        }),
        _ => Ok(Measurement {
            sensor: parts[0].to_string(),
            value: MeasuredValue::Single(parse_int("valor", parts[1])?),
            unit: parts[2].to_string(),
            magnitude: parse_int("ordemGrandeza", parts[3])?,
        }),
    }
}

pub fn encode(m: &Measurement) -> String {
    match m.value {
        MeasuredValue::Single(v) => format!("{}${}${}${}", m.sensor, v, m.unit, m.magnitude),
        MeasuredValue::Wind { mean, max } => format!(
            "{}${}${}${}${}",
            m.sensor, mean, max, m.unit, m.magnitude
        ),
    }
}

fn parse_int(field: &'static str, raw: &str) -> Result<i32, ParseError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ParseError::NotAnInteger {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_temperature_entry() {
        let m = decode(Category::Temperatura, "DHT11$260$°C$-1").unwrap();
        assert_eq!(m.sensor, "DHT11");
        assert_eq!(m.value, MeasuredValue::Single(260));
        assert_eq!(m.unit, "°C");
        assert_eq!(m.magnitude, -1);
    }

    #[test]
    fn decodes_wind_speed_with_mean_and_max() {
        let m = decode(Category::VelocidadeVento, "anemômetro$62$104$m/s$-1").unwrap();
        assert_eq!(m.value, MeasuredValue::Wind { mean: 62, max: 104 });
        assert_eq!(m.unit, "m/s");
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert_eq!(
            decode(Category::Pressao, "BMP180$180$hPa"),
            Err(ParseError::FieldCount {
                expected: 4,
                found: 3
            })
        );
        // a 4-field entry is not a wind speed entry
        assert_eq!(
            decode(Category::VelocidadeVento, "anemômetro$62$m/s$-1"),
            Err(ParseError::FieldCount {
                expected: 5,
                found: 4
            })
        );
    }

    #[test]
    fn non_integer_values_are_errors_not_sentinels() {
        let err = decode(Category::Pressao, "BMP180$abc$hPa$-1").unwrap_err();
        assert_eq!(
            err,
            ParseError::NotAnInteger {
                field: "valor",
                value: "abc".to_string()
            }
        );
        assert!(decode(Category::Pressao, "BMP180$12.5$hPa$-1").is_err());
        assert!(decode(Category::Pressao, "BMP180$12$hPa$").is_err());
        assert!(decode(Category::Pressao, "BMP180$99999999999$hPa$0").is_err());
    }

    #[test]
    fn surrounding_whitespace_in_numbers_is_tolerated() {
        let m = decode(Category::Altitude, "BMP180$ 5958 $m$-1").unwrap();
        assert_eq!(m.value, MeasuredValue::Single(5958));
    }

    #[test]
    fn encode_inverts_decode() {
        for (category, token) in [
            (Category::UmidadeSolo, "sensorUmiSolo$650$%$-1"),
            (Category::VelocidadeVento, "anemômetro$62$104$m/s$-1"),
        ] {
            let m = decode(category, token).unwrap();
            assert_eq!(encode(&m), token);
            assert_eq!(decode(category, &encode(&m)).unwrap(), m);
        }
    }
}
