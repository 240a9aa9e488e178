use crate::codec::{decode, Category, Measurement};
use crate::reading::error::ReadingError;
use serde::{Deserialize, Serialize};

/// One category field of a submission. A single string is the
/// one-sensor case; several sensors of the same kind arrive as a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryField {
    #[default]
    Absent,
    Single(String),
    Many(Vec<String>),
}

impl CategoryField {
    pub fn entries(&self) -> &[String] {
        match self {
            CategoryField::Absent => &[],
            CategoryField::Single(entry) => std::slice::from_ref(entry),
            CategoryField::Many(entries) => entries,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn push(&mut self, entry: String) {
        *self = match std::mem::take(self) {
            CategoryField::Absent => CategoryField::Single(entry),
            CategoryField::Single(first) => CategoryField::Many(vec![first, entry]),
            CategoryField::Many(mut entries) => {
                entries.push(entry);
                CategoryField::Many(entries)
            }
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Submission {
    #[serde(skip_serializing_if = "CategoryField::is_absent")]
    pub temperatura: CategoryField,
    #[serde(skip_serializing_if = "CategoryField::is_absent")]
    pub pressao: CategoryField,
    #[serde(skip_serializing_if = "CategoryField::is_absent")]
    pub altitude: CategoryField,
    #[serde(skip_serializing_if = "CategoryField::is_absent")]
    pub velocidadevento: CategoryField,
    #[serde(skip_serializing_if = "CategoryField::is_absent")]
    pub direcaovento: CategoryField,
    #[serde(skip_serializing_if = "CategoryField::is_absent")]
    pub precipitacao: CategoryField,
    #[serde(skip_serializing_if = "CategoryField::is_absent")]
    pub umidadesolo: CategoryField,
    #[serde(skip_serializing_if = "CategoryField::is_absent")]
    pub umidaderelativa: CategoryField,
}

impl Submission {
    /// Builds a submission from `field=entry` pairs, the way a query string
    /// carries it; repeated fields accumulate.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ReadingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut submission = Self::default();
        for (key, value) in pairs {
            let category = Category::from_field_name(key.as_ref())
                .ok_or_else(|| ReadingError::UnknownField(key.as_ref().to_string()))?;
            submission.field_mut(category).push(value.into());
        }
        Ok(submission)
    }

    pub fn from_json(raw: &str) -> Result<Self, ReadingError> {
        serde_json::from_str(raw).map_err(|e| ReadingError::InvalidPayload(e.to_string()))
    }

    pub fn field(&self, category: Category) -> &CategoryField {
        match category {
            Category::Temperatura => &self.temperatura,
            Category::Pressao => &self.pressao,
            Category::Altitude => &self.altitude,
            Category::VelocidadeVento => &self.velocidadevento,
            Category::DirecaoVento => &self.direcaovento,
            Category::Precipitacao => &self.precipitacao,
            Category::UmidadeSolo => &self.umidadesolo,
            Category::UmidadeRelativa => &self.umidaderelativa,
        }
    }

    pub fn field_mut(&mut self, category: Category) -> &mut CategoryField {
        match category {
            Category::Temperatura => &mut self.temperatura,
            Category::Pressao => &mut self.pressao,
            Category::Altitude => &mut self.altitude,
            Category::VelocidadeVento => &mut self.velocidadevento,
            Category::DirecaoVento => &mut self.direcaovento,
            Category::Precipitacao => &mut self.precipitacao,
            Category::UmidadeSolo => &mut self.umidadesolo,
            Category::UmidadeRelativa => &mut self.umidaderelativa,
        }
    }

    pub fn entry_count(&self) -> usize {
        Category::ALL
            .into_iter()
            .map(|c| self.field(c).entries().len())
            .sum()
    }

    /// Decodes every entry up front, so a malformed one rejects the whole
    /// submission before anything is written.
    pub fn decode(&self) -> Result<Vec<(Category, Measurement)>, ReadingError> {
        let mut rows = Vec::with_capacity(self.entry_count());
        for category in Category::ALL {
            for entry in self.field(category).entries() {
                let m = decode(category, entry).map_err(|source| ReadingError::InvalidEntry {
                    category,
                    entry: entry.clone(),
                    source,
                })?;
                rows.push((category, m));
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MeasuredValue;

    #[test]
    fn repeated_pairs_accumulate() {
        let s = Submission::from_pairs([
            ("temperatura", "DHT11$260$°C$-1"),
            ("temperatura", "BMP180$220$°C$-1"),
            ("temperatura", "DS18B20$243$°C$-1"),
            ("pressao", "BMP180$180$hPa$-1"),
        ])
        .unwrap();
        assert_eq!(s.temperatura.entries().len(), 3);
        assert_eq!(
            s.pressao,
            CategoryField::Single("BMP180$180$hPa$-1".to_string())
        );
        assert!(s.altitude.is_absent());
        assert_eq!(s.entry_count(), 4);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = Submission::from_pairs([("vento", "x$1$m/s$0")]).unwrap_err();
        assert!(matches!(err, ReadingError::UnknownField(ref k) if k == "vento"));
    }

    #[test]
    fn json_accepts_strings_and_lists() {
        let s = Submission::from_json(
            r#"{"temperatura": ["DHT11$260$°C$-1", "BMP180$220$°C$-1"],
                "velocidadevento": "anemômetro$62$104$m/s$-1"}"#,
        )
        .unwrap();
        assert_eq!(s.temperatura.entries().len(), 2);
        assert_eq!(s.velocidadevento.entries().len(), 1);
        assert!(s.pressao.is_absent());

        assert!(matches!(
            Submission::from_json(r#"{"chuva": "x"}"#),
            Err(ReadingError::InvalidPayload(_))
        ));
        assert!(matches!(
            Submission::from_json(r#"{"pressao": 12}"#),
            Err(ReadingError::InvalidPayload(_))
        ));
    }

    #[test]
    fn decode_reports_the_offending_entry() {
        let s = Submission::from_pairs([
            ("temperatura", "DHT11$260$°C$-1"),
            ("pressao", "BMP180$abc$hPa$-1"),
        ])
        .unwrap();
        match s.decode().unwrap_err() {
            ReadingError::InvalidEntry {
                category, entry, ..
            } => {
                assert_eq!(category, Category::Pressao);
                assert_eq!(entry, "BMP180$abc$hPa$-1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_keeps_category_order() {
        let s = Submission::from_pairs([
            ("velocidadevento", "anemômetro$62$104$m/s$-1"),
            ("temperatura", "DHT11$260$°C$-1"),
        ])
        .unwrap();
        let rows = s.decode().unwrap();
        assert_eq!(rows[0].0, Category::Temperatura);
        assert_eq!(rows[1].0, Category::VelocidadeVento);
        assert_eq!(rows[1].1.value, MeasuredValue::Wind { mean: 62, max: 104 });
    }
}
