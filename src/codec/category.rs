use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight measurement kinds a station reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Temperatura,
    Pressao,
    Altitude,
    VelocidadeVento,
    DirecaoVento,
    Precipitacao,
    UmidadeSolo,
    UmidadeRelativa,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Temperatura,
        Category::Pressao,
        Category::Altitude,
        Category::VelocidadeVento,
        Category::DirecaoVento,
        Category::Precipitacao,
        Category::UmidadeSolo,
        Category::UmidadeRelativa,
    ];

    /// Name of the submission field carrying this category.
    pub fn field_name(self) -> &'static str {
        match self {
            Category::Temperatura => "temperatura",
            Category::Pressao => "pressao",
            Category::Altitude => "altitude",
            Category::VelocidadeVento => "velocidadevento",
            Category::DirecaoVento => "direcaovento",
            Category::Precipitacao => "precipitacao",
            Category::UmidadeSolo => "umidadesolo",
            Category::UmidadeRelativa => "umidaderelativa",
        }
    }

    /// Table (and JSON key) holding this category's rows.
    pub fn table_name(self) -> &'static str {
        match self {
            Category::Temperatura => "Temperatura",
            Category::Pressao => "Pressao",
            Category::Altitude => "Altitude",
            Category::VelocidadeVento => "VelocidadeVento",
            Category::DirecaoVento => "DirecaoVento",
            Category::Precipitacao => "Precipitacao",
            Category::UmidadeSolo => "UmidadeSolo",
            Category::UmidadeRelativa => "UmidadeRelativa",
        }
    }

    /// Number of `$`-separated fields in one entry.
    pub fn field_count(self) -> usize {
        match self {
            Category::VelocidadeVento => 5,
            _ => 4,
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.field_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_field_name(s).ok_or_else(|| format!("unknown category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_wind_speed_has_five_fields() {
        let five: Vec<_> = Category::ALL
            .into_iter()
            .filter(|c| c.field_count() == 5)
            .collect();
        assert_eq!(five, vec![Category::VelocidadeVento]);
    }

    #[test]
    fn field_names_resolve_case_insensitively() {
        assert_eq!(
            Category::from_field_name("VelocidadeVento"),
            Some(Category::VelocidadeVento)
        );
        assert_eq!(" umidadesolo ".parse::<Category>(), Ok(Category::UmidadeSolo));
        assert!("vento".parse::<Category>().is_err());
    }
}
