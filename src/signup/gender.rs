use crate::core::schema::ChoiceOption;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    NotInformed,
}

impl Gender {
    pub const ALL: [Gender; 4] = [
        Gender::Female,
        Gender::Male,
        Gender::NonBinary,
        Gender::NotInformed,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Female => "FEMALE",
            Self::Male => "MALE",
            Self::NonBinary => "NON_BINARY",
            Self::NotInformed => "NOT_INFORMED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Female => "Feminino",
            Self::Male => "Masculino",
            Self::NonBinary => "Não binário",
            Self::NotInformed => "Prefiro não informar",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|gender| gender.key() == key)
    }

    /// Dropdown entries in display order.
    pub fn options() -> Vec<ChoiceOption> {
        Self::ALL
            .into_iter()
            .map(|gender| ChoiceOption::new(gender.label(), gender.key()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Gender;

    #[test]
    fn keys_round_trip_and_match_serde() {
        for gender in Gender::ALL {
            assert_eq!(Gender::from_key(gender.key()), Some(gender));
            assert_eq!(
                serde_json::to_value(gender).expect("serialize"),
                serde_json::json!(gender.key())
            );
        }
        assert_eq!(Gender::from_key("UNKNOWN"), None);
    }

    #[test]
    fn options_use_keys_as_values() {
        let options = Gender::options();
        assert_eq!(options.len(), 4);
        assert_eq!(options[0].label, "Feminino");
        assert_eq!(options[0].value, "FEMALE");
    }
}
