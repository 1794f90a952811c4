//! The three tracked DAB multiplexes and per-record membership flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A tracked broadcast ensemble, identified by its EID code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Multiplex {
    #[serde(rename = "C18A")]
    C18A,
    #[serde(rename = "C18F")]
    C18F,
    #[serde(rename = "C188")]
    C188,
}

impl Multiplex {
    /// All tracked multiplexes in their canonical column order.
    pub const ALL: [Multiplex; 3] = [Multiplex::C18A, Multiplex::C18F, Multiplex::C188];

    pub fn code(&self) -> &'static str {
        match self {
            Multiplex::C18A => "C18A",
            Multiplex::C18F => "C18F",
            Multiplex::C188 => "C188",
        }
    }

    /// Match a normalised EID against the tracked codes.
    pub fn from_eid(eid: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == eid)
    }
}

impl fmt::Display for Multiplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Multiplex {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_eid(s.trim().to_uppercase().as_str())
            .ok_or_else(|| InputError::UnknownMultiplex(s.to_string()))
    }
}

/// One boolean indicator per tracked multiplex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MultiplexFlags {
    #[serde(rename = "C18A")]
    pub c18a: bool,
    #[serde(rename = "C18F")]
    pub c18f: bool,
    #[serde(rename = "C188")]
    pub c188: bool,
}

impl MultiplexFlags {
    /// Flags derived from a single EID; at most one indicator is set.
    pub fn from_eid(eid: Option<&str>) -> Self {
        let mut flags = Self::default();
        if let Some(m) = eid.and_then(Multiplex::from_eid) {
            flags.set(m, true);
        }
        flags
    }

    pub fn get(&self, multiplex: Multiplex) -> bool {
        match multiplex {
            Multiplex::C18A => self.c18a,
            Multiplex::C18F => self.c18f,
            Multiplex::C188 => self.c188,
        }
    }

    pub fn set(&mut self, multiplex: Multiplex, value: bool) {
        match multiplex {
            Multiplex::C18A => self.c18a = value,
            Multiplex::C18F => self.c18f = value,
            Multiplex::C188 => self.c188 = value,
        }
    }

    pub fn any(&self) -> bool {
        self.c18a || self.c18f || self.c188
    }

    pub fn active(&self) -> Vec<Multiplex> {
        Multiplex::ALL
            .into_iter()
            .filter(|m| self.get(*m))
            .collect()
    }

    /// The single multiplex this record belongs to, if exactly one flag is set.
    pub fn single(&self) -> Option<Multiplex> {
        match self.active().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_eid_matches_exact_code() {
        assert_eq!(Multiplex::from_eid("C18A"), Some(Multiplex::C18A));
        assert_eq!(Multiplex::from_eid("C188"), Some(Multiplex::C188));
        assert_eq!(Multiplex::from_eid("C18"), None);
        assert_eq!(Multiplex::from_eid("c18a"), None);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("c18f".parse::<Multiplex>().unwrap(), Multiplex::C18F);
        assert!(matches!(
            "XYZ".parse::<Multiplex>(),
            Err(InputError::UnknownMultiplex(_))
        ));
    }

    #[test]
    fn test_flags_from_eid() {
        let flags = MultiplexFlags::from_eid(Some("C18F"));
        assert!(flags.c18f);
        assert!(!flags.c18a && !flags.c188);
        assert_eq!(flags.single(), Some(Multiplex::C18F));

        let none = MultiplexFlags::from_eid(Some("CE15"));
        assert!(!none.any());
        assert_eq!(none.single(), None);
        assert!(!MultiplexFlags::from_eid(None).any());
    }

    #[test]
    fn test_flags_serialize_with_codes() {
        let flags = MultiplexFlags::from_eid(Some("C188"));
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["C188"], true);
        assert_eq!(json["C18A"], false);
    }
}
