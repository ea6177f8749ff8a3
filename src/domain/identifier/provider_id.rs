//! E-mobility provider identifier

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::country::CountryCode;
use crate::shared::errors::DomainError;

static PROVIDER_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{2})([*-]?)([A-Z0-9]+)$").expect("provider id pattern is valid")
});

/// Textual encodings of a provider identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderIdFormat {
    /// `DEGDF`
    DinBare,
    /// `DE*GDF`
    DinStar,
    /// `DE-GDF`
    DinHyphen,
    /// `DEGDF`
    IsoBare,
    /// `DE-GDF`
    IsoHyphen,
}

impl ProviderIdFormat {
    pub const ALL: [ProviderIdFormat; 5] = [
        Self::DinBare,
        Self::DinStar,
        Self::DinHyphen,
        Self::IsoBare,
        Self::IsoHyphen,
    ];

    fn separator(&self) -> &'static str {
        match self {
            Self::DinBare | Self::IsoBare => "",
            Self::DinStar => "*",
            Self::DinHyphen | Self::IsoHyphen => "-",
        }
    }
}

/// Country-coded e-mobility provider identifier, e.g. `DE-GDF`.
///
/// Two identifiers are equal when country code and suffix match; the
/// format they were parsed from only affects `Display`.
#[derive(Debug, Clone)]
pub struct ProviderId {
    country: CountryCode,
    suffix: String,
    format: ProviderIdFormat,
}

impl ProviderId {
    /// Build an identifier from its parts. The suffix must be one or more
    /// ASCII alphanumerics and is stored upper-case.
    pub fn new(country: CountryCode, suffix: &str) -> Result<Self, DomainError> {
        let suffix = suffix.trim();
        if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidIdentifier(format!(
                "{}{}",
                country, suffix
            )));
        }
        Ok(Self {
            country,
            suffix: suffix.to_ascii_uppercase(),
            format: ProviderIdFormat::IsoHyphen,
        })
    }

    /// Parse any of the supported textual formats. Accepts every suffix
    /// [`ProviderId::new`] accepts, so rendered ids always parse back.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let normalized = text.trim().to_ascii_uppercase();
        let captures = PROVIDER_ID_PATTERN
            .captures(&normalized)
            .ok_or_else(|| DomainError::InvalidIdentifier(text.to_string()))?;

        let country = CountryCode::parse(&captures[1])?;
        let format = match &captures[2] {
            "*" => ProviderIdFormat::DinStar,
            "-" => ProviderIdFormat::IsoHyphen,
            _ => ProviderIdFormat::IsoBare,
        };

        Ok(Self {
            country,
            suffix: captures[3].to_string(),
            format,
        })
    }

    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    pub fn country(&self) -> CountryCode {
        self.country
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn format(&self) -> ProviderIdFormat {
        self.format
    }

    /// Same identity, rendered in another format.
    pub fn with_format(mut self, format: ProviderIdFormat) -> Self {
        self.format = format;
        self
    }

    /// Length of the encoded identity, independent of the separator.
    pub fn encoded_len(&self) -> usize {
        self.country.alpha2().len() + self.suffix.len()
    }

    pub fn to_string_as(&self, format: ProviderIdFormat) -> String {
        format!("{}{}{}", self.country, format.separator(), self.suffix)
    }
}

impl PartialEq for ProviderId {
    fn eq(&self, other: &Self) -> bool {
        self.country == other.country && self.suffix == other.suffix
    }
}

impl Eq for ProviderId {}

impl Hash for ProviderId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.country.hash(state);
        self.suffix.hash(state);
    }
}

impl Ord for ProviderId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encoded_len()
            .cmp(&other.encoded_len())
            .then_with(|| self.country.cmp(&other.country))
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}

impl PartialOrd for ProviderId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_as(self.format))
    }
}

impl FromStr for ProviderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ProviderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn de() -> CountryCode {
        CountryCode::parse("DE").unwrap()
    }

    #[test]
    fn round_trips_through_every_format() {
        for country in ["DE", "FR", "NL"] {
            for suffix in ["GDF", "8AA", "A1B"] {
                let original = ProviderId::new(CountryCode::parse(country).unwrap(), suffix).unwrap();
                for format in ProviderIdFormat::ALL {
                    let text = original.to_string_as(format);
                    let parsed = ProviderId::parse(&text).unwrap();
                    assert_eq!(parsed, original, "format {:?} text {}", format, text);
                }
            }
        }
    }

    #[test]
    fn suffixes_of_any_length_round_trip() {
        for suffix in ["A", "AB", "ABCD", "ABCDEFGH1"] {
            let original = ProviderId::new(de(), suffix).unwrap();
            for format in ProviderIdFormat::ALL {
                let text = original.to_string_as(format);
                assert_eq!(ProviderId::parse(&text).unwrap(), original, "text {}", text);
            }

            let json = serde_json::to_string(&original).unwrap();
            let back: ProviderId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, original);
            assert_eq!(back.to_string(), original.to_string());
        }
    }

    #[test]
    fn wire_format_ids_still_parse() {
        let id = ProviderId::parse("DE*8AA").unwrap();
        assert_eq!(id.suffix(), "8AA");
        assert_eq!(id.encoded_len(), 5);
    }

    #[test]
    fn equality_ignores_format() {
        let star = ProviderId::parse("DE*GDF").unwrap();
        let hyphen = ProviderId::parse("DE-GDF").unwrap();
        let bare = ProviderId::parse("DEGDF").unwrap();

        assert_eq!(star, hyphen);
        assert_eq!(hyphen, bare);
        assert_eq!(star.format(), ProviderIdFormat::DinStar);
        assert_eq!(hyphen.format(), ProviderIdFormat::IsoHyphen);
        assert_eq!(bare.format(), ProviderIdFormat::IsoBare);
    }

    #[test]
    fn display_keeps_parsed_format() {
        assert_eq!(ProviderId::parse("DE*GDF").unwrap().to_string(), "DE*GDF");
        assert_eq!(ProviderId::parse("de-gdf").unwrap().to_string(), "DE-GDF");
        assert_eq!(ProviderId::parse(" DEGDF ").unwrap().to_string(), "DEGDF");
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "DE", "DE-", "DE*", "DE+GDF", "D1-GDF", "DE--GDF", "DE-G D", "DE-GD_F"] {
            assert!(ProviderId::parse(text).is_err(), "{} should not parse", text);
        }
    }

    #[test]
    fn rejects_unknown_country() {
        assert_eq!(
            ProviderId::parse("XX-GDF").unwrap_err(),
            DomainError::InvalidCountryCode("XX".into())
        );
    }

    #[test]
    fn new_rejects_empty_or_non_alphanumeric_suffix() {
        assert!(ProviderId::new(de(), "").is_err());
        assert!(ProviderId::new(de(), "A-B").is_err());
    }

    #[test]
    fn shorter_identifier_sorts_first() {
        let short = ProviderId::new(de(), "ABC").unwrap();
        let long = ProviderId::new(de(), "ABCD").unwrap();
        assert!(short < long);
        assert!(ProviderId::parse("DE-ABC").unwrap() < ProviderId::parse("DE-ABCD").unwrap());
    }

    #[test]
    fn ordering_falls_back_to_country_then_suffix() {
        let de_zzz = ProviderId::parse("DE-ZZZ").unwrap();
        let fr_aaa = ProviderId::parse("FR-AAA").unwrap();
        let fr_aab = ProviderId::parse("FR-AAB").unwrap();
        assert!(de_zzz < fr_aaa);
        assert!(fr_aaa < fr_aab);
    }

    #[test]
    fn serializes_as_string() {
        let id = ProviderId::parse("DE*GDF").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"DE*GDF\"");
        let back: ProviderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
