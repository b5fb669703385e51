//! Locale-aware natural language values backed by the `fake` crate

use std::fmt;

use apistub_core::StubError;
use fake::Fake;
use fake::faker::{address, company, internet, job, lorem, name, phone_number};
use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    FrFr,
    PtBr,
}

impl Locale {
    /// Accepts `en`, `en_us`, `fr_fr`, `pt_br` in any case, with `_` or `-`.
    pub fn parse(value: &str) -> Result<Self, StubError> {
        match value.to_lowercase().replace('-', "_").as_str() {
            "" | "en" | "en_us" => Ok(Self::En),
            "fr" | "fr_fr" => Ok(Self::FrFr),
            "pt" | "pt_br" => Ok(Self::PtBr),
            _ => Err(StubError::UnsupportedLocale(value.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::FrFr => "fr_fr",
            Self::PtBr => "pt_br",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Faker-backed string kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeKind {
    City,
    CityPrefix,
    CitySuffix,
    Company,
    CompanyBs,
    CompanySlogan,
    CompanySuffix,
    Country,
    DomainSuffix,
    Email,
    FirstName,
    Ipv4,
    Ipv6,
    JobTitle,
    Landline,
    LastName,
    MacAddress,
    Mobile,
    Name,
    NamePrefix,
    NameSuffix,
    Postcode,
    SafeEmail,
    SecondaryAddress,
    State,
    StateName,
    StreetName,
    StreetSuffix,
    UserName,
    Word,
}

// Expands to a match over the locale modules of one faker.
macro_rules! localized {
    ($locale:expr, $rng:expr, $module:ident :: $faker:ident ( $($arg:expr),* )) => {
        match $locale {
            Locale::En => $module::en::$faker($($arg),*).fake_with_rng($rng),
            Locale::FrFr => $module::fr_fr::$faker($($arg),*).fake_with_rng($rng),
            Locale::PtBr => $module::pt_br::$faker($($arg),*).fake_with_rng($rng),
        }
    };
}

/// Locale-bound faker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Faker {
    locale: Locale,
}

impl Faker {
    #[must_use]
    pub const fn new(locale: Locale) -> Self {
        Self { locale }
    }

    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    pub fn text<R: Rng + ?Sized>(&self, kind: FakeKind, rng: &mut R) -> String {
        let l = self.locale;
        match kind {
            FakeKind::City => localized!(l, rng, address::CityName()),
            FakeKind::CityPrefix => localized!(l, rng, address::CityPrefix()),
            FakeKind::CitySuffix => localized!(l, rng, address::CitySuffix()),
            FakeKind::Company => localized!(l, rng, company::CompanyName()),
            FakeKind::CompanyBs => localized!(l, rng, company::Bs()),
            FakeKind::CompanySlogan => localized!(l, rng, company::CatchPhrase()),
            FakeKind::CompanySuffix => localized!(l, rng, company::CompanySuffix()),
            FakeKind::Country => localized!(l, rng, address::CountryName()),
            FakeKind::DomainSuffix => localized!(l, rng, internet::DomainSuffix()),
            FakeKind::Email => localized!(l, rng, internet::FreeEmail()),
            FakeKind::FirstName => localized!(l, rng, name::FirstName()),
            FakeKind::Ipv4 => localized!(l, rng, internet::IPv4()),
            FakeKind::Ipv6 => localized!(l, rng, internet::IPv6()),
            FakeKind::JobTitle => localized!(l, rng, job::Title()),
            FakeKind::Landline => localized!(l, rng, phone_number::PhoneNumber()),
            FakeKind::LastName => localized!(l, rng, name::LastName()),
            FakeKind::MacAddress => localized!(l, rng, internet::MACAddress()),
            FakeKind::Mobile => localized!(l, rng, phone_number::CellNumber()),
            FakeKind::Name => localized!(l, rng, name::Name()),
            FakeKind::NamePrefix => localized!(l, rng, name::Title()),
            FakeKind::NameSuffix => localized!(l, rng, name::Suffix()),
            FakeKind::Postcode => localized!(l, rng, address::PostCode()),
            FakeKind::SafeEmail => localized!(l, rng, internet::SafeEmail()),
            FakeKind::SecondaryAddress => localized!(l, rng, address::SecondaryAddress()),
            FakeKind::State => localized!(l, rng, address::StateAbbr()),
            FakeKind::StateName => localized!(l, rng, address::StateName()),
            FakeKind::StreetName => localized!(l, rng, address::StreetName()),
            FakeKind::StreetSuffix => localized!(l, rng, address::StreetSuffix()),
            FakeKind::UserName => localized!(l, rng, internet::Username()),
            FakeKind::Word => localized!(l, rng, lorem::Word()),
        }
    }

    /// `"{building number} {street name}"`
    pub fn street_address<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let number: String = localized!(self.locale, rng, address::BuildingNumber());
        let street = self.text(FakeKind::StreetName, rng);
        format!("{number} {street}")
    }

    pub fn words<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> String {
        let words: Vec<String> = localized!(self.locale, rng, lorem::Words(count..count + 1));
        words.join(" ")
    }

    pub fn sentence<R: Rng + ?Sized>(&self, words: usize, rng: &mut R) -> String {
        localized!(self.locale, rng, lorem::Sentence(words..words + 1))
    }

    pub fn sentences<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> String {
        let sentences: Vec<String> = localized!(self.locale, rng, lorem::Sentences(count..count + 1));
        sentences.join(" ")
    }

    pub fn paragraph<R: Rng + ?Sized>(&self, sentences: usize, rng: &mut R) -> String {
        localized!(self.locale, rng, lorem::Paragraph(sentences..sentences + 1))
    }

    pub fn paragraphs<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> String {
        let paragraphs: Vec<String> =
            localized!(self.locale, rng, lorem::Paragraphs(count..count + 1));
        paragraphs.join("\n\n")
    }
}
