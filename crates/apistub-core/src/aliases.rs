//! Generator names and their aliases
//!
//! The table is frozen on first use. Every canonical key is registered as its
//! own alias after the domain aliases, so a key always resolves to itself.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Canonical generator keys.
pub const GENERATOR_KEYS: &[&str] = &[
    "adjective",
    "amount",
    "bool",
    "characters",
    "city",
    "city-prefix",
    "city-suffix",
    "company",
    "company-bs",
    "company-slogan",
    "company-suffix",
    "country",
    "credit-card",
    "date",
    "datetime",
    "domain",
    "domain-suffix",
    "double",
    "duration",
    "email",
    "first-name",
    "float",
    "free-email",
    "hexcolor",
    "hostname",
    "int32",
    "int64",
    "ip",
    "ipv4",
    "ipv6",
    "isbn",
    "isbn10",
    "isbn13",
    "job-title",
    "landline",
    "last-name",
    "latitude",
    "longitude",
    "mac-address",
    "mobile",
    "name",
    "name-prefix",
    "name-suffix",
    "noun",
    "number",
    "paragraph",
    "paragraphs",
    "pattern",
    "postcode",
    "rgbcolor",
    "safe-email",
    "secondary-address",
    "sentence",
    "sentences",
    "silly-name",
    "small-amount",
    "ssn",
    "state",
    "state-name",
    "street-address",
    "street-name",
    "street-suffix",
    "uint32",
    "uint64",
    "user-name",
    "uuid",
    "uuid3",
    "uuid4",
    "uuid5",
    "word",
    "words",
];

// Registration order matters only for aliases listed twice; the self-alias
// pass overrides any alias that collides with a canonical key ("ip", "isbn").
const DOMAIN_ALIASES: &[(&str, &[&str])] = &[
    ("bool", &["boolean", "flag"]),
    ("company", &["company-name", "corporation", "business"]),
    ("company-bs", &["company-mission"]),
    ("company-slogan", &["company-catch-phrase"]),
    ("country", &["country-name"]),
    ("credit-card", &["creditcard"]),
    ("domain", &["domain-name"]),
    ("hexcolor", &["hex-color", "hexcolour", "hex-colour"]),
    ("hostname", &["domainword", "domain-word", "host", "host-name"]),
    ("ipv4", &["ip4", "ip", "ip-address"]),
    ("ipv6", &["ip6"]),
    ("isbn10", &["isbnv10", "isbn"]),
    ("isbn13", &["isbnv13"]),
    ("landline", &["phone-number", "phone", "telephone"]),
    ("latitude", &["lat"]),
    ("longitude", &["lon"]),
    ("mac-address", &["mac", "macaddress"]),
    ("mobile", &["mobile-number", "cell", "cell-phone", "gsm", "gsm-number"]),
    ("postcode", &["zipcode", "post-code", "zip-code", "zip"]),
    ("rgbcolor", &["rgb-color", "rgbcolour", "rgb-colour"]),
    ("sentences", &["text", "phrases"]),
    (
        "ssn",
        &["socialsecurity", "social-security", "social-security-number", "ss-number"],
    ),
    ("state", &["state-code"]),
    ("user-name", &["username", "login", "nickname", "nick-name"]),
    ("uuid3", &["uuidv3"]),
    ("uuid4", &["uuidv4"]),
    ("uuid5", &["uuidv5"]),
    ("float", &["float32"]),
    ("double", &["float64"]),
    ("datetime", &["date-time"]),
    ("amount", &["price", "currency-amount", "cost", "turnover", "vat"]),
    (
        "small-amount",
        &["small-price", "low-price", "small-currency-amount", "low-cost", "fees"],
    ),
];

static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::with_capacity(GENERATOR_KEYS.len() * 3);
    for (key, aliases) in DOMAIN_ALIASES {
        for alias in *aliases {
            table.insert(*alias, *key);
        }
    }
    for key in GENERATOR_KEYS {
        table.insert(*key, *key);
    }
    table
});

/// Canonical key for `name`, or `name` lower-cased when it is unknown.
#[must_use]
pub fn canonicalize(name: &str) -> String {
    let lower = name.to_lowercase();
    match ALIASES.get(lower.as_str()) {
        Some(key) => (*key).to_string(),
        None => lower,
    }
}

/// Canonical key for `name` if it is registered.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static str> {
    ALIASES.get(name.to_lowercase().as_str()).copied()
}

#[must_use]
pub fn is_alias(name: &str) -> bool {
    lookup(name).is_some()
}

/// Every `(alias, canonical key)` pair, in no particular order.
pub fn entries() -> impl Iterator<Item = (&'static str, &'static str)> {
    ALIASES.iter().map(|(alias, key)| (*alias, *key))
}

/// Lower-case, dash-separated form of an identifier.
///
/// `userEmail`, `user_email`, `User Email` and `HTTPServer` become
/// `user-email`, `user-email`, `user-email` and `http-server`.
#[must_use]
pub fn command_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('-') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn every_key_is_its_own_alias() {
        for key in GENERATOR_KEYS {
            assert_eq!(canonicalize(key), *key, "key {key} does not resolve to itself");
        }
    }

    #[test]
    fn domain_aliases_resolve() {
        assert_eq!(canonicalize("Price"), "amount");
        assert_eq!(canonicalize("float64"), "double");
        assert_eq!(canonicalize("date-time"), "datetime");
        assert_eq!(canonicalize("zip"), "postcode");
        assert_eq!(canonicalize("TELEPHONE"), "landline");
    }

    #[test]
    fn canonical_key_beats_colliding_alias() {
        assert_eq!(canonicalize("ip"), "ip");
        assert_eq!(canonicalize("isbn"), "isbn");
    }

    #[test]
    fn unknown_names_pass_through_lowercased() {
        assert_eq!(canonicalize("Spaceship"), "spaceship");
        assert!(!is_alias("spaceship"));
        assert_eq!(lookup("spaceship"), None);
    }

    #[test]
    fn aliases_point_at_keys() {
        for (alias, key) in entries() {
            assert!(GENERATOR_KEYS.contains(&key), "{alias} -> {key} is not a key");
        }
    }

    #[test]
    fn command_case_forms() {
        assert_eq!(command_case("userEmail"), "user-email");
        assert_eq!(command_case("user_email"), "user-email");
        assert_eq!(command_case("User Email"), "user-email");
        assert_eq!(command_case("HTTPServer"), "http-server");
        assert_eq!(command_case("ipv4"), "ipv4");
        assert_eq!(command_case("__amount__"), "amount");
        assert_eq!(command_case(""), "");
    }

    proptest! {
        #[test]
        fn command_case_is_idempotent(name in "[A-Za-z0-9 _.-]{0,24}") {
            let once = command_case(&name);
            prop_assert_eq!(command_case(&once), once.clone());
            prop_assert!(once.chars().all(|c| c == '-' || c.is_ascii_lowercase() || c.is_ascii_digit()));
            prop_assert!(!once.starts_with('-') && !once.ends_with('-'));
        }
    }
}
