use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of payload kinds a row can be encoded as.
///
/// The lowercase tag (`url`, `wifi`, ...) is what appears in the spreadsheet
/// `type` column, in archive entry names and on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Url,
    Text,
    Tel,
    Sms,
    Mailto,
    Geo,
    Wifi,
    Vcard,
    Mecard,
    Ics,
}

impl ContentType {
    /// Every content type, in registry order.
    pub const ALL: [ContentType; 10] = [
        ContentType::Url,
        ContentType::Text,
        ContentType::Tel,
        ContentType::Sms,
        ContentType::Mailto,
        ContentType::Geo,
        ContentType::Wifi,
        ContentType::Vcard,
        ContentType::Mecard,
        ContentType::Ics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Url => "url",
            ContentType::Text => "text",
            ContentType::Tel => "tel",
            ContentType::Sms => "sms",
            ContentType::Mailto => "mailto",
            ContentType::Geo => "geo",
            ContentType::Wifi => "wifi",
            ContentType::Vcard => "vcard",
            ContentType::Mecard => "mecard",
            ContentType::Ics => "ics",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a `type` cell does not name any known content type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown content type \"{0}\"")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    /// Case-insensitive; accepts the canonical tags plus a few common aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        let found = match tag.as_str() {
            "url" => ContentType::Url,
            "text" => ContentType::Text,
            "tel" | "phone" => ContentType::Tel,
            "sms" => ContentType::Sms,
            "mailto" | "email" => ContentType::Mailto,
            "geo" | "location" => ContentType::Geo,
            "wifi" | "wi-fi" => ContentType::Wifi,
            "vcard" | "contact" => ContentType::Vcard,
            "mecard" => ContentType::Mecard,
            "ics" | "event" | "calendar" => ContentType::Ics,
            _ => return Err(UnknownContentType(s.trim().to_string())),
        };
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_case_insensitively() {
        assert_eq!("WiFi".parse::<ContentType>(), Ok(ContentType::Wifi));
        assert_eq!(" VCARD ".parse::<ContentType>(), Ok(ContentType::Vcard));
        assert_eq!("email".parse::<ContentType>(), Ok(ContentType::Mailto));
    }

    #[test]
    fn aliases_resolve_to_their_type() {
        let aliases = [
            ("phone", ContentType::Tel),
            ("Wi-Fi", ContentType::Wifi),
            ("event", ContentType::Ics),
            ("calendar", ContentType::Ics),
            ("location", ContentType::Geo),
            ("contact", ContentType::Vcard),
        ];
        for (alias, expected) in aliases {
            assert_eq!(alias.parse::<ContentType>(), Ok(expected), "{alias}");
        }
        assert!("link".parse::<ContentType>().is_err());
    }

    #[test]
    fn unknown_tag_is_an_error() {
        assert_eq!(
            "barcode".parse::<ContentType>(),
            Err(UnknownContentType("barcode".to_string()))
        );
    }

    #[test]
    fn every_tag_round_trips_through_its_name() {
        for tag in ContentType::ALL {
            assert_eq!(tag.as_str().parse::<ContentType>(), Ok(tag));
        }
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        let json = serde_json::to_string(&ContentType::Mecard).unwrap();
        assert_eq!(json, "\"mecard\"");
    }
}
