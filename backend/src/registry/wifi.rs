//! `wifi` network credential payloads (`WIFI:T:...;S:...;P:...;;`).

use super::escape::escape_structured;
use super::fields::{FieldSchema, FieldValues, InputKind};
use std::fmt;

const SSID: &str = "ssid";
const AUTH: &str = "auth";
const PASSWORD: &str = "password";
const HIDDEN: &str = "hidden";

const MAX_SSID_BYTES: usize = 32;

pub(super) const WIFI_FIELDS: &[FieldSchema] = &[
    FieldSchema::required(SSID, "Network name", InputKind::SingleLine).with_validator(validate_ssid),
    FieldSchema::optional(AUTH, "Security", InputKind::SingleLine),
    FieldSchema::optional(PASSWORD, "Password", InputKind::SingleLine)
        .with_validator(validate_password),
    FieldSchema::optional(HIDDEN, "Hidden", InputKind::SingleLine)
        .with_pattern(r"^(?i)(true|false|yes|no|y|n|x|1|0)$"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Wpa,
    Wpa2,
    Wep,
    NoPass,
}

impl Auth {
    /// Unknown or missing values fall back to WPA.
    fn normalize(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "wpa2" => Auth::Wpa2,
            "wep" => Auth::Wep,
            "nopass" | "open" | "none" => Auth::NoPass,
            _ => Auth::Wpa,
        }
    }
}

impl fmt::Display for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Auth::Wpa => "WPA",
            Auth::Wpa2 => "WPA2",
            Auth::Wep => "WEP",
            Auth::NoPass => "nopass",
        })
    }
}

struct Network<'a> {
    ssid: &'a str,
    auth: Auth,
    password: &'a str,
    hidden: bool,
}

impl<'a> Network<'a> {
    fn from_values(values: &'a FieldValues) -> Self {
        Network {
            ssid: values.get(SSID),
            auth: Auth::normalize(values.get(AUTH)),
            password: values.get(PASSWORD),
            hidden: matches!(
                values.trimmed(HIDDEN).to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "y" | "x"
            ),
        }
    }

    fn payload(&self) -> String {
        let mut payload = format!("WIFI:T:{};S:{};", self.auth, escape_structured(self.ssid));
        if self.auth != Auth::NoPass {
            payload.push_str(&format!("P:{};", escape_structured(self.password)));
        }
        if self.hidden {
            payload.push_str("H:true;");
        }
        payload.push(';');
        payload
    }
}

fn validate_ssid(value: &str, _: &FieldValues) -> Option<String> {
    (value.len() > MAX_SSID_BYTES)
        .then(|| format!("Network name must be at most {MAX_SSID_BYTES} bytes"))
}

fn validate_password(value: &str, values: &FieldValues) -> Option<String> {
    let length = value.chars().count();
    match Auth::normalize(values.get(AUTH)) {
        Auth::NoPass => None,
        _ if value.is_empty() => {
            Some("Password is required unless the network is open".to_string())
        }
        Auth::Wpa | Auth::Wpa2 => {
            let is_raw_key = length == 64 && value.chars().all(|c| c.is_ascii_hexdigit());
            (!(8..=63).contains(&length) && !is_raw_key)
                .then(|| "WPA passwords must be 8 to 63 characters".to_string())
        }
        Auth::Wep => (![5, 10, 13, 26].contains(&length))
            .then(|| "WEP keys must be 5, 10, 13 or 26 characters".to_string()),
    }
}

pub(super) fn build_wifi(values: &FieldValues) -> String {
    Network::from_values(values).payload()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_ssid_and_password() {
        let values = FieldValues::from_pairs([
            (SSID, "Office;WiFi"),
            (AUTH, "wpa2"),
            (PASSWORD, "pa:ss\\word"),
            (HIDDEN, "true"),
        ]);
        assert_eq!(
            build_wifi(&values),
            "WIFI:T:WPA2;S:Office\\;WiFi;P:pa\\:ss\\\\word;H:true;;"
        );
    }

    #[test]
    fn open_network_omits_password() {
        let values = FieldValues::from_pairs([(SSID, "Guest"), (AUTH, "OPEN"), (PASSWORD, "ignored")]);
        assert_eq!(build_wifi(&values), "WIFI:T:nopass;S:Guest;;");
        assert_eq!(validate_password("", &values), None);
    }

    #[test]
    fn unknown_auth_defaults_to_wpa() {
        let values = FieldValues::from_pairs([(SSID, "Lab"), (AUTH, "wpa3-enterprise"), (PASSWORD, "secret123")]);
        assert_eq!(build_wifi(&values), "WIFI:T:WPA;S:Lab;P:secret123;;");
    }

    #[test]
    fn password_rules_follow_auth() {
        let wpa = FieldValues::from_pairs([(AUTH, "WPA")]);
        assert!(validate_password("", &wpa).is_some());
        assert!(validate_password("short", &wpa).is_some());
        assert!(validate_password("long enough", &wpa).is_none());

        let wep = FieldValues::from_pairs([(AUTH, "wep")]);
        assert!(validate_password("abcde", &wep).is_none());
        assert!(validate_password("abcdef", &wep).is_some());
    }

    #[test]
    fn hidden_accepts_truthy_spellings() {
        for truthy in ["1", "yes", "Y", "x", "TRUE"] {
            let values = FieldValues::from_pairs([(SSID, "Lab"), (AUTH, "nopass"), (HIDDEN, truthy)]);
            assert_eq!(build_wifi(&values), "WIFI:T:nopass;S:Lab;H:true;;", "{truthy}");
        }
        let values = FieldValues::from_pairs([(SSID, "Lab"), (AUTH, "nopass"), (HIDDEN, "no")]);
        assert_eq!(build_wifi(&values), "WIFI:T:nopass;S:Lab;;");
    }

    #[test]
    fn raw_hex_key_is_accepted_for_wpa() {
        let wpa2 = FieldValues::from_pairs([(AUTH, "WPA2")]);
        assert!(validate_password(&"ab12".repeat(16), &wpa2).is_none());
        assert!(validate_password(&"zz12".repeat(16), &wpa2).is_some());
    }

    #[test]
    fn long_ssid_is_rejected() {
        assert!(validate_ssid(&"x".repeat(33), &FieldValues::new()).is_some());
    }
}
