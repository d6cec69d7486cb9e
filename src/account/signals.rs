//! Query-string signals recognized on admin requests.

use std::collections::HashMap;

pub const LOGIN: &str = "login";
pub const CONNECT: &str = "connect";
pub const NONCE: &str = "_nonce";
pub const CONNECTION_SUCCESS: &str = "connection-success";
pub const STATE: &str = "state";
pub const MODE: &str = "mode";

/// Mode an account was connected in, as reported on the OAuth callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    Test,
    Live,
}

impl ConnectMode {
    /// Only the exact value `test` selects test mode; anything else is live.
    pub fn parse(value: &str) -> Self {
        if value == "test" {
            ConnectMode::Test
        } else {
            ConnectMode::Live
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, ConnectMode::Test)
    }
}

/// The single handshake step a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger<'a> {
    Login { nonce: Option<&'a str> },
    ConnectionSuccess,
    Connect { nonce: Option<&'a str> },
    Finalize { state: &'a str, mode: ConnectMode },
}

/// Presence of a key is what counts; values are only read for the nonce,
/// `state` and `mode`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignals {
    pub login: bool,
    pub connect: bool,
    pub nonce: Option<String>,
    pub connection_success: bool,
    pub state: Option<String>,
    pub mode: Option<String>,
}

impl RequestSignals {
    pub fn from_query<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut signals = RequestSignals::default();
        for (key, value) in pairs {
            match key {
                LOGIN => signals.login = true,
                CONNECT => signals.connect = true,
                NONCE => signals.nonce = Some(value.trim().to_string()),
                CONNECTION_SUCCESS => signals.connection_success = true,
                STATE => signals.state = Some(value.trim().to_string()),
                MODE => signals.mode = Some(value.trim().to_string()),
                _ => {}
            }
        }
        signals
    }

    pub fn from_map(query: &HashMap<String, String>) -> Self {
        Self::from_query(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Pick the step to run: login, then success marker, then connect, then
    /// finalize.
    pub fn trigger(&self) -> Option<Trigger<'_>> {
        if self.login {
            return Some(Trigger::Login {
                nonce: self.nonce.as_deref(),
            });
        }
        if self.connection_success {
            return Some(Trigger::ConnectionSuccess);
        }
        if self.connect {
            return Some(Trigger::Connect {
                nonce: self.nonce.as_deref(),
            });
        }
        match (self.state.as_deref(), self.mode.as_deref()) {
            (Some(state), Some(mode)) => Some(Trigger::Finalize {
                state,
                mode: ConnectMode::parse(mode),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_wins_over_connect() {
        let signals =
            RequestSignals::from_query([("connect", "1"), ("login", "1"), ("_nonce", "n")]);
        assert_eq!(signals.trigger(), Some(Trigger::Login { nonce: Some("n") }));
    }

    #[test]
    fn success_marker_wins_over_connect_and_finalize() {
        let signals = RequestSignals::from_query([
            ("connect", "1"),
            ("connection-success", "1"),
            ("state", "abc"),
            ("mode", "live"),
        ]);
        assert_eq!(signals.trigger(), Some(Trigger::ConnectionSuccess));
    }

    #[test]
    fn finalize_needs_both_state_and_mode() {
        let only_state = RequestSignals::from_query([("state", "abc")]);
        assert_eq!(only_state.trigger(), None);

        let both = RequestSignals::from_query([("state", "abc"), ("mode", "test")]);
        assert_eq!(
            both.trigger(),
            Some(Trigger::Finalize {
                state: "abc",
                mode: ConnectMode::Test
            })
        );
    }

    #[test]
    fn empty_values_still_count_as_present() {
        let signals = RequestSignals::from_query([("login", "")]);
        assert_eq!(signals.trigger(), Some(Trigger::Login { nonce: None }));
    }

    #[test]
    fn unrelated_params_pass_through() {
        let mut query = HashMap::new();
        query.insert("page".to_string(), "settings".to_string());
        assert_eq!(RequestSignals::from_map(&query).trigger(), None);
    }

    #[test]
    fn mode_parsing_is_exact() {
        assert_eq!(ConnectMode::parse("test"), ConnectMode::Test);
        assert_eq!(ConnectMode::parse("TEST"), ConnectMode::Live);
        assert_eq!(ConnectMode::parse("live"), ConnectMode::Live);
    }
}
