//! Connection badge.

use crate::connection::{ConnectionState, ConnectionStatus};

/// Badge text while a call is in flight.
pub const CONNECTING_LABEL: &str = "Connexion en cours...";
/// Badge text after a failure.
pub const OFFLINE_LABEL: &str = "Hors ligne";
/// Badge text after a success.
pub const ONLINE_LABEL: &str = "Connecté";

/// Render the badge. The offline badge is a button that re-runs the connection test.
#[must_use]
pub fn render(status: &ConnectionStatus) -> String {
    match status.state {
        ConnectionState::Connecting => format!(
            r#"<div class="badge badge-loading"><span class="spinner"></span><span>{CONNECTING_LABEL}</span></div>"#
        ),
        ConnectionState::Disconnected => format!(
            r#"<form method="post" action="/connection/test" class="inline"><button type="submit" class="badge badge-offline" title="Cliquez pour reconnecter"><span class="dot"></span><span>{OFFLINE_LABEL}</span></button></form>"#
        ),
        ConnectionState::Connected => format!(
            r#"<div class="badge badge-online"><span class="dot"></span><span>{ONLINE_LABEL}</span></div>"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: ConnectionState) -> ConnectionStatus {
        ConnectionStatus {
            state,
            connected: state == ConnectionState::Connected,
            loading: state == ConnectionState::Connecting,
            error: None,
        }
    }

    #[test]
    fn test_badge_variants() {
        assert!(render(&status(ConnectionState::Connecting)).contains(CONNECTING_LABEL));

        let offline = render(&status(ConnectionState::Disconnected));
        assert!(offline.contains(OFFLINE_LABEL));
        assert!(offline.contains(r#"action="/connection/test""#));

        let online = render(&status(ConnectionState::Connected));
        assert!(online.contains(ONLINE_LABEL));
        assert!(!online.contains("<form"));
    }
}
