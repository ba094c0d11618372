//! ICE username fragment and password.

use rand::Rng;
use rand::distr::Alphanumeric;

const UFRAG_LEN: usize = 8;
const PWD_LEN: usize = 24;

/// Short-term credentials advertised in `a=ice-ufrag` / `a=ice-pwd`.
///
/// RFC 5245 requires at least 4 characters for the fragment and 22 for the
/// password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCredentials {
    pub ufrag: String,
    pub pwd: String,
}

impl IceCredentials {
    pub fn generate() -> Self {
        Self {
            ufrag: random_token(UFRAG_LEN),
            pwd: random_token(PWD_LEN),
        }
    }

    /// Username used in a binding request sent to the peer: `remote:local`.
    pub fn check_username(&self, remote_ufrag: &str) -> String {
        format!("{}:{}", remote_ufrag, self.ufrag)
    }
}

fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
