use rand::{rngs::OsRng, RngCore};
use time::{Duration, OffsetDateTime};

use crate::auth::user::User;

/// Reset tokens live for one hour from issuance. Fixed policy.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

/// 20 bytes of OS randomness, 160 bits, hex-encoded to 40 characters.
const TOKEN_BYTES: usize = 20;

/// Mints an opaque token for reset links and session handles.
pub(crate) fn mint_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Outcome of a reset request, handed to the caller so it can build the
/// delivery payload. The issuer itself never renders pages or sends mail.
#[derive(Debug, Clone)]
pub struct ResetTicket {
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub user: User,
}
