//! Chromium network error names and their numeric codes.

/// Numeric codes for the `net::ERR_*` names Chromium reports most often.
const NET_ERRORS: &[(&str, i32)] = &[
    ("IO_PENDING", -1),
    ("FAILED", -2),
    ("ABORTED", -3),
    ("INVALID_ARGUMENT", -4),
    ("FILE_NOT_FOUND", -6),
    ("TIMED_OUT", -7),
    ("FILE_TOO_BIG", -8),
    ("ACCESS_DENIED", -10),
    ("BLOCKED_BY_CLIENT", -20),
    ("NETWORK_CHANGED", -21),
    ("BLOCKED_BY_ADMINISTRATOR", -22),
    ("BLOCKED_BY_RESPONSE", -27),
    ("CONNECTION_CLOSED", -100),
    ("CONNECTION_RESET", -101),
    ("CONNECTION_REFUSED", -102),
    ("CONNECTION_ABORTED", -103),
    ("CONNECTION_FAILED", -104),
    ("NAME_NOT_RESOLVED", -105),
    ("INTERNET_DISCONNECTED", -106),
    ("SSL_PROTOCOL_ERROR", -107),
    ("ADDRESS_INVALID", -108),
    ("ADDRESS_UNREACHABLE", -109),
    ("CONNECTION_TIMED_OUT", -118),
    ("NAME_RESOLUTION_FAILED", -137),
    ("CERT_COMMON_NAME_INVALID", -200),
    ("CERT_DATE_INVALID", -201),
    ("CERT_AUTHORITY_INVALID", -202),
    ("CERT_REVOKED", -206),
    ("CERT_INVALID", -207),
    ("INVALID_URL", -300),
    ("DISALLOWED_URL_SCHEME", -301),
    ("UNKNOWN_URL_SCHEME", -302),
    ("TOO_MANY_REDIRECTS", -310),
    ("UNSAFE_PORT", -312),
    ("INVALID_RESPONSE", -320),
    ("EMPTY_RESPONSE", -324),
    ("INSECURE_RESPONSE", -501),
];

/// Code used when the name is not in the table.
pub const UNKNOWN_NET_ERROR: i32 = -2;

/// Looks up the numeric code for an error such as `net::ERR_NAME_NOT_RESOLVED`.
pub fn net_error_code(error_text: &str) -> i32 {
    let name = error_text
        .trim()
        .trim_start_matches("net::")
        .trim_start_matches("ERR_");
    NET_ERRORS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, code)| *code)
        .unwrap_or(UNKNOWN_NET_ERROR)
}

pub fn is_timeout(error_text: &str) -> bool {
    matches!(net_error_code(error_text), -7 | -118)
}
