/// Indonesian international dialing code.
pub const COUNTRY_CODE: &str = "62";

/// Rewrites a free-form phone number into the digits-only `62…` form the WhatsApp
/// gateway expects. Never fails; garbage in yields a bare country code.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if let Some(local) = digits.strip_prefix('0') {
        format!("{COUNTRY_CODE}{local}")
    } else if digits.starts_with(COUNTRY_CODE) {
        digits
    } else {
        format!("{COUNTRY_CODE}{digits}")
    }
}
