//! DN construction helpers.

/// Escape special characters in a DN attribute value per RFC 4514.
///
/// Characters that must be escaped:
/// - Leading or trailing SPACE (escaped as \20)
/// - Leading # (escaped as \23)
/// - Characters: , + " \ < > ; = (escaped with backslash prefix)
/// - NUL character (escaped as \00)
#[must_use]
pub fn escape_dn_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len() * 2);
    let last = value.chars().count().saturating_sub(1);

    for (i, ch) in value.chars().enumerate() {
        match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                result.push('\\');
                result.push(ch);
            }
            '\0' => result.push_str("\\00"),
            ' ' if i == 0 || i == last => result.push_str("\\20"),
            '#' if i == 0 => result.push_str("\\23"),
            _ => result.push(ch),
        }
    }

    result
}

/// DN of a member entry: `cn=<id>,<base_dn>`.
#[must_use]
pub fn member_dn(id: &str, base_dn: &str) -> String {
    format!("cn={},{}", escape_dn_value(id), base_dn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_dn() {
        assert_eq!(
            member_dn("1234", "ou=membres,dc=example,dc=org"),
            "cn=1234,ou=membres,dc=example,dc=org"
        );
    }

    #[test]
    fn test_escape_dn_value_simple() {
        assert_eq!(escape_dn_value("1234"), "1234");
        assert_eq!(escape_dn_value("Jean Dupont"), "Jean Dupont");
        assert_eq!(escape_dn_value(""), "");
    }

    #[test]
    fn test_escape_dn_value_special_chars() {
        assert_eq!(escape_dn_value("a,b"), "a\\,b");
        assert_eq!(escape_dn_value("a+b"), "a\\+b");
        assert_eq!(escape_dn_value("a\"b"), "a\\\"b");
        assert_eq!(escape_dn_value("a\\b"), "a\\\\b");
        assert_eq!(escape_dn_value("a;b"), "a\\;b");
        assert_eq!(escape_dn_value("a=b"), "a\\=b");
        assert_eq!(escape_dn_value("a\0b"), "a\\00b");
    }

    #[test]
    fn test_escape_dn_value_leading_trailing() {
        assert_eq!(escape_dn_value(" admin "), "\\20admin\\20");
        assert_eq!(escape_dn_value("#admin"), "\\23admin");
        assert_eq!(escape_dn_value("admin#1"), "admin#1");
        // Multi-byte characters count as one position.
        assert_eq!(escape_dn_value("é "), "é\\20");
    }

    #[test]
    fn test_escape_dn_value_injection_attempt() {
        let escaped = escape_dn_value("1,dc=evil,dc=com");
        assert_eq!(escaped, "1\\,dc\\=evil\\,dc\\=com");
    }
}
