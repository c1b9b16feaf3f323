use sha2::{Digest, Sha256};

/// Byte budget for the sanitized title part of a base name.
const MAX_TITLE_BYTES: usize = 80;

/// Windows-safe, deterministic artifact base name:
/// `{sanitized_title}--{short_hash(url)}`. The writer appends the three
/// sibling extensions.
pub fn deterministic_base_name(title: Option<&str>, url: &str) -> String {
    let sanitized = sanitize_title(title.unwrap_or("untitled"));
    let hash = short_hash(url);
    format!("{sanitized}--{hash}")
}

fn sanitize_title(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "untitled".to_string();
    }
    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut final_name = compacted;
    if final_name.len() > MAX_TITLE_BYTES {
        // Cut on a char boundary; titles are routinely non-ASCII.
        let mut end = MAX_TITLE_BYTES;
        while end > 0 && !final_name.is_char_boundary(end) {
            end -= 1;
        }
        final_name.truncate(end);
    }
    if is_reserved_windows_name(&final_name) {
        final_name.push('_');
    }
    final_name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::deterministic_base_name;

    #[test]
    fn same_inputs_yield_same_base_name() {
        let a = deterministic_base_name(Some("Ретрознак"), "https://example.com/");
        let b = deterministic_base_name(Some("Ретрознак"), "https://example.com/");
        assert_eq!(a, b);
        assert!(a.starts_with("Ретрознак--"));
    }

    #[test]
    fn forbidden_characters_are_replaced() {
        let name = deterministic_base_name(Some("a/b:c*d"), "https://example.com/");
        assert!(name.starts_with("a_b_c_d--"));
    }

    #[test]
    fn empty_title_falls_back_to_untitled() {
        let name = deterministic_base_name(None, "https://example.com/");
        assert!(name.starts_with("untitled--"));
    }

    #[test]
    fn long_cyrillic_title_is_cut_on_a_char_boundary() {
        // 1 ASCII byte + 40 two-byte Cyrillic chars = 81 bytes, so byte 80
        // falls inside the last character.
        let title = format!("a{}", "я".repeat(40));
        let name = deterministic_base_name(Some(&title), "https://example.com/");
        let (base, _) = name.rsplit_once("--").expect("hash suffix");
        assert!(base.len() <= 80);
        assert_eq!(base, format!("a{}", "я".repeat(39)));
    }

    #[test]
    fn long_ascii_title_keeps_the_full_budget() {
        let title = "x".repeat(200);
        let name = deterministic_base_name(Some(&title), "https://example.com/");
        let (base, _) = name.rsplit_once("--").expect("hash suffix");
        assert_eq!(base, "x".repeat(80));
    }

    #[test]
    fn reserved_windows_names_are_suffixed() {
        let name = deterministic_base_name(Some("CON"), "https://example.com/");
        assert!(name.starts_with("CON_--"));
    }
}
