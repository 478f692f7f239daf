mod macros;

pub use macros::*;

/// Lowercase `string`, collapse every run of characters that aren't ASCII
/// alphanumerics into a single `-`, and trim leading and trailing dashes.
/// Non-ASCII characters are transliterated first, so `Café` slugs to `cafe`.
pub fn slugify(string: &str) -> String {
    let mut output = String::with_capacity(string.len());

    let mut need_dash = false;
    for ch in string.chars() {
        for b in deunicode::deunicode_char(ch).unwrap_or("-").bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => {
                    if need_dash {
                        output.push('-');
                        need_dash = false;
                    }

                    output.push(b.to_ascii_lowercase() as char);
                }
                _ => need_dash = !output.is_empty(),
            }
        }
    }

    output
}

/// The key used to compare project and package names for featured status:
/// lowercased with `-` and `_` removed, so `Bash2Gitlab`, `bash2-gitlab` and
/// `bash2_gitlab` are all `bash2gitlab`.
pub fn name_key(name: &str) -> String {
    name.chars()
        .filter(|&c| c != '-' && c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Uppercases the first letter of every run of letters and lowercases the
/// rest: `cli` becomes `Cli`, `machine-learning` becomes `Machine-Learning`.
pub fn title_case(string: &str) -> String {
    let mut output = String::with_capacity(string.len());
    let mut in_word = false;
    for ch in string.chars() {
        if ch.is_alphabetic() {
            match in_word {
                true => output.extend(ch.to_lowercase()),
                false => output.extend(ch.to_uppercase()),
            }
        } else {
            output.push(ch);
        }

        in_word = ch.is_alphabetic();
    }

    output
}
