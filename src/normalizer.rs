use std::sync::LazyLock;
use regex::Regex;

/// Nation recorded for all-Latin names whose origin can't be told
pub const UNKNOWN_NATION: &str = "未知";
/// Nation assumed for names written in Chinese script
pub const DEFAULT_NATION: &str = "中国";

/// Bracketed nation codes as they appear in author credits, e.g. "[美]"
/// "台湾" is the only multi-character key and is kept as found on the site.
const NATION_MAP: &[(&str, &str)] = &[
    ("法", "法国"),
    ("美", "美国"),
    ("英", "英国"),
    ("日", "日本"),
    ("德", "德国"),
    ("俄", "俄罗斯"),
    ("加", "加拿大"),
    ("意", "意大利"),
    ("西", "西班牙"),
    ("澳", "澳大利亚"),
    ("台湾", "中国"),
];

static BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[【(（](.*?)[\]】)）]").expect("bracket pattern"));
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[·/]").expect("separator pattern"));
static DOT_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s+").expect("dot-space pattern"));
static TRAILING_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([A-Za-z\s.]+\)$").expect("alias pattern"));
static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("spaces pattern"));
static LATIN_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s.]+$").expect("latin pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAuthor {
    pub name: String,
    pub nation: &'static str,
}

pub fn nation_for_code(code: &str) -> Option<&'static str> {
    NATION_MAP
        .iter()
        .find(|(k, _)| *k == code)
        .map(|(_, v)| *v)
}

/// Splits a raw author credit such as "[法] 阿尔贝·加缪" into a canonical
/// name and a nation.
///
/// Steps, in order:
/// 1. the first bracketed span is removed; its content becomes the nation when it is a known code
/// 2. `·` and `/` become `.`
/// 3. whitespace after a `.` is dropped
/// 4. a trailing Latin alias in parentheses is dropped
/// 5. whitespace runs collapse to one space
/// 6. an unresolved nation is "未知" for all-Latin names, "中国" otherwise
pub fn normalize_author(raw_credit: &str) -> NormalizedAuthor {
    let mut name = raw_credit.trim().to_string();
    let mut nation = None;

    if let Some(caps) = BRACKET.captures(&name) {
        let whole = caps[0].to_string();
        nation = nation_for_code(caps[1].trim());
        // Other bracket content (romanized aliases etc.) is dropped as well
        name = name.replace(&whole, "").trim().to_string();
    }

    let name = SEPARATOR.replace_all(&name, ".");
    let name = DOT_SPACE.replace_all(&name, ".");
    let name = TRAILING_ALIAS.replace(&name, "");
    let name = SPACES.replace_all(name.trim(), " ").trim().to_string();

    let nation = nation.unwrap_or_else(|| {
        if LATIN_ONLY.is_match(&name) {
            UNKNOWN_NATION
        } else {
            DEFAULT_NATION
        }
    });

    NormalizedAuthor { name, nation }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> (String, &'static str) {
        let a = normalize_author(s);
        (a.name, a.nation)
    }

    #[test]
    fn test_bracketed_nation_codes() {
        assert_eq!(norm("阿光·加缪(法)"), ("阿光.加缪".to_string(), "法国"));
        assert_eq!(norm("[美] 斯蒂芬·金"), ("斯蒂芬.金".to_string(), "美国"));
        assert_eq!(norm("【日】东野圭吾"), ("东野圭吾".to_string(), "日本"));
        assert_eq!(norm("（英）乔治·奥威尔"), ("乔治.奥威尔".to_string(), "英国"));
        assert_eq!(norm("[ 俄 ] 列夫·托尔斯泰"), ("列夫.托尔斯泰".to_string(), "俄罗斯"));
    }

    #[test]
    fn test_every_code_resolves_and_disappears() {
        for (code, country) in NATION_MAP {
            let a = normalize_author(&format!("[{code}]某某"));
            assert_eq!(a.nation, *country);
            assert_eq!(a.name, "某某");
        }
    }

    #[test]
    fn test_two_character_taiwan_key() {
        assert_eq!(norm("(台湾)三毛"), ("三毛".to_string(), "中国"));
    }

    #[test]
    fn test_latin_names_are_unknown() {
        assert_eq!(norm("J.K. Rowling"), ("J.K.Rowling".to_string(), UNKNOWN_NATION));
        assert_eq!(norm("  George   Orwell "), ("George Orwell".to_string(), UNKNOWN_NATION));
    }

    #[test]
    fn test_non_latin_defaults_to_china() {
        assert_eq!(norm("刘慈欣"), ("刘慈欣".to_string(), DEFAULT_NATION));
        assert_eq!(norm("村上春树"), ("村上春树".to_string(), DEFAULT_NATION));
    }

    #[test]
    fn test_unknown_bracket_content_is_stripped() {
        // Not a nation code: removed, nation left to the script check
        assert_eq!(norm("刘慈欣 (Liu Cixin)"), ("刘慈欣".to_string(), DEFAULT_NATION));
        assert_eq!(norm("[清] 曹雪芹"), ("曹雪芹".to_string(), DEFAULT_NATION));
    }

    #[test]
    fn test_trailing_latin_alias_after_nation() {
        assert_eq!(
            norm("[英] J.K.罗琳 (J. K. Rowling)"),
            ("J.K.罗琳".to_string(), "英国")
        );
    }

    #[test]
    fn test_separators_unified() {
        assert_eq!(norm("[德]托马斯/曼"), ("托马斯.曼".to_string(), "德国"));
        assert_eq!(norm("Jean-Paul· Sartre"), ("Jean-Paul.Sartre".to_string(), DEFAULT_NATION));
    }
}
