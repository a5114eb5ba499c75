use serde::{Deserialize, Serialize};

/// Try to get a keyword from a string, ignoring string casing.
pub fn keyword_from_str(s: &str) -> Option<Keyword> {
    let s = unicase::Ascii::new(s);
    let idx = match KEYWORD_STRINGS.binary_search(&s) {
        Ok(idx) => idx,
        Err(_) => return None,
    };
    Some(ALL_KEYWORDS[idx])
}

/// Generate an enum of keywords.
///
/// Keywords must be listed in sorted order.
macro_rules! define_keywords {
    ($($ident:ident),*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Keyword {
            $($ident),*
        }

        impl Keyword {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Keyword::$ident => stringify!($ident)),*
                }
            }
        }

        pub const ALL_KEYWORDS: &'static [Keyword] = &[
            $(Keyword::$ident),*
        ];

        pub const KEYWORD_STRINGS: &'static [unicase::Ascii<&'static str>] = &[
            $(unicase::Ascii::new(stringify!($ident)),)*
        ];
    };
}

#[rustfmt::skip]
define_keywords!(
    ALL,
    ANALYZE,
    AND,
    AS,
    ASC,
    AST,
    BY,
    DESC,
    DISTINCT,
    EXCEPT,
    EXPLAIN,
    FALSE,
    FORMAT,
    FROM,
    GROUP,
    HAVING,
    IN,
    INNER,
    INSERT,
    INTERSECT,
    INTO,
    IS,
    JOIN,
    LEFT,
    LIMIT,
    NOT,
    NULL,
    OFFSET,
    ON,
    OR,
    ORDER,
    OUTER,
    OUTFILE,
    PLAN,
    RIGHT,
    SELECT,
    SET,
    SETTINGS,
    SYNTAX,
    TABLE,
    TRUE,
    UNION,
    UPDATE,
    USING,
    VALUES,
    WHERE,
    WITH
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_sorted() {
        let mut sorted = KEYWORD_STRINGS.to_vec();
        sorted.sort();
        assert_eq!(KEYWORD_STRINGS, sorted.as_slice());
    }

    #[test]
    fn case_insensitive_lookup() {
        assert_eq!(Some(Keyword::EXPLAIN), keyword_from_str("explain"));
        assert_eq!(Some(Keyword::SYNTAX), keyword_from_str("Syntax"));
        assert_eq!(None, keyword_from_str("pipeline_x"));
    }
}
