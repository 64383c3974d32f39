// glyphcure-core/tests/curing_tests.rs
use test_log::test;

use glyphcure_core::{contains, cure, cure_utf16, CureError, Options};

const CORPUS: [&str; 8] = [
    "vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣",
    "this is a piece of $h1t",
    "h̸̢e̵l̷l̶o̴ w̷o̶r̸l̵d̴",
    "ѕсаm аlеrt",
    "Ｈｅｌｌｏ, Ｗｏｒｌｄ!",
    "café ŞEKER",
    "plain ascii text\nwith a newline",
    "",
];

#[test]
fn test_stylized_text_is_cured() {
    assert_eq!(cure("vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", Options::default()).as_str(), "very funny text");
    assert_eq!(cure("h̸̢e̵l̷l̶o̴ w̷o̶r̸l̵d̴", Options::default()).as_str(), "hello world");
    assert_eq!(cure("ѕсаm аlеrt", Options::default()).as_str(), "scam alert");
}

#[test]
fn test_contains_folds_similar_characters() {
    assert!(contains("this is a piece of $h1t", "shit"));
    assert!(cure("this is a piece of $h1t", Options::default()).contains("shit"));
    assert!(!contains("this is a piece of cake", "shit"));
}

#[test]
fn test_find_and_censor() {
    let mut cured = cure("vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", Options::default());
    assert_eq!(cured.find("funny").collect::<Vec<_>>(), vec![5..10]);

    cured.censor("funny", '*');
    assert_eq!(cured.original(), "vＥⓡ𝔂 ***** ţ乇𝕏𝓣");
    assert_eq!(cured.to_string(), "very ***** text");

    // Nothing left to censor, and the earlier replacement is not counted again.
    cured.censor("funny", '*');
    assert_eq!(cured.original(), "vＥⓡ𝔂 ***** ţ乇𝕏𝓣");
}

#[test]
fn test_censor_covers_combining_marks() {
    let mut cured = cure("say h̸̢e̵l̷l̶o̴ now", Options::default());
    cured.censor("hello", '#');
    assert_eq!(cured.original(), "say ##### now");
}

#[test]
fn test_empty_input() {
    let cured = cure("", Options::default());
    assert_eq!(cured.as_str(), "");
    assert!(cured.index_map().is_empty());
    assert_eq!(cured.find("a").count(), 0);
}

#[test]
fn test_unassigned_and_private_use_code_points() {
    assert_eq!(cure("a\u{378}b", Options::default()).as_str(), "a\u{378}b");
    assert_eq!(cure("a\u{E000}\u{F8FF}b", Options::default()).as_str(), "ab");
    assert_eq!(cure("\u{E01F0}\u{10FFFF}", Options::default()).as_str(), "");
}

#[test]
fn test_curing_is_idempotent() {
    for text in CORPUS {
        let once = cure(text, Options::default()).into_string();
        let twice = cure(&once, Options::default()).into_string();
        assert_eq!(once, twice, "curing {:?} twice changed the result", text);
    }
}

#[test]
fn test_expansion_is_bounded() {
    for text in CORPUS.iter().copied().chain(["ßßßß", "ǆǉǌ", "……"]) {
        let cured = cure(text, Options::default());
        assert!(cured.chars().count() <= 31 * text.chars().count().max(1), "{:?}", text);
    }
}

#[test]
fn test_matches_map_back_to_original() {
    let cases = [
        ("vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", "funny"),
        ("h̸̢e̵l̷l̶o̴ w̷o̶r̸l̵d̴", "hello"),
        ("h̸̢e̵l̷l̶o̴ w̷o̶r̸l̵d̴", "world"),
        ("ѕсаm аlеrt", "alert"),
        ("dont ßlide", "sslide"),
        ("say \u{202E}olleh\u{202C} there", "hello"),
    ];

    for (text, needle) in cases {
        let cured = cure(text, Options::default());
        let matches: Vec<_> = cured.find(needle).collect();
        assert!(!matches.is_empty(), "{:?} not found in {:?}", needle, text);

        for range in matches {
            let original = cured.to_original_range(range.clone());
            let recured = cure(&text[original], Options::default());
            assert_eq!(recured.as_str(), &cured.as_str()[range]);
        }
    }
}

#[test]
fn test_reordered_match_maps_to_its_override() {
    let text = "say \u{202E}olleh\u{202C} there";
    let cured = cure(text, Options::default());
    assert_eq!(cured.as_str(), "say hello there");
    assert_eq!(cured.find("hello").collect::<Vec<_>>(), vec![4..9]);
    assert_eq!(&text[cured.to_original_range(4..9)], "\u{202E}olleh\u{202C}");
}

#[test]
fn test_censor_inside_override_keeps_the_controls() {
    let mut cured = cure("say \u{202E}olleh\u{202C} there", Options::default());
    cured.censor("hello", '*');
    assert_eq!(cured.original(), "say \u{202E}*****\u{202C} there");
    assert_eq!(cured.as_str(), "say ***** there");

    let mut cured = cure("x\u{202E}abc\u{202C}y", Options::default());
    cured.censor("xc", '*');
    assert_eq!(cured.original(), "*\u{202E}ab*\u{202C}y");
}

#[test]
fn test_censored_text_is_not_an_x() {
    let mut cured = cure("so funny", Options::default());
    cured.censor("funny", '*');
    assert!(!cured.contains("xxxxx"));
    assert!(!cured.contains("x"));

    let mut cured = cure("a ***** b", Options::default());
    cured.censor("xxx", '#');
    assert_eq!(cured.original(), "a ***** b");
}

#[test]
fn test_lookalike_families_are_cured() {
    // Cherokee, Lisu, CJK strokes and Canadian syllabics.
    assert_eq!(cure("ᏚᎻᏆᎢ", Options::default()).as_str(), "shit");
    assert_eq!(cure("ꓢꓧꓲꓔ", Options::default()).as_str(), "shit");
    assert_eq!(cure("丂卄丨ㄒ", Options::default()).as_str(), "shit");
    assert_eq!(cure("ᔕᕼIT", Options::default()).as_str(), "shit");
    // Lisu, syllabics and Latin Extended-C.
    assert_eq!(cure("ꓮᗅⱥ", Options::default()).as_str(), "aaa");
    assert!(contains("₪ice ꞵird", "nice bird"));
}

#[test]
fn test_retention_does_not_touch_other_scripts() {
    let texts = ["vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", "ѕсаm аlеrt", "Ｈｅｌｌｏ, Ｗｏｒｌｄ!"];
    for text in texts {
        let baseline = cure(text, Options::default()).into_string();
        assert_eq!(cure(text, Options::default().retain_greek()).into_string(), baseline);
        assert_eq!(cure(text, Options::default().retain_arabic()).into_string(), baseline);
    }
}

#[test]
fn test_retention_keeps_tagged_characters() {
    assert_eq!(cure("ѕсаm", Options::default().retain_cyrillic()).as_str(), "ѕсаm");
    assert_eq!(cure("café", Options::default().retain_diacritics()).as_str(), "café");
    assert_eq!(cure("şeker", Options::default().retain_turkish()).as_str(), "şeker");
    assert_eq!(cure("şeker", Options::default()).as_str(), "seker");
}

#[test]
fn test_retain_capitalization() {
    let cured = cure("Ｈｅｌｌｏ ＷＯＲＬＤ", Options::default().retain_capitalization());
    assert_eq!(cured.as_str(), "Hello WORLD");
}

#[test]
fn test_bidi_override_is_undone() {
    assert_eq!(cure("\u{202E}olleh", Options::default()).as_str(), "hello");
    assert_eq!(cure("\u{202E}olleh", Options::default().disable_bidi()).as_str(), "olleh");
    assert!(contains("say \u{202E}olleh\u{202C} there", "hello"));
}

#[test]
fn test_invalid_utf16_is_rejected() {
    let err = cure_utf16(&[0x0068, 0x0069, 0xDC00], Options::default()).unwrap_err();
    assert_eq!(err, CureError::InvalidUtf16(0xDC00, 2));
    assert!(err.to_string().contains("0xdc00"));
}
