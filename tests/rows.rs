use insta::assert_snapshot;
use rowbind::{parse_rows, ConfigOverrides, Error, NamedRow, ParserConfig, CSV, SSV, TSV};

const SSV_DOC: &str = "plain;with spaces;'quoted;separator'
'hello;world';   \"123\" ; 1.23
true;456;1e10";

fn row(pairs: &[(&str, &str)]) -> NamedRow {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn single_key(text: &str) -> String {
    let rows = parse_rows(text, &CSV).unwrap();
    assert_eq!(rows.len(), 1);
    rows[0].keys().next().unwrap().clone()
}

#[test]
fn parses_regardless_of_separator() {
    for separator in [',', '\t', ';', '\u{0}', '試'] {
        let sep = separator.to_string();
        let config = ParserConfig::builder().separator(separator).build().unwrap();
        let rows = parse_rows(&SSV_DOC.replace(';', &sep), &config).unwrap();

        let expected = vec![
            row(&[("plain", "hello;world"), ("with spaces", "123"), ("quoted;separator", "1.23")]),
            row(&[("plain", "true"), ("with spaces", "456"), ("quoted;separator", "1e10")]),
        ]
        .into_iter()
        .map(|r| r.into_iter().map(|(k, v)| (k.replace(';', &sep), v.replace(';', &sep))).collect())
        .collect::<Vec<NamedRow>>();

        assert_eq!(rows, expected, "separator {separator:?}");
    }
}

#[test]
fn presets_split_on_their_separator() {
    assert_eq!(parse_rows("a;b\n1;2", &SSV).unwrap(), vec![row(&[("a", "1"), ("b", "2")])]);
    assert_eq!(parse_rows("a\tb\n1\t2", &TSV).unwrap(), vec![row(&[("a", "1"), ("b", "2")])]);
    assert_eq!(parse_rows("a,b\n1,2", &CSV).unwrap(), vec![row(&[("a", "1"), ("b", "2")])]);
}

#[test]
fn unquoted_rows_match_naive_split() {
    let lines = ["x, y ,z", "1,2,3", "  spaced out ,\tvalues\t, here  "];
    let text = lines.join("\n");
    let rows = parse_rows(&text, &CSV).unwrap();

    let header: Vec<&str> = lines[0].split(',').map(|c| c.trim_matches([' ', '\t'])).collect();
    for (line, parsed) in lines[1..].iter().zip(&rows) {
        let expected: NamedRow = header
            .iter()
            .zip(line.split(','))
            .map(|(k, v)| (k.to_string(), v.trim_matches([' ', '\t']).to_string()))
            .collect();
        assert_eq!(parsed, &expected);
    }
}

#[test]
fn ignores_leading_whitespace() {
    let rows = parse_rows("\n\n\n     hello\n\tworld", &CSV).unwrap();
    assert_eq!(rows, vec![row(&[("hello", "world")])]);
}

#[test]
fn ignores_trailing_whitespace() {
    let rows = parse_rows("hello    \t\t \n\tworld\t\t   \n\n\n   ", &CSV).unwrap();
    assert_eq!(rows, vec![row(&[("hello", "world")])]);
}

#[test]
fn accepts_crlf_line_endings() {
    let rows = parse_rows("a,b\r\n1,2\r\n", &CSV).unwrap();
    assert_eq!(rows, vec![row(&[("a", "1"), ("b", "2")])]);
}

#[test]
fn header_only_document_has_no_rows() {
    assert!(parse_rows("a,b,c", &CSV).unwrap().is_empty());
}

#[test]
fn empty_document_is_missing_header() {
    assert!(matches!(parse_rows("", &CSV), Err(Error::MissingHeader)));
    assert!(matches!(parse_rows("  \n\t\n", &CSV), Err(Error::MissingHeader)));
}

#[test]
fn quote_chars_are_configurable() {
    let config = CSV
        .with_overrides(ConfigOverrides { quotes: Some(vec!['|']), ..Default::default() })
        .unwrap();
    let rows = parse_rows("|a|\n'hello'", &config).unwrap();
    assert_eq!(rows, vec![row(&[("a", "'hello'")])]);
}

#[test]
fn mismatched_quote_chars_fail() {
    let err = parse_rows("\"a'\nhello", &CSV).unwrap_err();
    assert!(matches!(err, Error::UnterminatedQuote { line: 1, offset: 0, quote: '"' }));
}

#[test]
fn missing_end_quote_fails() {
    let err = parse_rows("'a\nhello", &CSV).unwrap_err();
    assert_snapshot!(err.to_string(), @"line 1: unterminated quote '\\'' opened at offset 0");
}

#[test]
fn garbage_between_quoted_values_fails() {
    let err = parse_rows("'a' garbage, 'b'\nhello,world", &CSV).unwrap_err();
    assert!(matches!(err, Error::TrailingGarbage { line: 1, offset: 4, found: 'g', .. }));
    assert_snapshot!(err.to_string(), @"line 1: expected one of ',' at offset 4, found 'g'");
}

#[test]
fn errors_report_the_physical_line() {
    let err = parse_rows("a,b\n\n\n1,\"2", &CSV).unwrap_err();
    assert!(matches!(err, Error::UnterminatedQuote { line: 4, offset: 2, quote: '"' }));
}

#[test]
fn quote_chars_can_be_escaped() {
    assert_eq!(single_key("'\\'a\\''\nhello"), "'a'");
}

#[test]
fn separator_chars_can_be_escaped() {
    assert_eq!(single_key("\\,\\,\\,\nhello"), ",,,");
}

#[test]
fn escape_char_can_be_escaped() {
    assert_eq!(single_key("\\\\\nhello"), "\\");
}

#[test]
fn one_quote_char_can_appear_between_two_others() {
    assert_eq!(single_key("'\"a\"'\nhello"), "\"a\"");
}

#[test]
fn escaped_values_round_trip() {
    for value in ["a,b", "back\\slash", "\\,", "trailing\\"] {
        let escaped = value.replace('\\', "\\\\").replace(',', "\\,");
        let rows = parse_rows(&format!("key,other\n{escaped},x"), &CSV).unwrap();
        assert_eq!(rows[0]["key"], value, "escaped form {escaped:?}");
    }
}

#[test]
fn escape_can_be_disabled() {
    let config = CSV
        .with_overrides(ConfigOverrides { escape: Some(None), ..Default::default() })
        .unwrap();
    let rows = parse_rows("a,b\nx\\,y", &config).unwrap();
    assert_eq!(rows, vec![row(&[("a", "x\\"), ("b", "y")])]);
}

#[test]
fn empty_columns_are_preserved() {
    let rows = parse_rows("a,b,c\n,,\n1,,3", &CSV).unwrap();
    assert_eq!(
        rows,
        vec![
            row(&[("a", ""), ("b", ""), ("c", "")]),
            row(&[("a", "1"), ("b", ""), ("c", "3")]),
        ]
    );
}

#[test]
fn duplicate_header_columns_are_rejected() {
    let err = parse_rows("a,b,a\n1,2,3", &CSV).unwrap_err();
    assert!(matches!(&err, Error::DuplicateColumn { column } if column == "a"));
}

#[test]
fn ragged_rows_are_rejected_by_default() {
    let err = parse_rows("a,b\n1,2\n3", &CSV).unwrap_err();
    assert_snapshot!(err.to_string(), @"line 3: expected 2 column(s) to match the header, found 1");
}

#[test]
fn flexible_config_accepts_ragged_rows() {
    let config = ParserConfig::builder().flexible(true).build().unwrap();
    let rows = parse_rows("a,b\n1\n1,2,3", &config).unwrap();
    assert_eq!(rows, vec![row(&[("a", "1")]), row(&[("a", "1"), ("b", "2")])]);
}
