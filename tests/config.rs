use insta::assert_snapshot;
use rowbind::config::convert;
use rowbind::{
    parse_records, parse_rows, ConverterRegistry, Error, ParserConfig, ParserOptions, RecordDescriptor, TypeTag,
    Value, CSV, SSV, TSV,
};

#[test]
fn presets_share_quote_and_escape_defaults() {
    assert_eq!(CSV.separators(), &[',']);
    assert_eq!(SSV.separators(), &[';']);
    assert_eq!(TSV.separators(), &['\t']);
    for preset in [&CSV, &SSV, &TSV] {
        assert_eq!(preset.quotes(), &['"', '\'']);
        assert_eq!(preset.escape(), Some('\\'));
        assert!(!preset.ignore_unknown_columns());
        assert!(!preset.flexible());
        assert_eq!(preset.converters().len(), 9);
    }
}

#[test]
fn presets_are_shared_across_threads() {
    let text = "a\tb\n1\t2";
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| parse_rows(text, &TSV).unwrap())).collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(results[0][0]["b"], "2");
}

#[test]
fn builder_rejects_invalid_delimiters() {
    let err = ParserConfig::builder().separators(Vec::new()).build().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));

    let err = ParserConfig::builder().quotes([',']).build().unwrap_err();
    assert_snapshot!(err.to_string(), @"invalid parser configuration: ',' is configured as both separator and quote");

    let err = ParserConfig::builder().escape(Some('"')).build().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn builder_drops_repeated_delimiters_in_order() {
    let config = ParserConfig::builder()
        .separators([',', ';', ',', '\t', ';'])
        .quotes(['\'', '"', '\''])
        .build()
        .unwrap();
    assert_eq!(config.separators(), &[',', ';', '\t']);
    assert_eq!(config.quotes(), &['\'', '"']);
}

#[test]
fn to_builder_round_trips_settings() {
    let config = SSV.to_builder().ignore_unknown_columns(true).build().unwrap();
    let copy = config.to_builder().build().unwrap();
    assert_eq!(copy.options(), config.options());
    assert_eq!(copy.separators(), &[';']);
    assert!(copy.ignore_unknown_columns());
    assert!(!SSV.ignore_unknown_columns());
}

fn always_42(_: &str) -> Result<Value, rowbind::ConvertError> {
    Ok(Value::Integer(42))
}

#[test]
fn last_registration_for_a_tag_wins() {
    let registry = ConverterRegistry::builtin().register(TypeTag::Integer, always_42);
    assert_eq!(registry.len(), ConverterRegistry::builtin().len());

    let config = ParserConfig::builder().converters(registry).build().unwrap();
    let descriptor = RecordDescriptor::new().field("n", TypeTag::Integer);
    let records = parse_records("n\n7", &config, &descriptor).unwrap();
    assert_eq!(records[0].get("n"), Some(&Value::Integer(42)));

    let records = parse_records("n\n7", &CSV, &descriptor).unwrap();
    assert_eq!(records[0].get("n"), Some(&Value::Integer(7)));
}

#[test]
fn registering_copies_the_registry() {
    let tag = TypeTag::named("answer");
    let base = ConverterRegistry::empty();
    let extended = base.register(tag.clone(), always_42);

    assert!(base.is_empty());
    assert!(extended.contains(&tag));
    assert!(!ParserConfig::builder().build().unwrap().converters().contains(&tag));
    assert!(ParserConfig::builder().register(tag.clone(), always_42).build().unwrap().converters().contains(&tag));
}

#[test]
fn options_load_from_json() {
    let options: ParserOptions =
        serde_json::from_str(r#"{ "separators": [";"], "ignore_unknown_columns": true }"#).unwrap();
    let config = options.into_config().unwrap();
    assert_eq!(config.separators(), &[';']);
    assert_eq!(config.quotes(), CSV.quotes());
    assert_eq!(config.escape(), Some('\\'));
    assert!(config.ignore_unknown_columns());

    let options: ParserOptions = serde_json::from_str(r#"{ "escape": null, "quotes": [] }"#).unwrap();
    let config = options.into_config().unwrap();
    assert_eq!(config.escape(), None);
    assert!(config.quotes().is_empty());
    assert_eq!(parse_rows("a\n'x'", &config).unwrap()[0]["a"], "'x'");
}

#[test]
fn options_reject_unknown_keys() {
    assert!(serde_json::from_str::<ParserOptions>(r#"{ "delimiter": ";" }"#).is_err());
}

#[test]
fn default_options_describe_the_csv_preset() {
    assert_eq!(ParserOptions::default(), CSV.options());
    let json = serde_json::to_value(ParserOptions::default()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "separators": [","],
            "quotes": ["\"", "'"],
            "escape": "\\",
            "ignore_unknown_columns": false,
            "flexible": false
        })
    );
}

#[test]
fn builtin_converters_reject_malformed_values() {
    assert_snapshot!(convert::boolean("maybe").unwrap_err().to_string(), @"'maybe' is not a valid boolean value");
    assert_snapshot!(convert::time_offset("01:02").unwrap_err().to_string(), @"'01:02' has no UTC offset (expected 'Z' or '+HH:MM')");
    assert!(convert::date("2021-13-01").is_err());
    assert!(convert::time("25:00").is_err());
    assert!(convert::float("1,5").is_err());
    assert!(convert::integer("1.5").is_err());
    assert_eq!(convert::float("1e10").unwrap(), Value::Float(1e10));
    assert_eq!(convert::string(" kept ").unwrap(), Value::String(" kept ".into()));
}
