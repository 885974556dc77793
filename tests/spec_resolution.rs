//! Tile-component parameter resolution through the public API.

use jpegexp_quant::jpeg2000::spec::{
    ComponentTransform, EncoderOptions, EncoderSpecs, FilterKindSource, IndexSet,
    QuantizationType, SpecScope, SpecTable, SpecTag, WaveletFilter, parse_integer_spec,
    parse_string_spec,
};
use jpegexp_quant::{ConfigError, ContractViolation, Error};

const QTYPES: [&str; 3] = ["reversible", "derived", "expounded"];

#[test]
fn test_tile_component_override_beats_tile_default() {
    let mut table = SpecTable::new(3, 2, SpecScope::TileAndComponent);
    table.set_default("none");
    table.set_tile_default(1, "rct").unwrap();
    table.set_tile_component(1, 0, "ict").unwrap();

    assert_eq!(table.get(1, 0), Some(&"ict"));
    assert_eq!(table.get(1, 1), Some(&"rct"));
    assert_eq!(table.get(0, 0), table.default());
    assert_eq!(table.tag(1, 0), SpecTag::TileComponent);
    assert_eq!(table.tag(1, 1), SpecTag::TileDefault);
    assert_eq!(table.tag(2, 1), SpecTag::Default);
}

#[test]
fn test_partial_coverage_takes_fallback_default() {
    let table = parse_string_spec(
        "Qtype",
        2,
        2,
        SpecScope::TileAndComponent,
        Some("t0 c0-1 derived"),
        "expounded",
        &QTYPES,
    )
    .unwrap();

    assert_eq!(table.default().map(String::as_str), Some("expounded"));
    for c in 0..2 {
        assert_eq!(table.tag(0, c), SpecTag::TileComponent);
        assert_eq!(table.get(0, c).map(String::as_str), Some("derived"));
        assert_eq!(table.tag(1, c), SpecTag::Default);
        assert_eq!(table.get(1, c).map(String::as_str), Some("expounded"));
    }
}

#[test]
fn test_full_coverage_demotes_first_tile() {
    let table = parse_string_spec(
        "Qtype",
        2,
        3,
        SpecScope::TileAndComponent,
        Some("t0 derived t1 reversible"),
        "expounded",
        &QTYPES,
    )
    .unwrap();

    // Fallback never consulted; tile 0 became the global default.
    assert_eq!(table.default().map(String::as_str), Some("derived"));
    assert!(!table.is_tile_specified(0));
    assert!(table.is_tile_specified(1));
    for c in 0..3 {
        assert_eq!(table.tag(0, c), SpecTag::Default);
        assert_eq!(table.get(0, c).map(String::as_str), Some("derived"));
        assert_eq!(table.get(1, c).map(String::as_str), Some("reversible"));
    }
}

#[test]
fn test_option_language_example() {
    let table = parse_string_spec(
        "Qtype",
        10,
        3,
        SpecScope::TileAndComponent,
        Some("t0,3-4 c0-2 reversible t9 derived"),
        "expounded",
        &QTYPES,
    )
    .unwrap();

    for t in 0..10 {
        for c in 0..3 {
            let expected = match t {
                0 | 3 | 4 => "reversible",
                9 => "derived",
                _ => "expounded",
            };
            assert_eq!(table.get(t, c).map(String::as_str), Some(expected), "({t}, {c})");
        }
    }
    assert_eq!(table.tag(3, 1), SpecTag::TileComponent);
    assert_eq!(table.tag(9, 2), SpecTag::TileDefault);
    assert!(table.is_tile_component_specified(4, 2));
    assert!(!table.is_tile_component_specified(9, 0));
}

#[test]
fn test_values_are_case_insensitive() {
    let table = parse_string_spec(
        "Qtype",
        1,
        1,
        SpecScope::TileAndComponent,
        Some("DERIVED"),
        "expounded",
        &QTYPES,
    )
    .unwrap();
    assert_eq!(table.get(0, 0).map(String::as_str), Some("derived"));
}

#[test]
fn test_option_errors() {
    let cases: [(&str, SpecScope); 5] = [
        ("t5 3", SpecScope::TileAndComponent),
        ("t0-", SpecScope::TileAndComponent),
        ("c0 3", SpecScope::TileOnly),
        ("3 t1", SpecScope::TileAndComponent),
        ("t0 three", SpecScope::TileAndComponent),
    ];
    let errors: Vec<ConfigError> = cases
        .iter()
        .map(|&(text, scope)| parse_integer_spec("Wlev", 2, 2, scope, Some(text), "5").unwrap_err())
        .collect();

    assert!(matches!(errors[0], ConfigError::IndexOutOfRange { index: 5, max: 2, .. }));
    assert!(matches!(errors[1], ConfigError::MalformedIndexSet { .. }));
    assert!(matches!(errors[2], ConfigError::ScopeNotAllowed { .. }));
    assert!(matches!(errors[3], ConfigError::DanglingScope { .. }));
    assert!(matches!(errors[4], ConfigError::InvalidValue { .. }));

    assert!(matches!(
        parse_string_spec("Qtype", 1, 1, SpecScope::TileAndComponent, Some("fast"), "derived", &QTYPES),
        Err(ConfigError::DisallowedValue { .. })
    ));
    assert!(matches!(
        parse_string_spec("Qtype", 1, 1, SpecScope::TileAndComponent, None, "fast", &QTYPES),
        Err(ConfigError::DisallowedValue { .. })
    ));
}

#[test]
fn test_index_sets() {
    let set = IndexSet::parse("0,3-5,9", 10).unwrap();
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 3, 4, 5, 9]);
    assert!(IndexSet::parse("10", 10).is_err());
    assert!(IndexSet::parse("1,,2", 10).is_err());
    assert_eq!(IndexSet::parse("2,2-3,3", 4).unwrap().len(), 2);
}

#[test]
fn test_scope_violations_on_direct_setters() {
    let mut table: SpecTable<i32> = SpecTable::new(2, 2, SpecScope::TileOnly);
    assert!(matches!(
        table.set_component_default(0, 1),
        Err(ContractViolation::ScopeViolation { .. })
    ));
    assert!(matches!(
        table.set_tile_component(0, 0, 1),
        Err(ContractViolation::ScopeViolation { .. })
    ));
    assert!(table.set_tile_default(1, 1).is_ok());

    let mut table: SpecTable<i32> = SpecTable::new(2, 2, SpecScope::ComponentOnly);
    assert!(table.set_tile_default(0, 1).is_err());
    assert!(table.set_component_default(1, 1).is_ok());
}

#[test]
fn test_encoder_defaults() {
    let lossy = EncoderSpecs::from_options(2, 3, &EncoderOptions::default()).unwrap();
    assert!(lossy.quant_types.is_fully_non_reversible());
    assert_eq!(lossy.filters.filter(1, 2).unwrap(), WaveletFilter::W9x7);
    assert_eq!(lossy.component_transforms.get(0).unwrap(), ComponentTransform::Ict);
    assert_eq!(lossy.guard_bits.get(1, 1).unwrap(), 2);
    assert_eq!(lossy.quant_steps.get(0, 0).unwrap(), 0.0078125);
    assert_eq!(lossy.decomposition_levels.get(0, 0).unwrap(), 5);

    let lossless = EncoderSpecs::from_options(1, 3, &EncoderOptions::lossless()).unwrap();
    assert!(lossless.quant_types.is_fully_reversible());
    assert_eq!(lossless.filters.filter(0, 0).unwrap(), WaveletFilter::W5x3);
    assert_eq!(lossless.component_transforms.get(0).unwrap(), ComponentTransform::Rct);

    let gray = EncoderSpecs::from_options(1, 1, &EncoderOptions::default()).unwrap();
    assert_eq!(gray.component_transforms.get(0).unwrap(), ComponentTransform::None);
}

#[test]
fn test_filters_follow_quantization_type() {
    let options = EncoderOptions {
        quant_type: Some("t1 reversible".into()),
        ..EncoderOptions::default()
    };
    let specs = EncoderSpecs::from_options(2, 3, &options).unwrap();
    assert_eq!(specs.quant_types.get(1, 0).unwrap(), QuantizationType::Reversible);
    assert_eq!(specs.filters.filter(0, 0).unwrap(), WaveletFilter::W9x7);
    assert_eq!(specs.filters.filter(1, 2).unwrap(), WaveletFilter::W5x3);
    // Each tile's transform follows its filter bank.
    assert_eq!(specs.component_transforms.get(0).unwrap(), ComponentTransform::Ict);
    assert_eq!(specs.component_transforms.get(1).unwrap(), ComponentTransform::Rct);
}

#[test]
fn test_lossless_conflicts() {
    let options = EncoderOptions {
        quant_type: Some("derived".into()),
        ..EncoderOptions::lossless()
    };
    assert!(matches!(
        EncoderSpecs::from_options(1, 1, &options),
        Err(Error::Config(ConfigError::LosslessNotReversible { .. }))
    ));

    let options = EncoderOptions {
        filters: Some("c1 w9x7".into()),
        ..EncoderOptions::lossless()
    };
    assert!(matches!(
        EncoderSpecs::from_options(1, 3, &options),
        Err(Error::Config(ConfigError::IrreversibleFilter { component: 1, .. }))
    ));
}

#[test]
fn test_component_transform_with_mixed_filters() {
    let mixed = EncoderOptions {
        filters: Some("t0 c1 w5x3".into()),
        ..EncoderOptions::default()
    };

    // Implicit: the tile with disagreeing filters gets no transform.
    let specs = EncoderSpecs::from_options(2, 3, &mixed).unwrap();
    assert_eq!(specs.component_transforms.get(0).unwrap(), ComponentTransform::None);
    assert_eq!(specs.component_transforms.get(1).unwrap(), ComponentTransform::Ict);

    // Explicit: asking for a transform there is an error.
    let explicit = EncoderOptions {
        component_transform: Some("t0 on".into()),
        ..mixed.clone()
    };
    assert!(matches!(
        EncoderSpecs::from_options(2, 3, &explicit),
        Err(Error::Config(ConfigError::MixedFilters { tile: 0 }))
    ));

    let off = EncoderOptions {
        component_transform: Some("t1 off".into()),
        ..mixed
    };
    let specs = EncoderSpecs::from_options(2, 3, &off).unwrap();
    assert_eq!(specs.component_transforms.get(1).unwrap(), ComponentTransform::None);
}

#[test]
fn test_reversible_tile_with_mixed_leading_filters() {
    // Component 2 of tile 0 keeps the 9/7 filter of the lossy tile default.
    let options = EncoderOptions {
        quant_type: Some("t0 c0-1 reversible t1 reversible".into()),
        filters: Some("t0 c0-1 w5x3 t1 w5x3".into()),
        ..EncoderOptions::default()
    };
    let specs = EncoderSpecs::from_options(2, 3, &options).unwrap();
    assert_eq!(specs.filters.filter(0, 2).unwrap(), WaveletFilter::W9x7);
    assert_eq!(specs.component_transforms.get(0).unwrap(), ComponentTransform::None);
    assert_eq!(specs.component_transforms.get(1).unwrap(), ComponentTransform::Rct);

    let explicit = EncoderOptions {
        component_transform: Some("on".into()),
        ..options
    };
    assert!(matches!(
        EncoderSpecs::from_options(2, 3, &explicit),
        Err(Error::Config(ConfigError::MixedFilters { tile: 0 }))
    ));
}

#[test]
fn test_component_transform_needs_three_components() {
    let options = EncoderOptions {
        component_transform: Some("on".into()),
        ..EncoderOptions::default()
    };
    assert!(matches!(
        EncoderSpecs::from_options(1, 2, &options),
        Err(Error::Config(ConfigError::TooFewComponents { components: 2 }))
    ));
    assert!(matches!(
        EncoderSpecs::from_options(1, 3, &EncoderOptions {
            component_transform: Some("c0 on".into()),
            ..EncoderOptions::default()
        }),
        Err(Error::Config(ConfigError::ScopeNotAllowed { .. }))
    ));
}

#[test]
fn test_numeric_ranges() {
    for (options, expected) in [
        (
            EncoderOptions {
                guard_bits: Some("0".into()),
                ..EncoderOptions::default()
            },
            "guard",
        ),
        (
            EncoderOptions {
                quant_step: Some("t0 -0.5".into()),
                ..EncoderOptions::default()
            },
            "step",
        ),
        (
            EncoderOptions {
                decomposition_levels: Some("33".into()),
                ..EncoderOptions::default()
            },
            "levels",
        ),
    ] {
        let err = EncoderSpecs::from_options(1, 1, &options).unwrap_err();
        match expected {
            "levels" => assert!(
                matches!(err, Error::Config(ConfigError::OutOfRange { value: 33, .. })),
                "{err}"
            ),
            _ => assert!(
                matches!(err, Error::Config(ConfigError::NonPositive { .. })),
                "{expected}: {err}"
            ),
        }
    }

    let options = EncoderOptions {
        decomposition_levels: Some("3 t1 c0 7".into()),
        ..EncoderOptions::default()
    };
    let specs = EncoderSpecs::from_options(2, 2, &options).unwrap();
    assert_eq!(specs.decomposition_levels.max_levels(), 7);
    assert_eq!(specs.decomposition_levels.min_levels(), 3);
}
