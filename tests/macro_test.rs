#![allow(missing_docs)]

use cellmap::{CellMapError, CellMapper, CellRecord, CellValue, FieldView, LeafKind, Row};

#[derive(Debug, Default, PartialEq, CellRecord)]
struct Telemetry {
    #[cell(tag = ",rowkey")]
    device: String,
    #[cell(tag = "m:temp")]
    temperature: f32,
    #[cell(tag = "m:note, omitempty")]
    note: Option<String>,
    // Untagged fields need no codec at all.
    history: Vec<(u64, f32)>,
    #[cell(tag = "-")]
    cache: std::collections::HashMap<String, String>,
}

#[test]
fn test_macro_lists_only_mapped_fields() {
    let record = Telemetry::default();
    let fields = record.fields();

    let names: Vec<_> = fields.iter().map(|f| f.name).collect();
    assert_eq!(names, ["device", "temperature", "note"]);

    let tags: Vec<_> = fields.iter().map(|f| f.tag).collect();
    assert_eq!(tags, [Some(",rowkey"), Some("m:temp"), Some("m:note, omitempty")]);

    match &fields[1].view {
        FieldView::Leaf(value) => assert_eq!(value.kind(), LeafKind::F32),
        FieldView::Nested(_) => panic!("temperature is a leaf"),
    }
    match &fields[2].view {
        FieldView::Leaf(value) => assert!(value.is_optional()),
        FieldView::Nested(_) => panic!("note is a leaf"),
    }
}

#[derive(Debug, Default, PartialEq, CellRecord)]
struct Gps {
    #[cell(tag = "g:lat")]
    lat: f64,
    #[cell(tag = "g:lon")]
    lon: f64,
}

#[derive(Debug, Default, PartialEq, CellRecord)]
struct Device<T: CellValue + Default> {
    #[cell(tag = ",rowkey")]
    id: String,
    #[cell(tag = "d:reading")]
    reading: T,
    #[cell(nested)]
    gps: Gps,
}

#[test]
fn test_macro_supports_generics_and_nesting() -> cellmap::Result<()> {
    let mut device = Device::<u16> {
        id: "d-1".into(),
        reading: 512,
        gps: Gps {
            lat: 35.68,
            lon: 139.76,
        },
    };

    let fields = device.fields_mut();
    assert_eq!(fields.len(), 3);
    drop(fields);

    let mapper = CellMapper::new();
    let mutation = mapper.encode_record("d", cellmap::Timestamp(1), &device)?;
    let row = Row::from_cells(mutation.into_cells("d-1"));

    let decoded: Device<u16> = mapper.read_row(&row)?;
    assert_eq!(decoded, device);

    device.reading = 0;
    mapper.decode_row(&row, &mut device)?;
    assert_eq!(device.reading, 512);
    Ok(())
}

#[derive(Debug, Default, CellRecord)]
struct StrictlyTagged {
    #[cell(tag = "just_a_qualifier")]
    value: u8,
}

#[test]
fn test_strict_mapper_rejects_bare_tags() {
    let row = Row::new("r");
    let strict = CellMapper::builder().strict_tags(true).build();

    let err = strict
        .decode_row(&row, &mut StrictlyTagged::default())
        .expect_err("strict mapper should reject the tag");
    assert_eq!(err.field(), Some("value"));
    assert!(matches!(err.root_cause(), CellMapError::MalformedTag { .. }));

    CellMapper::new()
        .decode_row(&row, &mut StrictlyTagged::default())
        .expect("permissive mapper tolerates the tag");
}

#[test]
fn test_options_load_from_json() {
    let options: cellmap::MapperOptions =
        serde_json::from_str(r##"{ "delimiter": "#" }"##).expect("valid options");
    assert_eq!(options.delimiter, '#');
    assert!(!options.strict_tags);

    let mapper = CellMapper::with_options(options);
    assert_eq!(mapper.options().delimiter, '#');
}
