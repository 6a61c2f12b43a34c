//! Integration tests for ConversionService against a real temp directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clubcodes::application::services::{ConversionService, Projection};
use clubcodes::application::ApplicationError;
use clubcodes::config::Settings;
use clubcodes::domain::{DomainError, Entity};
use clubcodes::infrastructure::traits::RealFileSystem;
use clubcodes::infrastructure::LineEnding;
use clubcodes::util::testing;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const DATE: &str = "2024-05-01";

const CODES_CSV: &str = "\
Location,Code,Title
Riga,10,Riga Club,
,Jurmala,1,Jurmala Branch
Tartu,20,Tartu Club,
";

#[fixture]
fn service() -> ConversionService {
    testing::init_test_setup();
    let settings = Settings {
        line_ending: LineEnding::Lf,
        ..Settings::default()
    };
    ConversionService::new(Arc::new(RealFileSystem), Arc::new(settings)).with_date_stamp(DATE)
}

#[fixture]
fn temp() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn expected_tree() -> Vec<Entity> {
    vec![
        Entity::new("Riga", "10", "Riga Club")
            .with_branches(vec![Entity::new("Jurmala", "1", "Jurmala Branch")]),
        Entity::new("Tartu", "20", "Tartu Club"),
    ]
}

#[rstest]
fn given_csv_file_when_convert_then_dated_json_next_to_input(service: ConversionService, temp: TempDir) {
    let input = write(temp.path(), "codes.csv", CODES_CSV);

    let output = service.convert_file(&input, None).unwrap();

    assert_eq!(output, temp.path().join("[2024-05-01] codes.json"));
    let written: Vec<Entity> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written, expected_tree());
}

#[rstest]
fn given_json_file_when_convert_then_indented_csv(service: ConversionService, temp: TempDir) {
    let json = serde_json::to_string(&expected_tree()).unwrap();
    let input = write(temp.path(), "codes.json", &json);

    let output = service.convert_file(&input, None).unwrap();

    assert_eq!(output, temp.path().join("codes.csv"));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Riga,10,Riga Club,\n,Jurmala,1,Jurmala Branch\nTartu,20,Tartu Club,\n"
    );
}

#[rstest]
fn given_out_dir_when_convert_then_output_created_there(service: ConversionService, temp: TempDir) {
    let input = write(temp.path(), "codes.csv", CODES_CSV);
    let out_dir = temp.path().join("out/nested");

    let output = service.convert_file(&input, Some(&out_dir)).unwrap();

    assert_eq!(output, out_dir.join("[2024-05-01] codes.json"));
    assert!(output.exists());
}

#[rstest]
fn given_header_only_csv_when_convert_then_empty_array(service: ConversionService) {
    let json = service.csv_to_json("Location,Code,Title\n").unwrap();
    assert_eq!(json, "[]");
}

#[rstest]
fn given_invalid_rows_when_convert_then_no_output_written(service: ConversionService, temp: TempDir) {
    let input = write(temp.path(), "broken.csv", ",Jurmala,1,Jurmala Branch\nRiga,10,Riga Club,\n");

    let err = service.convert_file(&input, None).unwrap_err();

    assert_eq!(err.domain(), Some(&DomainError::OrphanBranch { row: 0 }));
    assert!(!temp.path().join("[2024-05-01] broken.json").exists());
}

#[rstest]
fn given_mixed_batch_when_convert_all_then_failures_do_not_stop_batch(
    service: ConversionService,
    temp: TempDir,
) {
    let good = write(temp.path(), "good.csv", CODES_CSV);
    let bad = write(temp.path(), "bad.csv", "Riga,,Riga Club\n");
    let unsupported = write(temp.path(), "notes.txt", "hello");
    let json = write(
        temp.path(),
        "tree.json",
        &serde_json::to_string(&expected_tree()).unwrap(),
    );

    let outcomes = service.convert_all(&[good, bad, unsupported, json], None);

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes[0].result.is_ok());
    match &outcomes[1].result {
        Err(e) => {
            assert_eq!(e.domain().map(|d| d.kind()), Some("EmptyFieldError"));
            assert!(e.domain().and_then(|d| d.offending_value()).is_some());
        }
        Ok(p) => panic!("expected failure, wrote {}", p.display()),
    }
    assert!(matches!(
        outcomes[2].result,
        Err(ApplicationError::UnsupportedInput(_))
    ));
    assert!(outcomes[3].result.is_ok());
}

#[rstest]
fn given_object_document_when_decode_json_then_invalid_shape(service: ConversionService) {
    let err = service.decode_json(r#"{"code": "10"}"#).unwrap_err();
    assert!(matches!(
        err.domain(),
        Some(DomainError::InvalidShape { .. })
    ));
}

#[rstest]
fn given_indented_csv_when_flatten_then_composite_codes(service: ConversionService) {
    let flat = service.csv_to_flat_csv(CODES_CSV).unwrap();
    assert_eq!(
        flat,
        "Riga,10,Riga Club\nJurmala,10_1,Jurmala Branch\nTartu,20,Tartu Club\n"
    );
}

#[rstest]
#[case(Projection::Tree, "[2024-05-01] fan-partner-codes.json")]
#[case(Projection::Flat, "[2024-05-01] fan-partner-codes.csv")]
fn given_fetched_text_when_convert_fetched_then_named_after_output_name(
    service: ConversionService,
    temp: TempDir,
    #[case] projection: Projection,
    #[case] expected: &str,
) {
    let output = service
        .convert_fetched(CODES_CSV, projection, Some(temp.path()))
        .unwrap();

    assert_eq!(output, temp.path().join(expected));
    assert!(output.exists());
}

#[rstest]
fn given_compact_settings_when_to_json_then_single_line(temp: TempDir) {
    testing::init_test_setup();
    let settings = Settings {
        pretty: false,
        ..Settings::default()
    };
    let service = ConversionService::new(Arc::new(RealFileSystem), Arc::new(settings));
    let input = write(temp.path(), "codes.csv", CODES_CSV);
    let text = fs::read_to_string(input).unwrap();

    let json = service.csv_to_json(&text).unwrap();

    assert!(!json.contains('\n'));
    assert!(json.starts_with(r#"[{"location":"Riga","code":"10""#));
}
