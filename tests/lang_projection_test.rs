//! Integration tests for the multi-language projection.

use std::sync::Arc;

use clubcodes::application::services::ConversionService;
use clubcodes::config::Settings;
use clubcodes::domain::DomainError;
use clubcodes::infrastructure::traits::RealFileSystem;
use clubcodes::util::testing;
use rstest::{fixture, rstest};

const WIDE_CSV: &str = "\
code,en-location,en-title,lv-location,lv-title
10,Riga,Riga Club,Rīga,Rīgas klubs
10_1,Jurmala,Jurmala Branch,Jūrmala,Jūrmalas filiāle
20,Tartu,Tartu Club,Tartu,Tartu klubs
";

#[fixture]
fn service() -> ConversionService {
    testing::init_test_setup();
    ConversionService::new(Arc::new(RealFileSystem), Arc::new(Settings::default()))
}

#[rstest]
fn given_wide_sheet_when_projected_then_one_dictionary_per_language(service: ConversionService) {
    let projection = service.project_lang(WIDE_CSV).unwrap();

    assert_eq!(projection.keys().collect::<Vec<_>>(), vec!["en", "lv"]);
    let lv = &projection["lv"];
    assert_eq!(lv["10"].label, "Rīgas klubs");
    assert_eq!(lv["10"].branches["1"].location, "Jūrmala");
    assert_eq!(lv["10"].branches["1"].code, "1");
    assert!(lv["20"].branches.is_empty());
    assert_eq!(projection["en"]["10"].branches["1"].label, "Jurmala Branch");
}

#[rstest]
fn given_wide_sheet_when_csv_to_lang_json_then_branches_keyed_by_sub_code(service: ConversionService) {
    let json = service.csv_to_lang_json(WIDE_CSV).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["en"]["10"]["branches"]["1"]["label"], "Jurmala Branch");
    assert!(value["en"]["20"].get("branches").is_none());
}

#[rstest]
fn given_branch_before_parent_when_projected_then_orphan_branch(service: ConversionService) {
    let csv = "code,en-location,en-title\n10_1,Jurmala,Branch\n10,Riga,Club\n";

    let err = service.project_lang(csv).unwrap_err();

    assert_eq!(err.domain(), Some(&DomainError::OrphanBranch { row: 0 }));
}

#[rstest]
fn given_blank_title_when_projected_then_empty_field(service: ConversionService) {
    let csv = "code,en-location,en-title\n10,Riga,  \n";

    let err = service.project_lang(csv).unwrap_err();

    assert_eq!(err.domain().map(|d| d.kind()), Some("EmptyFieldError"));
}

#[rstest]
fn given_language_without_title_column_when_projected_then_malformed_header(
    service: ConversionService,
) {
    let csv = "code,en-location\n10,Riga\n";

    let err = service.project_lang(csv).unwrap_err();

    assert!(matches!(
        err.domain(),
        Some(DomainError::MalformedHeader { .. })
    ));
}
