use std::sync::Arc;

use company_cleaner::pipeline::processing::address::{AddressDecomposer, UnresolvedLookup};
use company_cleaner::pipeline::processing::merge::{
    resolve_consensus, resolve_full_disclosure, ColumnPolicies, RecordMerger,
};
use company_cleaner::pipeline::processing::reference::{ReferenceData, ReferenceTables};
use company_cleaner::types::CompanyRecord;

fn decomposer() -> AddressDecomposer {
    AddressDecomposer::new(Arc::new(ReferenceData::builtin().unwrap()))
}

#[test]
fn test_avenue_with_known_postal_code() {
    let c = decomposer().decompose("Av. Mayor 10, 28040 Aravaca");
    assert_eq!(c.street, "Avenida Mayor 10");
    assert_eq!(c.postal_code, "28040");
    assert_eq!(c.city, "Aravaca");
    assert_eq!(c.province, "Madrid");
    assert_eq!(c.country_name, "");
}

#[test]
fn test_trailing_country_is_removed_from_street() {
    let c = decomposer().decompose("Calle Falsa 1, España");
    assert_eq!(c.country_name, "España");
    assert_eq!(c.street, "Calle Falsa 1");
}

#[test]
fn test_substitute_reference_tables() {
    let tables: ReferenceTables = toml::from_str(
        r#"
        [[postal_codes]]
        postal_code = "1000"
        city = "Lisboa"
        province = "Lisboa"
        "#,
    )
    .expect("parses");
    assert!(ReferenceData::new(tables).is_err());

    let reference = ReferenceData::from_toml_str(
        r#"
        [[postal_codes]]
        postal_code = "41001"
        city = "Sevilla"
        province = "Sevilla"

        [[countries]]
        name_variant = "Spain"
        canonical_code = "ES"
        phone_prefix = "+34"
        "#,
    )
    .expect("valid tables");
    let d = AddressDecomposer::new(Arc::new(reference));
    let result = d.decompose_with_diagnostics("Calle Sol 2, 41001 Sevilla, Spain");
    assert_eq!(result.components.city, "Sevilla");
    assert_eq!(result.components.street, "Calle Sol 2");
    assert_eq!(result.components.country_code, "ES");
    assert!(result.unresolved.is_empty());
}

#[test]
fn test_no_postal_code_reports_diagnostic() {
    let result = decomposer().decompose_with_diagnostics("Plaza Mayor 1, Spain");
    assert_eq!(result.components.postal_code, "");
    assert_eq!(result.components.country_name, "Spain");
    assert_eq!(result.unresolved, vec![UnresolvedLookup::PostalCodeMissing]);
}

#[test]
fn test_mode_and_activity_merge_scenarios() {
    let merger = RecordMerger::new("id", "//", ColumnPolicies::default());
    let records = vec![
        CompanyRecord::from_pairs([("id", "7"), ("mode", "estimated")]),
        CompanyRecord::from_pairs([("id", "7"), ("mode", "estimated")]),
        CompanyRecord::from_pairs([("id", "8"), ("mode", "estimated")]),
        CompanyRecord::from_pairs([("id", "8"), ("mode", "real")]),
        CompanyRecord::from_pairs([("id", "9"), ("activity", "retail")]),
        CompanyRecord::from_pairs([("id", "9"), ("activity", "retail")]),
        CompanyRecord::from_pairs([("id", "9"), ("activity", "wholesale")]),
    ];

    let outcome = merger.merge_all(&records);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.records[0].get("mode"), "estimated");
    assert_eq!(outcome.records[1].get("mode"), "estimated//real");
    assert_eq!(outcome.records[2].get("activity"), "retail//wholesale");
    assert_eq!(outcome.conflicting_groups, 2);
}

#[test]
fn test_resolution_functions_directly() {
    assert_eq!(resolve_consensus(&[None, None], "//"), "");
    assert_eq!(resolve_consensus(&[Some("a"), None, Some("b"), Some("a")], "//"), "a//b");
    assert_eq!(resolve_full_disclosure(&[None, None], "//"), "");
    assert_eq!(resolve_full_disclosure(&[Some("1"), None, Some("1")], "//"), "1//1");
}
