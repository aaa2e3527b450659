// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8Path;
use goldenfile::Mint;
use pretty_assertions::assert_eq;
use std::io::Write;
use trx_playlist_convert::{
    convert::{ConvertOptions, Converter},
    errors::{ConvertError, ReadReportError, ResolveError},
    hierarchy::FailedTest,
    rules::{ProjectGrouping, TestProperties},
    serialize::SerializeOptions,
};
use trx_playlist_metadata::FailureListSummary;

static FIXTURES_DIR: &str = "tests/fixtures";

fn read_fixture(name: &str) -> String {
    let path = Utf8Path::new(FIXTURES_DIR).join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("reading {path} failed: {err}"))
}

fn convert_fixture(name: &str, options: ConvertOptions) -> Vec<u8> {
    let input = read_fixture(name);
    let conversion = Converter::new(options)
        .convert(&input, Some(Utf8Path::new(FIXTURES_DIR).join(name).as_path()))
        .unwrap_or_else(|err| panic!("converting {name} failed: {err:?}"));
    assert_eq!(
        conversion.suggested_file_name(),
        name.replace(".trx", ".playlist"),
    );
    conversion.bytes().to_vec()
}

#[test]
fn fixtures() {
    let mut mint = Mint::new(FIXTURES_DIR);

    for (report, playlist, options) in [
        (
            "single-failure.trx",
            "single-failure.playlist",
            ConvertOptions::default(),
        ),
        (
            "mixed-order.trx",
            "mixed-order.playlist",
            ConvertOptions::default(),
        ),
        (
            "multi-project.trx",
            "multi-project-per-project.playlist",
            ConvertOptions {
                grouping: ProjectGrouping::PerProject,
                serialize: SerializeOptions {
                    indent: 4,
                    xml_declaration: false,
                },
            },
        ),
    ] {
        let bytes = convert_fixture(report, options);
        let mut f = mint
            .new_goldenfile(playlist)
            .expect("creating new goldenfile succeeds");
        f.write_all(&bytes).expect("writing playlist succeeds");
    }
}

#[test]
fn failures_in_outcome_order() {
    let input = read_fixture("mixed-order.trx");
    let conversion = Converter::default()
        .convert(&input, None)
        .expect("conversion succeeds");

    assert_eq!(conversion.outcome_count(), 5, "inner results are not counted");
    assert_eq!(conversion.suggested_file_name(), "output.playlist");

    let failed: Vec<_> = conversion
        .failed_tests()
        .iter()
        .map(|test| (test.execution_id(), test.display_name()))
        .collect();
    assert_eq!(
        failed,
        vec![
            ("exec-c", "Login_Locked"),
            ("exec-a", "AddItem"),
            ("exec-d", "ApplyCoupon <Generic>"),
        ]
    );

    for test in conversion.failed_tests() {
        assert!(
            conversion.tree().selects(&TestProperties::of(test)),
            "{} is selected",
            test.fully_qualified_name()
        );
    }
}

#[test]
fn first_test_grouping_leaves_other_projects_unplaced() {
    let input = read_fixture("multi-project.trx");
    let conversion = Converter::default()
        .convert(&input, None)
        .expect("conversion succeeds");

    let tree = conversion.tree();
    assert_eq!(tree.unplaced_test_count(), 1);
    let unselected: Vec<_> = conversion
        .failed_tests()
        .iter()
        .filter(|test| !tree.selects(&TestProperties::of(test)))
        .map(FailedTest::fully_qualified_name)
        .collect();
    assert_eq!(unselected, vec!["Billing.Tests.InvoiceTests.Totals"]);
}

#[test]
fn every_data_row_is_selected() {
    let input = read_fixture("data-rows.trx");
    let conversion = Converter::default()
        .convert(&input, None)
        .expect("conversion succeeds");

    let failed: Vec<_> = conversion
        .failed_tests()
        .iter()
        .map(|test| (test.fully_qualified_name(), test.display_name()))
        .collect();
    assert_eq!(
        failed,
        vec![
            ("Acme.Tests.Calc.Add", "Add (1,2)"),
            ("Acme.Tests.Calc.Add", "Add (3,4)"),
            ("Acme.Tests.Calc.Subtract", "Subtract"),
        ]
    );

    let tree = conversion.tree();
    let paths = tree.selection_paths();
    assert_eq!(paths.len(), conversion.failed_tests().len());
    for test in conversion.failed_tests() {
        assert!(
            tree.selects(&TestProperties::of(test)),
            "{} is selected",
            test.display_name()
        );
    }

    // The passing row shares the method but not the display name.
    let passing = TestProperties {
        project: "Acme.Tests",
        namespace: "Acme.Tests",
        class: "Calc",
        fully_qualified_name: "Acme.Tests.Calc.Add",
        display_name: "Add (5,6)",
    };
    assert!(!tree.selects(&passing));
}

#[test]
fn list_failures_summary() {
    let input = read_fixture("single-failure.trx");
    let summary = Converter::default()
        .list_failures(&input)
        .expect("listing succeeds");

    assert_eq!(summary.outcome_count, 2);
    assert_eq!(summary.failed_tests.len(), 1);
    assert_eq!(summary.failed_tests[0].display_name, "Login_InvalidPassword");

    // The summary is what `list-failures --message-format json` prints.
    let json = serde_json::to_string(&summary).expect("summary serializes");
    assert!(json.contains(
        r#""fully-qualified-name":"Acme.Tests.LoginScenario.Login_InvalidPassword""#
    ));
    assert_eq!(
        FailureListSummary::parse_json(json).expect("summary parses"),
        summary
    );
}

#[test]
fn duplicate_execution_ids_abort() {
    let input = read_fixture("single-failure.trx")
        .replace(r#"<Execution id="e2" />"#, r#"<Execution id="e1" />"#);
    let err = Converter::default()
        .convert(&input, None)
        .expect_err("e1 is ambiguous");
    assert!(
        matches!(
            &err,
            ConvertError::Resolve(ResolveError::UnresolvedExecution {
                execution_id,
                match_count: 2,
            }) if execution_id == "e1"
        ),
        "unexpected error: {err:?}"
    );
}

#[test]
fn truncated_report_is_malformed() {
    let input = read_fixture("single-failure.trx");
    let truncated = &input[..input.len() / 2];
    let err = Converter::default()
        .convert(truncated, None)
        .expect_err("truncated report is malformed");
    match err {
        ConvertError::ReadReport(ReadReportError::Malformed(error)) => {
            assert!(error.offset() <= truncated.len());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
