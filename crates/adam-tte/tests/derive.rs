//! End-to-end derivation tests over small in-memory studies.

use chrono::NaiveDate;

use adam_model::{
    CensorAttributes, Condition, EventAttributes, ParameterAttributes, SourceDefinition,
    SourceKind, Table, TteError, Value,
};
use adam_tte::{
    DeriveOptions, ParameterSpec, SourceTables, build_adtte, derive_param_tte, derive_parameters,
};

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn text(value: &str) -> Value {
    Value::text(value)
}

fn adsl() -> Table {
    Table::from_rows(
        "ADSL",
        ["STUDYID", "USUBJID", "TRTSDT", "DTHDT", "LSTALVDT", "ARM"],
        vec![
            vec![
                text("CDISC01"),
                text("01-701-1015"),
                date(2014, 1, 2),
                Value::Missing,
                date(2014, 7, 2),
                text("Placebo"),
            ],
            vec![
                text("CDISC01"),
                text("01-701-1023"),
                date(2012, 8, 5),
                date(2012, 9, 2),
                date(2012, 9, 2),
                text("Xanomeline High Dose"),
            ],
            vec![
                text("CDISC01"),
                text("01-701-1028"),
                date(2013, 7, 19),
                Value::Missing,
                Value::Missing,
                text("Xanomeline Low Dose"),
            ],
        ],
    )
    .unwrap()
}

fn adrs() -> Table {
    Table::from_rows(
        "ADRS",
        ["USUBJID", "PARAMCD", "AVALC", "ADT", "RSSEQ"],
        vec![
            vec![
                text("01-701-1015"),
                text("OVR"),
                text("PD"),
                date(2014, 5, 20),
                Value::Integer(4),
            ],
            vec![
                text("01-701-1015"),
                text("OVR"),
                text("SD"),
                date(2014, 3, 1),
                Value::Integer(2),
            ],
            vec![
                text("01-701-1023"),
                text("OVR"),
                text("PD"),
                date(2012, 9, 2),
                Value::Integer(3),
            ],
        ],
    )
    .unwrap()
}

fn death() -> SourceDefinition {
    SourceDefinition::event(
        "ADSL",
        "DTHDT",
        EventAttributes {
            event_description: "DEATH".to_string(),
            source_domain: "ADSL".to_string(),
            source_variable: "DTHDT".to_string(),
        },
    )
}

fn progression() -> SourceDefinition {
    SourceDefinition::event(
        "ADRS",
        "ADT",
        EventAttributes {
            event_description: "DISEASE PROGRESSION".to_string(),
            source_domain: "ADRS".to_string(),
            source_variable: "ADT".to_string(),
        },
    )
    .with_condition(Condition::and([
        Condition::eq("PARAMCD", "OVR"),
        Condition::eq("AVALC", "PD"),
    ]))
    .with_sequence_field("RSSEQ")
}

fn last_alive() -> SourceDefinition {
    SourceDefinition::censor(
        "ADSL",
        "LSTALVDT",
        CensorAttributes {
            event_description: "LAST KNOWN ALIVE DATE".to_string(),
            source_domain: "ADSL".to_string(),
            source_variable: "LSTALVDT".to_string(),
            censor_description: Some("ALIVE".to_string()),
        },
    )
}

fn overall_survival() -> ParameterSpec {
    ParameterSpec::new(
        ParameterAttributes::new("OS", "Overall Survival"),
        "TRTSDT",
        vec![death()],
        vec![last_alive()],
    )
}

fn progression_free_survival() -> ParameterSpec {
    ParameterSpec::new(
        ParameterAttributes::new("PFS", "Progression-Free Survival"),
        "TRTSDT",
        vec![progression(), death()],
        vec![last_alive()],
    )
}

#[test]
fn subjects_without_candidates_are_dropped() {
    let adsl = adsl();
    let tables = SourceTables::new().with(&adsl);
    let records =
        derive_param_tte(&adsl, &overall_survival(), &tables, &DeriveOptions::default()).unwrap();

    let subjects: Vec<String> = records.iter().map(|r| r.subject_id.to_string()).collect();
    assert_eq!(subjects, ["01-701-1015", "01-701-1023"]);
}

#[test]
fn censored_subject_takes_last_alive_date() {
    let adsl = adsl();
    let tables = SourceTables::new().with(&adsl);
    let records =
        derive_param_tte(&adsl, &overall_survival(), &tables, &DeriveOptions::default()).unwrap();

    let censored = &records[0];
    assert_eq!(censored.kind, SourceKind::Censor);
    assert_eq!(censored.censor_flag(), 1);
    assert_eq!(Value::Date(censored.date), date(2014, 7, 2));
    assert_eq!(censored.event_description, "LAST KNOWN ALIVE DATE");
    assert_eq!(censored.censor_description.as_deref(), Some("ALIVE"));
    assert_eq!(censored.start_date, date(2014, 1, 2));
}

#[test]
fn event_listed_first_wins_a_tie_with_censoring() {
    let adsl = adsl();
    let tables = SourceTables::new().with(&adsl);
    let records =
        derive_param_tte(&adsl, &overall_survival(), &tables, &DeriveOptions::default()).unwrap();

    let died = &records[1];
    assert_eq!(died.kind, SourceKind::Event);
    assert_eq!(died.event_description, "DEATH");
    assert_eq!(died.censor_description, None);
}

#[test]
fn source_order_decides_ties_between_events() {
    let adsl = adsl();
    let adrs = adrs();
    let tables = SourceTables::new().with(&adsl).with(&adrs);

    let progression_first = derive_param_tte(
        &adsl,
        &progression_free_survival(),
        &tables,
        &DeriveOptions::default(),
    )
    .unwrap();
    assert_eq!(progression_first[1].event_description, "DISEASE PROGRESSION");
    assert_eq!(progression_first[1].source_seq, Some(3));

    let death_first = ParameterSpec::new(
        ParameterAttributes::new("PFS", "Progression-Free Survival"),
        "TRTSDT",
        vec![death(), progression()],
        vec![last_alive()],
    );
    let reversed =
        derive_param_tte(&adsl, &death_first, &tables, &DeriveOptions::default()).unwrap();
    assert_eq!(reversed[1].event_description, "DEATH");
    assert_eq!(reversed[1].source_seq, None);
}

#[test]
fn filtered_rows_never_become_candidates() {
    let adsl = adsl();
    let adrs = adrs();
    let tables = SourceTables::new().with(&adsl).with(&adrs);
    let records = derive_param_tte(
        &adsl,
        &progression_free_survival(),
        &tables,
        &DeriveOptions::default(),
    )
    .unwrap();

    // The earlier SD response is filtered out; PD on 2014-05-20 beats censoring.
    let first = &records[0];
    assert_eq!(first.kind, SourceKind::Event);
    assert_eq!(Value::Date(first.date), date(2014, 5, 20));
    assert_eq!(first.source_domain, "ADRS");
    assert_eq!(first.source_seq, Some(4));
}

#[test]
fn parallel_matches_sequential() {
    let adsl = adsl();
    let adrs = adrs();
    let tables = SourceTables::new().with(&adsl).with(&adrs);
    let specs = [overall_survival(), progression_free_survival()];

    let sequential = derive_parameters(&adsl, &specs, &tables, &DeriveOptions::default()).unwrap();
    let parallel = derive_parameters(
        &adsl,
        &specs,
        &tables,
        &DeriveOptions::default().with_parallel(true),
    )
    .unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn predicate_failure_is_a_filter_error() {
    let adsl = adsl();
    let adrs = adrs();
    let tables = SourceTables::new().with(&adsl).with(&adrs);
    let broken = ParameterSpec::new(
        ParameterAttributes::new("PFS", "Progression-Free Survival"),
        "TRTSDT",
        vec![progression().with_condition(Condition::eq("AVALCX", "PD"))],
        vec![],
    );

    let err = derive_param_tte(&adsl, &broken, &tables, &DeriveOptions::default()).unwrap_err();
    match err {
        TteError::FilterEvaluation { table, subject, .. } => {
            assert_eq!(table, "ADRS");
            assert_eq!(subject, "01-701-1015");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn closure_predicate_errors_propagate() {
    let adsl = adsl();
    let tables = SourceTables::new().with(&adsl);
    let spec = ParameterSpec::new(
        ParameterAttributes::new("OS", "Overall Survival"),
        "TRTSDT",
        vec![death().with_predicate(|_| Err("boom".to_string()))],
        vec![],
    );
    let err = derive_param_tte(&adsl, &spec, &tables, &DeriveOptions::default()).unwrap_err();
    assert!(matches!(err, TteError::FilterEvaluation { message, .. } if message == "boom"));
}

#[test]
fn unknown_source_table_is_malformed() {
    let adsl = adsl();
    let tables = SourceTables::new().with(&adsl);
    let err = derive_param_tte(
        &adsl,
        &progression_free_survival(),
        &tables,
        &DeriveOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TteError::MalformedInput(message) if message.contains("ADRS")));
}

#[test]
fn unknown_date_column_is_malformed() {
    let adsl = adsl();
    let tables = SourceTables::new().with(&adsl);
    let spec = ParameterSpec::new(
        ParameterAttributes::new("OS", "Overall Survival"),
        "TRTSDT",
        vec![SourceDefinition::event(
            "ADSL",
            "DTHADT",
            EventAttributes {
                event_description: "DEATH".to_string(),
                source_domain: "ADSL".to_string(),
                source_variable: "DTHADT".to_string(),
            },
        )],
        vec![],
    );
    let err = derive_param_tte(&adsl, &spec, &tables, &DeriveOptions::default()).unwrap_err();
    assert!(matches!(err, TteError::MalformedInput(_)));
}

#[test]
fn build_adtte_numbers_and_merges() {
    let adsl = adsl();
    let adrs = adrs();
    let tables = SourceTables::new().with(&adsl).with(&adrs);
    let specs = [progression_free_survival(), overall_survival()];

    let result = build_adtte(&adsl, &specs, &tables, &DeriveOptions::default()).unwrap();
    let adtte = &result.table;

    assert_eq!(adtte.name(), "ADTTE");
    assert_eq!(adtte.height(), 4);
    // Sorted by subject, then PARAMCD: OS before PFS.
    assert_eq!(adtte.value(0, "USUBJID"), Some(&text("01-701-1015")));
    assert_eq!(adtte.value(0, "PARAMCD"), Some(&text("OS")));
    assert_eq!(adtte.value(0, "ASEQ"), Some(&Value::Integer(1)));
    assert_eq!(adtte.value(1, "PARAMCD"), Some(&text("PFS")));
    assert_eq!(adtte.value(1, "ASEQ"), Some(&Value::Integer(2)));
    assert_eq!(adtte.value(2, "USUBJID"), Some(&text("01-701-1023")));
    assert_eq!(adtte.value(2, "ASEQ"), Some(&Value::Integer(1)));

    assert_eq!(adtte.value(0, "AVAL"), Some(&Value::Integer(181)));
    assert_eq!(adtte.value(0, "AVALU"), Some(&text("DAYS")));
    assert_eq!(adtte.value(2, "AVAL"), Some(&Value::Integer(28)));
    assert_eq!(adtte.value(3, "ARM"), Some(&text("Xanomeline High Dose")));
    assert!(adtte.has_column("DTHDT"));

    let summary: Vec<(&str, usize, usize, usize)> = result
        .summaries
        .iter()
        .map(|s| (s.paramcd.as_str(), s.records, s.events, s.censored))
        .collect();
    assert_eq!(summary, [("PFS", 2, 2, 0), ("OS", 2, 1, 1)]);
}

#[test]
fn text_start_date_is_malformed() {
    let subjects = Table::from_rows(
        "ADSL",
        ["STUDYID", "USUBJID", "TRTSDT", "DTHDT"],
        vec![vec![
            text("CDISC01"),
            text("S1"),
            text("2014-01-02"),
            date(2014, 2, 1),
        ]],
    )
    .unwrap();
    let tables = SourceTables::new().with(&subjects);
    let spec = ParameterSpec::new(
        ParameterAttributes::new("OS", "Overall Survival"),
        "TRTSDT",
        vec![death()],
        vec![],
    );
    let err =
        derive_param_tte(&subjects, &spec, &tables, &DeriveOptions::default()).unwrap_err();
    assert!(matches!(err, TteError::MalformedInput(_)));
}
