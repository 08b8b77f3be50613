mod common;

use std::sync::Arc;
use std::thread;

use common::{Fixture, StaticFetcher};
use corpus_core::{
    Curation, CurationPolicy, IntentDeclaration, LoadFailurePolicy, MatchOutcome, ModelDeclaration, Rejection,
    SourceLoadErrorKind,
};
use corpus_observability::CorpusMetrics;
use corpus_registry::{merge, RegistryBuilder, RegistryCatalog, RegistryError, SampleRegistry};
use corpus_sources::{load_manifest, SampleResolver};
use corpus_validation::{AutoValidator, SampleLookupMatcher};

fn assistant_fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture.write(
        "resources/alarm_samples.txt",
        "# alarm samples\nset an alarm\n\n  wake me up at seven  \nset an alarm\n",
    );
    fixture.write(
        "weather.txt",
        "is it raining today\r\nweather forecast please\r\n#todo more\r\n",
    );
    fixture.write(
        "assistant.json",
        r#"{
            "model_id": "assistant",
            "intents": [
                {"intent_id": "alarm", "sources": [
                    {"kind": "inline", "samples": ["alarm for tomorrow morning", "set an alarm"]},
                    {"kind": "ref", "locator": "alarm_samples.txt"}
                ]},
                {"intent_id": "weather", "sources": [
                    {"kind": "file", "locator": "weather.txt"},
                    {"kind": "url", "locator": "https://samples.test/weather.txt"}
                ]},
                {"intent_id": "timer", "sources": [
                    {"kind": "ref", "locator": "timer_samples.txt"},
                    {"kind": "inline", "samples": ["start a timer"]}
                ]}
            ]
        }"#,
    );
    fixture
}

fn fetcher() -> StaticFetcher {
    StaticFetcher::default().with(
        "https://samples.test/weather.txt",
        "will it snow tonight\nweather forecast please\n",
    )
}

fn build(fixture: &Fixture, policy: LoadFailurePolicy) -> Result<SampleRegistry, RegistryError> {
    let model = load_manifest(fixture.root.join("assistant.json")).expect("manifest loads");
    let resolver = fixture.resolver(fetcher());
    SampleRegistry::build(&model, &resolver, policy)
}

#[test]
fn merges_sources_in_declaration_order() {
    let fixture = assistant_fixture();
    let registry = build(&fixture, LoadFailurePolicy::SkipSource).unwrap();

    assert_eq!(
        registry.get("alarm").to_strings(),
        vec![
            "alarm for tomorrow morning",
            "set an alarm",
            "wake me up at seven"
        ]
    );
    assert_eq!(
        registry.get("weather").to_strings(),
        vec![
            "is it raining today",
            "weather forecast please",
            "will it snow tonight"
        ]
    );
}

#[test]
fn missing_file_is_not_found_and_other_intents_still_build() {
    let fixture = assistant_fixture();
    let registry = build(&fixture, LoadFailurePolicy::SkipSource).unwrap();

    assert_eq!(registry.get("timer").to_strings(), vec!["start a timer"]);
    assert_eq!(registry.get("alarm").len(), 3);

    let failure = &registry.failures()[0];
    assert_eq!(failure.intent_id, "timer");
    assert_eq!(failure.locator, "timer_samples.txt");
    assert_eq!(failure.error_kind, SourceLoadErrorKind::NotFound);
}

#[test]
fn drop_intent_policy_empties_only_the_failing_intent() {
    let fixture = assistant_fixture();
    let registry = build(&fixture, LoadFailurePolicy::DropIntent).unwrap();

    assert!(registry.get("timer").is_empty());
    assert_eq!(registry.get("weather").len(), 3);
}

#[test]
fn fail_fast_aborts_with_the_same_load_error() {
    let fixture = assistant_fixture();
    match build(&fixture, LoadFailurePolicy::FailFast) {
        Err(RegistryError::SourceLoad { intent_id, source }) => {
            assert_eq!(intent_id, "timer");
            assert_eq!(source.kind(), SourceLoadErrorKind::NotFound);
            assert_eq!(source.locator(), "timer_samples.txt");
        }
        other => panic!("expected fail-fast source error, got {other:?}"),
    }
}

#[test]
fn missing_url_is_not_found() {
    let fixture = assistant_fixture();
    let resolver = fixture.resolver(StaticFetcher::default());
    let err = resolver
        .resolve(&corpus_core::SampleSource::Url {
            locator: "https://samples.test/none.txt".to_string(),
        })
        .unwrap_err();
    assert_eq!(err.kind(), SourceLoadErrorKind::NotFound);
}

#[test]
fn no_blank_or_comment_line_reaches_a_corpus() {
    let fixture = assistant_fixture();
    let registry = build(&fixture, LoadFailurePolicy::SkipSource).unwrap();

    for (_, corpus) in registry.iter() {
        for sample in corpus.iter() {
            assert!(!sample.trim().is_empty());
            assert!(!sample.trim_start().starts_with('#'));
            assert_eq!(sample, sample.trim());
        }
    }
}

#[test]
fn rebuilding_from_unchanged_sources_is_identical() {
    let fixture = assistant_fixture();
    let first = build(&fixture, LoadFailurePolicy::SkipSource).unwrap();
    let second = build(&fixture, LoadFailurePolicy::SkipSource).unwrap();

    assert_eq!(first.intents(), second.intents());
    for intent_id in first.intents() {
        assert_eq!(first.get(intent_id.as_str()), second.get(intent_id.as_str()));
    }
}

#[test]
fn alarm_example_merges_to_two_samples() {
    let corpus = merge([vec!["ok", "", "# comment", "ok", "  ok  ", "next"]]);
    assert_eq!(corpus.to_strings(), vec!["ok", "next"]);
}

#[test]
fn published_registry_serves_concurrent_readers() {
    let fixture = assistant_fixture();
    let model = load_manifest(fixture.root.join("assistant.json")).unwrap();
    let resolver = fixture.resolver(fetcher());
    let catalog = RegistryCatalog::new();
    catalog
        .deploy(&model, &RegistryBuilder::new(&resolver))
        .unwrap();

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let registry = catalog.get("assistant").expect("published");
                assert_eq!(registry.get("alarm").len(), 3);
                assert_eq!(registry.get("weather").len(), 3);
            });
        }
    });
}

#[test]
fn curation_caught_as_rejection_keeps_message_and_tag() {
    let callback = |input: &str| -> MatchOutcome {
        if input.contains("7") {
            Curation::new("please confirm time format").into()
        } else {
            Rejection::new("no intent fits").into()
        }
    };

    let err: Rejection = callback("wake me at 7").into_result().unwrap_err();
    assert_eq!(err.message(), "please confirm time format");
    assert!(err.is_curation());

    let plain = callback("sing a song").into_result().unwrap_err();
    assert!(!plain.is_curation());
    assert!(Curation::try_from(plain).is_err());
}

#[test]
fn lookup_matcher_flags_samples_shared_across_intents() {
    let model = ModelDeclaration::new("clock")
        .intent(IntentDeclaration::new("alarm").samples([
            "set an alarm",
            "wake me up at seven",
            "cancel",
        ]))
        .intent(IntentDeclaration::new("timer").samples([
            "start a timer",
            "Cancel",
        ]));

    let fixture = Fixture::new();
    let resolver = fixture.resolver(StaticFetcher::default());
    let metrics = CorpusMetrics::shared();
    let registry = RegistryBuilder::new(&resolver)
        .metrics(metrics.clone())
        .build(&model)
        .unwrap();

    let matcher = SampleLookupMatcher::from_registry(&registry);
    let validator = AutoValidator::new(Arc::new(matcher)).with_metrics(metrics.clone());
    let report = validator.validate(&registry);

    assert_eq!(report.total(), 5);
    assert_eq!(report.passed_count(), 3);
    assert_eq!(report.curation_count(), 2);
    assert!(report.passed());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.samples_loaded_total, 5);
    assert_eq!(snapshot.validation_passed_total, 3);

    let strict = validator
        .with_curation_policy(CurationPolicy::Fail)
        .validate(&registry);
    assert_eq!(strict.failed_count(), 2);
}

#[test]
fn fail_fast_reports_missing_classpath_prefixed_locator_as_not_found() {
    let model = ModelDeclaration::new("clock")
        .intent(IntentDeclaration::new("alarm").sample_ref("classpath:/alarm/missing.txt"));

    let fixture = Fixture::new();
    let resolver = fixture.resolver(StaticFetcher::default());
    match SampleRegistry::build(&model, &resolver, LoadFailurePolicy::FailFast) {
        Err(RegistryError::SourceLoad { source, .. }) => {
            assert_eq!(source.kind(), SourceLoadErrorKind::NotFound);
            assert_eq!(source.locator(), "classpath:/alarm/missing.txt");
        }
        other => panic!("expected not-found source error, got {other:?}"),
    }
}
