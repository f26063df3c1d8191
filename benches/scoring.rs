use criterion::{black_box, criterion_group, criterion_main, Criterion};
use riskmap::aggregate::{aggregate_all, Weighting};
use riskmap::cli::CalcMode;
use riskmap::policy::vectorizer::TfidfVectorizer;
use riskmap::profile::{Answer, Profile, PROFILE_FIELDS};
use riskmap::scenario::generate_scenarios;
use riskmap::{Catalog, FineTuning};
use std::collections::BTreeSet;

const CATALOG: &str = include_str!("../data/risk_catalog.yaml");

fn exposed_profile() -> Profile {
    Profile::from_answers(PROFILE_FIELDS.iter().map(|f| (f.id, Answer::Number(1.0))))
}

fn bench_assessment(c: &mut Criterion) {
    let catalog = match Catalog::from_yaml_str(CATALOG) {
        Ok(catalog) => catalog,
        Err(e) => panic!("sample catalog must load: {}", e),
    };
    let profile = exposed_profile();
    let overrides = FineTuning::default();
    let completed = BTreeSet::new();

    c.bench_function("generate_scenarios", |b| {
        b.iter(|| generate_scenarios(black_box(&catalog), black_box(&profile), &overrides, &completed))
    });

    let scenarios = generate_scenarios(&catalog, &profile, &overrides, &completed).unwrap_or_default();
    c.bench_function("aggregate_all", |b| {
        b.iter(|| aggregate_all(black_box(&scenarios), CalcMode::Maximum, Weighting::default()))
    });
}

fn bench_vectorizer(c: &mut Criterion) {
    let pages: Vec<String> = (0..200)
        .map(|i| {
            format!(
                "Richtlinie {} Abschnitt {}: Backups, Firewall-Regeln und Multi-Faktor-Authentifizierung werden regelmäßig geprüft.",
                i % 17,
                i
            )
        })
        .collect();

    c.bench_function("tfidf_fit_200_pages", |b| {
        b.iter(|| {
            let mut vectorizer = TfidfVectorizer::default();
            vectorizer.fit_transform(black_box(&pages))
        })
    });

    let mut vectorizer = TfidfVectorizer::default();
    let matrix = vectorizer.fit_transform(&pages);
    c.bench_function("tfidf_query_200_pages", |b| {
        b.iter(|| {
            let query = vectorizer.transform(black_box("backup recovery offsite firewall"));
            matrix.similarities(&query)
        })
    });
}

criterion_group!(benches, bench_assessment, bench_vectorizer);
criterion_main!(benches);
