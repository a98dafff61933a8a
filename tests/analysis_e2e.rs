use ranksum_harness::{
    default_comparisons, read_matrix, run_analysis, run_comparison, Alternative, AnalysisConfig,
    Comparison, ComparisonStatus, Decision, GroupingRule, LoadOptions, RatingTable,
    DEFAULT_ALPHA,
};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn table_from_csv(csv: &str) -> RatingTable {
    RatingTable::from_matrix(read_matrix(csv.as_bytes(), LoadOptions::default()).unwrap())
}

fn a_vs_b() -> Comparison {
    Comparison::new(
        "a_vs_b",
        "Is A rated differently than B?",
        GroupingRule::Explicit {
            target: "A (2000)".into(),
            others: vec!["B (2001)".into()],
        },
        Alternative::TwoSided,
    )
}

#[test]
fn dominant_movie_scores_full_u() {
    let table = table_from_csv(
        "rater,A (2000),B (2001),C (2002)\n\
         r1,5,1,3\n\
         r2,5,1,3\n\
         r3,4,2,3\n\
         r4,4,2,3\n",
    );

    let strict = run_comparison(&table, &a_vs_b(), DEFAULT_ALPHA);
    let outcome = strict.status.outcome().expect("comparison should complete");
    assert_eq!(outcome.u_statistic(), 16.0);
    assert!(approx_eq(outcome.p_value(), 0.026518721959430752, 1e-12));
    // Four ratings per side cannot reach p < 0.005 under the normal approximation.
    assert_eq!(outcome.decision(), Decision::FailToReject);
    assert_eq!(outcome.verdict.sample_a.mean, 4.5);
    assert_eq!(outcome.verdict.sample_b.mean, 1.5);

    let loose = run_comparison(&table, &a_vs_b(), 0.05);
    assert_eq!(loose.status.outcome().unwrap().decision(), Decision::Reject);
}

#[test]
fn dominant_movie_rejects_with_more_raters() {
    let mut csv = String::from("rater,A (2000),B (2001),C (2002)\n");
    for i in 0..12 {
        let (a, b) = match i % 4 {
            0 | 1 => (5, 1),
            _ => (4, 2),
        };
        csv.push_str(&format!("r{i},{a},{b},3\n"));
    }
    let table = table_from_csv(&csv);

    let report = run_comparison(&table, &a_vs_b(), DEFAULT_ALPHA);
    let outcome = report.status.outcome().unwrap();
    assert_eq!(outcome.u_statistic(), 144.0);
    assert!(approx_eq(outcome.p_value(), 2.046705401496976e-5, 1e-15));
    assert_eq!(outcome.decision(), Decision::Reject);
    assert_eq!(report.conclusion.as_deref(), Some("Reject H0"));
}

#[test]
fn franchise_with_one_present_title_is_reported_as_skipped() {
    let table = table_from_csv(
        "rater,The Matrix (1999),Other (2005)\n\
         r1,5,2\n\
         r2,4,3\n",
    );
    let comparisons = vec![
        Comparison::new(
            "franchise_matrix",
            "Is the first Matrix film rated higher than its sequels?",
            GroupingRule::FranchiseFirstVsRest {
                titles: vec![
                    "The Matrix (1999)".into(),
                    "The Matrix Reloaded (2003)".into(),
                ],
            },
            Alternative::Greater,
        ),
        a_vs_b(),
    ];

    let reports = run_analysis(&table, &comparisons, DEFAULT_ALPHA);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].id, "franchise_matrix");
    assert!(reports[0].status.outcome().is_none());
    assert!(reports[0].conclusion.is_none());
    match &reports[0].status {
        ComparisonStatus::NotApplicable { category, .. } => assert_eq!(category, "config"),
        other => panic!("expected not applicable, got {other:?}"),
    }
    // The unknown target is a data problem, reported the same way.
    assert_eq!(reports[1].status.label(), "not_applicable");
}

#[test]
fn median_split_keeps_boundary_movies_in_upper_group() {
    // Counts 4, 3, 3, 2: even cardinality, median = 3.
    let table = table_from_csv(
        "rater,W (1990),X (1991),Y (1992),Z (1993)\n\
         r1,5,4,3,2\n\
         r2,4,3,2,1\n\
         r3,3,2,,\n\
         r4,2,,1,\n",
    );
    let cmp = Comparison::new(
        "popularity",
        "Do movies with higher popularity receive higher ratings?",
        GroupingRule::MedianCount,
        Alternative::Greater,
    );
    let report = run_comparison(&table, &cmp, DEFAULT_ALPHA);
    let outcome = report.status.outcome().unwrap();
    assert_eq!(outcome.partition.boundary, Some(3.0));
    assert_eq!(outcome.partition.group_a.entities, 3);
    assert_eq!(outcome.partition.group_b.entities, 1);
    assert_eq!(outcome.rank_sum.n1, 10);
    assert_eq!(outcome.rank_sum.n2, 2);
}

const SURVEY: &str = "\
rater,Shrek (2001),Finding Nemo (2003),The Incredibles (2004),The Matrix (1999),The Matrix Reloaded (2003),Star Wars: Episode IV - A New Hope (1977),Star Wars: Episode V - The Empire Strikes Back (1980),Gender identity (1 = male; 2 = female),Only child (1 = yes; 0 = no),Social viewer (1 = yes; 0 = no)
u1,4,3.5,4,5,2,5,4,1,1,1
u2,3,4,,4.5,,4,,2,0,1
u3,5,3,3.5,4,3,4.5,,1,0,0
u4,2.5,4,3,5,,3.5,3.5,2,1,0
u5,4,2,4.5,3.5,2.5,5,3,1,0,1
u6,3.5,3,2,4,1.5,4,,2,0,0
";

#[test]
fn default_comparisons_cover_survey_matrix() {
    let cfg = AnalysisConfig::default();
    let table = table_from_csv(SURVEY);
    assert_eq!(table.matrix().movie_columns().count(), 7);
    assert_eq!(table.matrix().attribute_columns().count(), 3);

    let reports = run_analysis(&table, &default_comparisons(&cfg), cfg.alpha);
    assert_eq!(reports.len(), 11);

    let status = |id: &str| {
        reports
            .iter()
            .find(|r| r.id == id)
            .unwrap_or_else(|| panic!("missing comparison {id}"))
            .status
            .label()
    };
    for id in [
        "popularity",
        "era",
        "target_vs_comparison",
        "gender",
        "only_child",
        "social_viewing",
        "franchise_star_wars",
        "franchise_matrix",
    ] {
        assert_eq!(status(id), "completed", "{id}");
    }
    for id in [
        "franchise_harry_potter",
        "franchise_indiana_jones",
        "franchise_jurassic_park",
    ] {
        assert_eq!(status(id), "not_applicable", "{id}");
    }

    let gender = reports.iter().find(|r| r.id == "gender").unwrap();
    let outcome = gender.status.outcome().unwrap();
    assert_eq!(
        outcome.partition.column.as_deref(),
        Some("Gender identity (1 = male; 2 = female)")
    );
    assert_eq!(outcome.partition.group_a.entities, 3);
    assert_eq!(outcome.rank_sum.n1 + outcome.rank_sum.n2, 36);

    let era = reports.iter().find(|r| r.id == "era").unwrap();
    assert_eq!(era.status.outcome().unwrap().partition.boundary, Some(2001.0));

    let target = reports.iter().find(|r| r.id == "target_vs_comparison").unwrap();
    let outcome = target.status.outcome().unwrap();
    assert_eq!(outcome.rank_sum.n1, 6);
    assert_eq!(outcome.rank_sum.n2, 11);
}
