//! Risk rating invariants

use knack_sleuth::{KnackAppExport, RiskLevel, RiskPolicy, Sleuth};

use crate::common::sample_document;

#[test]
fn test_likelihood_is_monotonic_in_count() {
    let policy = RiskPolicy::default();
    let levels: Vec<RiskLevel> = (0..40).map(|n| RiskLevel::from_count(n, &policy)).collect();

    assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(levels[0], RiskLevel::None);
    assert_eq!(levels[3], RiskLevel::Low);
    assert_eq!(levels[10], RiskLevel::Medium);
    assert_eq!(levels[11], RiskLevel::High);
}

#[test]
fn test_stricter_policy_never_lowers_risk() {
    let export = KnackAppExport::from_value(sample_document()).unwrap();
    let default = Sleuth::new(&export.application);
    let strict = Sleuth::with_policy(
        &export.application,
        RiskPolicy {
            low_max: 1,
            medium_max: 2,
            ..RiskPolicy::default()
        },
    );

    for obj in &export.application.objects {
        let keys = std::iter::once(obj.key.clone()).chain(obj.fields.iter().map(|f| f.key.clone()));
        for key in keys {
            let relaxed = default.analyze_impact(&key, None).unwrap();
            let tight = strict.analyze_impact(&key, None).unwrap();
            assert!(
                tight.risk_assessment.breaking_change_likelihood
                    >= relaxed.risk_assessment.breaking_change_likelihood,
                "{} got less risky under a stricter policy",
                key
            );
            assert_eq!(
                tight.risk_assessment.impact_score,
                relaxed.risk_assessment.impact_score
            );
        }
    }
}

#[test]
fn test_impact_totals_match_buckets() {
    let export = KnackAppExport::from_value(sample_document()).unwrap();
    let sleuth = Sleuth::new(&export.application);

    for obj in &export.application.objects {
        let report = sleuth.analyze_impact(&obj.key, None).unwrap();
        let direct = &report.direct_impacts;
        assert_eq!(
            report.metadata.total_direct_impacts,
            direct.connections.len() + direct.views.len() + direct.forms.len() + direct.formulas.len()
        );
        assert_eq!(
            report.metadata.total_cascade_impacts,
            report.cascade_impacts.affected_fields.len()
        );
        assert_eq!(
            report.risk_assessment.breaking_change_likelihood == RiskLevel::None,
            report.metadata.total_direct_impacts + report.metadata.total_cascade_impacts == 0
        );
    }
}
