use sortthread::Error;
use sortthread::config::NormalizerConfig;
use sortthread::threading::{SubjectNormalizer, normalize_subject};

const CASES: &[(&str, &str, bool)] = &[
    ("No Replacement", "No Replacement", false),
    (
        "Re: [ocf/puppet] Fix kerberos not booting up correctly [needs testing] (#781)",
        "[ocf/puppet] Fix kerberos not booting up correctly [needs testing] (#781)",
        true,
    ),
    ("Fwd: waifus", "waifus", true),
    ("Fwd: Re: ugh", "ugh", true),
    ("[FWD: simple [extraction]]", "simple [extraction]", true),
    (
        "Re: [fwd: Re: [OCF] Service update during PG&E outage]",
        "[OCF] Service update during PG&E outage",
        true,
    ),
];

#[test]
fn base_subject_examples() {
    for &(subject, expected, is_reply_or_forward) in CASES {
        let base = normalize_subject(subject);
        assert_eq!(base.subject, expected, "base subject of {subject:?}");
        assert_eq!(
            base.is_reply_or_forward, is_reply_or_forward,
            "reply/forward flag of {subject:?}"
        );
    }
}

#[test]
fn base_subject_is_a_fixed_point() {
    for &(subject, _, _) in CASES {
        let once = normalize_subject(subject);
        let twice = normalize_subject(&once.subject);
        assert_eq!(twice.subject, once.subject);
        assert!(!twice.is_reply_or_forward);
    }
}

#[test]
fn bounded_normalizer_agrees_with_unbounded() {
    let normalizer = SubjectNormalizer::new(NormalizerConfig::with_max_passes(64));
    for &(subject, _, _) in CASES {
        assert_eq!(normalizer.normalize(subject).unwrap(), normalize_subject(subject));
    }
}

#[test]
fn adversarial_nesting_terminates() {
    let depth = 200;
    let mut subject = "core".to_string();
    for level in 0..depth {
        subject = if level % 2 == 0 {
            format!("Re: [fwd: {subject}]")
        } else {
            format!("[tag] Fwd: {subject} (fwd)")
        };
    }

    let base = normalize_subject(&subject);
    assert_eq!(base.subject, "core");
    assert!(base.is_reply_or_forward);

    // Passes grow with nesting depth, so a small budget trips
    let tight = SubjectNormalizer::new(NormalizerConfig::with_max_passes(8));
    assert_eq!(
        tight.normalize(&subject),
        Err(Error::IterationLimit { passes: 8 })
    );
}
