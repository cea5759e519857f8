use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BannerError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        BannerError::stream_read("x")
            .to_string()
            .contains("stream read error:")
    );
    assert!(
        BannerError::archive("x")
            .to_string()
            .contains("archive error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BannerError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn render_carries_record_identity_and_cause() {
    let cause = BannerError::TemplateFetch {
        locator: "/templates/gcsegundafeed.png".to_string(),
        attempts: 5,
        cause: "connection refused".to_string(),
    };
    let err = BannerError::render("GC Vida", Variant::Story, cause);
    let msg = err.to_string();
    assert!(msg.contains("GC Vida"));
    assert!(msg.contains("story"));
    assert!(msg.contains("after 5 attempt(s)"));

    let BannerError::Render { cause, .. } = &err else {
        panic!("expected render error");
    };
    assert!(matches!(**cause, BannerError::TemplateFetch { .. }));
}

#[test]
fn render_does_not_nest() {
    let inner = BannerError::render("a", Variant::Feed, BannerError::validation("x"));
    let outer = BannerError::render("b", Variant::Story, inner);
    let BannerError::Render {
        record, variant, ..
    } = outer
    else {
        panic!("expected render error");
    };
    assert_eq!(record, "a");
    assert_eq!(variant, Variant::Feed);
}
