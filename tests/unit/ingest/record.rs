use super::*;

fn fields() -> RecordFields {
    RecordFields {
        name: "  GC Vida ".to_string(),
        day: "Segunda-feira".to_string(),
        time: "20h".to_string(),
        neighborhood: "Centro".to_string(),
        address: "Rua das Flores, 123".to_string(),
        leaders: "Ana e João".to_string(),
        phone: "(11) 99999-0000".to_string(),
        group: String::new(),
    }
}

#[test]
fn valid_fields_are_trimmed() {
    let r = fields().into_record().unwrap();
    assert_eq!(r.name(), "GC Vida");
    assert_eq!(r.group(), None);
}

#[test]
fn blank_required_field_is_incomplete() {
    for blank in ["", "   ", "\t"] {
        let mut f = fields();
        f.phone = blank.to_string();
        assert_eq!(f.into_record().unwrap_err(), SkipReason::IncompleteData);
    }
}

#[test]
fn blank_group_means_no_group() {
    let mut f = fields();
    f.group = "   ".to_string();
    assert_eq!(f.into_record().unwrap().group(), None);

    let mut f = fields();
    f.group = " Ana Paula ".to_string();
    assert_eq!(f.into_record().unwrap().group(), Some("Ana Paula"));
}

#[test]
fn fallback_group_only_fills_missing_labels() {
    let r = fields().into_record().unwrap();
    assert_eq!(r.or_group(Some("Sem Supervisor")).group(), Some("Sem Supervisor"));

    let mut f = fields();
    f.group = "Carlos".to_string();
    let r = f.into_record().unwrap().or_group(Some("Sem Supervisor"));
    assert_eq!(r.group(), Some("Carlos"));
    assert_eq!(r.without_group().group(), None);
}

#[test]
fn try_from_fields_reports_validation_error() {
    let mut f = fields();
    f.address.clear();
    let err = Record::try_from_fields(f).unwrap_err();
    assert!(err.to_string().contains("incomplete data"));
}

#[test]
fn skip_reason_display() {
    assert_eq!(SkipReason::TemplateNotFound.to_string(), "template not found");
    assert_eq!(
        SkipReason::RenderFailed("boom".to_string()).to_string(),
        "render failed: boom"
    );
}
