use maltego_transform::{Entity, Field, MatchingRule, ToXml, TransformError, Transformation};

#[test]
fn end_to_end_entity_with_field_and_edge_label() {
    let mut entity = Entity::new("T", "V").with_weight(1);
    entity.add_field(
        Field::new("F")
            .unwrap()
            .with_display_name("D")
            .with_value("X")
            .with_matching_rule(MatchingRule::Strict),
    );
    entity.add_edge_label("L", &[("K", "P")]).unwrap();

    assert_eq!(
        entity.to_xml().unwrap(),
        concat!(
            r#"<Entity Type="T"><Value>V</Value><Weight>1</Weight><AdditionalFields>"#,
            r#"<Field Name="F" DisplayName="D" MatchingRule="strict">X</Field>"#,
            r#"<Field Name="link#maltego.link.label" MatchingRule="loose">L</Field>"#,
            r#"<Field Name="link#maltego.link.show-label" MatchingRule="loose">1</Field>"#,
            r#"<Field Name="link#0" DisplayName="K" MatchingRule="loose">P</Field>"#,
            r#"</AdditionalFields></Entity>"#
        )
    );
}

#[test]
fn transform_from_args_to_response_and_back() {
    let mut transform = Transformation::from_args(["opt", "10.0.0.1", "port=443#proto=tcp"]).unwrap();
    assert_eq!(transform.entity_value(), Some("10.0.0.1"));
    assert_eq!(transform.optional_parameter(), Some("opt"));
    assert_eq!(transform.input_arguments()["port"], "443");

    let port = transform.input_arguments()["port"].clone();
    transform
        .add_entity("maltego.Service", format!("https/{}", port), 80)
        .add_additional_field("banner", Some("Banner"), Some("<html> & \"quotes\""), MatchingRule::Strict)
        .unwrap();
    transform.add_entity("maltego.IPv4Address", "10.0.0.1", 0);

    let encoded = transform.to_xml().unwrap();
    assert!(encoded.starts_with("<MaltegoMessage><MaltegoTransformResponseMessage><_entities><Entity"));
    assert!(encoded.ends_with("</_entities></MaltegoTransformResponseMessage></MaltegoMessage>"));

    let decoded = Transformation::from_xml(&encoded).unwrap();
    assert_eq!(decoded.entities().len(), 2);
    assert_eq!(decoded.entities()[0].value(), "https/443");
    assert_eq!(decoded.entities()[0].fields()[0].value(), Some("<html> & \"quotes\""));
    assert_eq!(decoded.entities()[1].entity_type(), "maltego.IPv4Address");
    assert_eq!(decoded.to_xml().unwrap(), encoded);
}

#[test]
fn decode_accepts_indented_documents() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<MaltegoMessage>
  <MaltegoTransformResponseMessage>
    <_entities>
      <Entity Type="maltego.Person">
        <Value>Ada &amp; Co</Value>
        <Weight>100</Weight>
        <AdditionalFields>
          <Field Name="role" DisplayName="Role" MatchingRule="Strict">engineer</Field>
        </AdditionalFields>
      </Entity>
    </_entities>
  </MaltegoTransformResponseMessage>
</MaltegoMessage>
"#;
    let transform = Transformation::from_xml(xml).unwrap();
    let entity = &transform.entities()[0];
    assert_eq!(entity.value(), "Ada & Co");
    assert_eq!(entity.weight(), 100);
    assert_eq!(entity.fields().len(), 1);
    assert_eq!(entity.fields()[0].matching_rule(), MatchingRule::Strict);

    assert_eq!(
        transform.to_xml().unwrap(),
        concat!(
            r#"<MaltegoMessage><MaltegoTransformResponseMessage><_entities>"#,
            r#"<Entity Type="maltego.Person"><Value>Ada &amp; Co</Value><Weight>100</Weight><AdditionalFields>"#,
            r#"<Field Name="role" DisplayName="Role" MatchingRule="strict">engineer</Field>"#,
            r#"</AdditionalFields></Entity></_entities></MaltegoTransformResponseMessage></MaltegoMessage>"#
        )
    );
}

#[test]
fn malformed_document_is_rejected() {
    let err = Transformation::from_xml("<MaltegoMessage><Entity></MaltegoMessage>").unwrap_err();
    assert!(matches!(err, TransformError::Structure(_)));
}

#[test]
fn deeply_nested_document_is_an_error_not_a_crash() {
    let depth = 200_000;
    let xml = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
    let err = Transformation::from_xml(&xml).unwrap_err();
    assert!(matches!(err, TransformError::Structure(_)));
}

#[test]
fn attribute_whitespace_survives_round_trip() {
    let mut transform = Transformation::from_args(["v"]).unwrap();
    transform
        .add_entity("T\nX", "v", 0)
        .add_additional_field("n", Some("a\tb's"), Some("x"), MatchingRule::Loose)
        .unwrap();

    let encoded = transform.to_xml().unwrap();
    assert!(encoded.contains(r#"<Entity Type="T&#xA;X">"#));
    assert!(encoded.contains(r#"DisplayName="a&#x9;b's""#));

    let decoded = Transformation::from_xml(&encoded).unwrap();
    assert_eq!(decoded.entities()[0].entity_type(), "T\nX");
    assert_eq!(decoded.entities()[0].fields()[0].display_name(), Some("a\tb's"));
    assert_eq!(decoded.to_xml().unwrap(), encoded);
}
