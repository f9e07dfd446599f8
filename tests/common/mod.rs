use octofhir_fhirgen::*;

pub const GENDER_VS: &str = "http://hl7.org/fhir/ValueSet/administrative-gender";
pub const OBSERVATION_STATUS_VS: &str = "http://hl7.org/fhir/ValueSet/observation-status";
pub const MIMETYPES_VS: &str = "http://hl7.org/fhir/ValueSet/mimetypes";

#[allow(dead_code)]
pub fn sd(name: &str) -> String {
    format!("http://hl7.org/fhir/StructureDefinition/{name}")
}

#[allow(dead_code)]
pub fn create_test_element(path: &str, type_code: &str) -> ElementDefinition {
    ElementDefinition::new(path)
        .with_type(type_code)
        .with_cardinality(0, "1")
}

#[allow(dead_code)]
pub fn create_coded_element(path: &str, value_set: &str) -> ElementDefinition {
    ElementDefinition::new(path)
        .with_type("code")
        .with_cardinality(0, "1")
        .with_binding(BindingStrength::Required, format!("{value_set}|4.0.1"))
}

#[allow(dead_code)]
pub fn create_gender_value_set() -> ValueSet {
    let system = "http://hl7.org/fhir/administrative-gender";
    ValueSet::new(GENDER_VS, "AdministrativeGender")
        .with_code(ValueSetCode::new(system, "male").with_display("Male"))
        .with_code(ValueSetCode::new(system, "female").with_display("Female"))
        .with_code(ValueSetCode::new(system, "other").with_display("Other"))
        .with_code(ValueSetCode::new(system, "unknown").with_display("Unknown"))
}

#[allow(dead_code)]
pub fn create_observation_status_value_set() -> ValueSet {
    let system = "http://hl7.org/fhir/observation-status";
    ValueSet::new(OBSERVATION_STATUS_VS, "ObservationStatus")
        .with_code(ValueSetCode::new(system, "registered").with_display("Registered"))
        .with_code(ValueSetCode::new(system, "final").with_display("Final"))
        .with_code(ValueSetCode::new(system, "entered-in-error").with_display("Entered in Error"))
}

/// The abstract roots every fixture graph needs.
#[allow(dead_code)]
pub fn create_base_nodes() -> Vec<SchemaNode> {
    vec![
        SchemaNode::primitive("boolean")
            .with_element(create_test_element("boolean.value", "http://hl7.org/fhirpath/System.Boolean")),
        SchemaNode::primitive("string")
            .with_element(create_test_element("string.value", "http://hl7.org/fhirpath/System.String")),
        SchemaNode::complex_type("Element")
            .as_abstract()
            .with_element(create_test_element("Element.id", "http://hl7.org/fhirpath/System.String")),
        SchemaNode::complex_type("BackboneElement")
            .as_abstract()
            .with_base(sd("Element")),
        SchemaNode::resource("Resource")
            .as_abstract()
            .with_element(create_test_element("Resource.id", "id")),
        SchemaNode::resource("DomainResource")
            .as_abstract()
            .with_base(sd("Resource")),
    ]
}

#[allow(dead_code)]
pub fn create_datatypes() -> Vec<SchemaNode> {
    vec![
        SchemaNode::complex_type("HumanName")
            .with_base(sd("Element"))
            .with_element(create_test_element("HumanName.family", "string"))
            .with_element(create_test_element("HumanName.given", "string").with_cardinality(0, "*")),
        SchemaNode::complex_type("CodeableConcept")
            .with_base(sd("Element"))
            .with_element(create_test_element("CodeableConcept.text", "string")),
        SchemaNode::complex_type("Quantity")
            .with_base(sd("Element"))
            .with_element(create_test_element("Quantity.value", "decimal")),
        SchemaNode::complex_type("Period")
            .with_base(sd("Element"))
            .with_element(create_test_element("Period.start", "dateTime")),
        SchemaNode::complex_type("Reference")
            .with_base(sd("Element"))
            .with_element(create_test_element("Reference.reference", "string")),
        SchemaNode::complex_type("Attachment")
            .with_base(sd("Element"))
            .with_element(create_coded_element("Attachment.contentType", MIMETYPES_VS)),
    ]
}

#[allow(dead_code)]
pub fn create_patient() -> SchemaNode {
    SchemaNode::resource("Patient")
        .with_base(sd("DomainResource"))
        .with_element(create_test_element("Patient.id", "id").inherited())
        .with_element(create_test_element("Patient.active", "boolean").with_order(1))
        .with_element(
            create_test_element("Patient.name", "HumanName")
                .with_cardinality(0, "*")
                .with_order(2),
        )
        .with_element(create_coded_element("Patient.gender", GENDER_VS).with_order(3))
        .with_element(
            ElementDefinition::new("Patient.deceased[x]")
                .with_type("boolean")
                .with_type("dateTime")
                .with_order(4),
        )
        .with_element(
            create_test_element("Patient.contact", "BackboneElement")
                .with_cardinality(0, "*")
                .with_order(5),
        )
        .with_element(
            ElementDefinition::new("Patient.managingOrganization")
                .with_type_option(
                    ElementTypeOption::new("Reference").with_target_profile(sd("Organization")),
                )
                .with_order(6),
        )
        .with_nested(
            SchemaNode::backbone("Patient.contact")
                .with_element(
                    create_test_element("Patient.contact.relationship", "CodeableConcept")
                        .with_cardinality(0, "*"),
                )
                .with_element(create_test_element("Patient.contact.name", "HumanName"))
                .with_element(create_coded_element("Patient.contact.gender", GENDER_VS)),
        )
}

#[allow(dead_code)]
pub fn create_person() -> SchemaNode {
    SchemaNode::resource("Person")
        .with_base(sd("DomainResource"))
        .with_element(create_test_element("Person.name", "HumanName").with_cardinality(0, "*"))
        .with_element(create_coded_element("Person.gender", GENDER_VS))
}

#[allow(dead_code)]
pub fn create_organization() -> SchemaNode {
    SchemaNode::resource("Organization")
        .with_base(sd("DomainResource"))
        .with_element(create_test_element("Organization.name", "string"))
}

#[allow(dead_code)]
pub fn create_observation() -> SchemaNode {
    SchemaNode::resource("Observation")
        .with_base(sd("DomainResource"))
        .with_element(
            create_coded_element("Observation.status", OBSERVATION_STATUS_VS).with_cardinality(1, "1"),
        )
        .with_element(create_test_element("Observation.code", "CodeableConcept").with_cardinality(1, "1"))
        .with_element(
            ElementDefinition::new("Observation.value[x]")
                .with_type("Quantity")
                .with_type("string")
                .with_type("boolean"),
        )
        .with_element(
            create_test_element("Observation.component", "BackboneElement").with_cardinality(0, "*"),
        )
        .with_nested(
            SchemaNode::backbone("Observation.component")
                .with_element(
                    create_test_element("Observation.component.code", "CodeableConcept")
                        .with_cardinality(1, "1"),
                )
                .with_element(
                    ElementDefinition::new("Observation.component.value[x]")
                        .with_type("Quantity")
                        .with_type("CodeableConcept")
                        .with_type("Period"),
                ),
        )
}

/// A resource with `item` and `item.detail` groups.
#[allow(dead_code)]
pub fn create_claim_like(name: &str) -> SchemaNode {
    let item = format!("{name}.item");
    let detail = format!("{name}.item.detail");
    SchemaNode::resource(name)
        .with_base(sd("DomainResource"))
        .with_element(create_test_element(&item, "BackboneElement").with_cardinality(0, "*"))
        .with_nested(
            SchemaNode::backbone(item.as_str())
                .with_element(create_test_element(&format!("{item}.sequence"), "positiveInt"))
                .with_element(create_test_element(&detail, "BackboneElement").with_cardinality(0, "*"))
                .with_nested(
                    SchemaNode::backbone(detail.as_str())
                        .with_element(create_test_element(&format!("{detail}.sequence"), "positiveInt")),
                ),
        )
}

#[allow(dead_code)]
pub fn create_questionnaire() -> SchemaNode {
    SchemaNode::resource("Questionnaire")
        .with_base(sd("DomainResource"))
        .with_element(create_test_element("Questionnaire.item", "BackboneElement").with_cardinality(0, "*"))
        .with_nested(
            SchemaNode::backbone("Questionnaire.item")
                .with_element(create_test_element("Questionnaire.item.linkId", "string"))
                .with_element(
                    ElementDefinition::new("Questionnaire.item.item")
                        .with_cardinality(0, "*")
                        .with_content_reference("#Questionnaire.item"),
                ),
        )
}

#[allow(dead_code)]
pub fn create_bundle() -> SchemaNode {
    SchemaNode::resource("Bundle")
        .with_base(sd("Resource"))
        .with_element(create_test_element("Bundle.entry", "BackboneElement").with_cardinality(0, "*"))
        .with_nested(
            SchemaNode::backbone("Bundle.entry")
                .with_element(create_test_element("Bundle.entry.fullUrl", "uri"))
                .with_element(create_test_element("Bundle.entry.resource", "Resource")),
        )
}

/// A small R4-shaped graph exercising every resolution case.
#[allow(dead_code)]
pub fn create_test_graph() -> SchemaGraph {
    let mut graph = SchemaGraph::new(FhirVersion::R4)
        .with_value_set(create_gender_value_set())
        .with_value_set(create_observation_status_value_set())
        .with_value_set(
            ValueSet::new(MIMETYPES_VS, "MimeTypes")
                .with_code(ValueSetCode::new("urn:ietf:bcp:13", "text/plain")),
        );

    for node in create_base_nodes().into_iter().chain(create_datatypes()) {
        graph.add_node(node);
    }
    for node in [
        create_patient(),
        create_person(),
        create_organization(),
        create_observation(),
        create_claim_like("Claim"),
        create_claim_like("ExplanationOfBenefit"),
        create_questionnaire(),
        create_bundle(),
    ] {
        graph.add_node(node);
    }
    graph
}

#[allow(dead_code)]
pub fn run(graph: &SchemaGraph) -> Result<GenerationOutput> {
    ResolutionEngine::new(ResolverConfig::default())?.run(graph)
}

#[allow(dead_code)]
pub fn run_for(graph: &SchemaGraph, target: TargetKind) -> Result<GenerationOutput> {
    ResolutionEngine::new(ResolverConfig::for_target(target))?.run(graph)
}
