use chrono::SecondsFormat;

use crate::spec::field::Field;
use crate::spec::rules::{ConditionalRule, ValidationRule};
use crate::spec::template::Template;

/// Pretty-printed template JSON, byte-compatible with what the store holds.
pub fn template_json(template: &Template) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(template)
}

/// `<form>` document describing the template structure: metadata, sections,
/// components, and their rules.
pub fn template_xml(template: &Template) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<form id=\"{}\" name=\"{}\">\n",
        escape_xml(&template.form_id),
        escape_xml(&template.form_name)
    ));

    if let Some(description) = &template.description {
        xml.push_str(&format!(
            "  <description>{}</description>\n",
            escape_xml(description)
        ));
    }

    xml.push_str("  <metadata>\n");
    xml.push_str(&format!(
        "    <createdAt>{}</createdAt>\n",
        template
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    xml.push_str(&format!(
        "    <updatedAt>{}</updatedAt>\n",
        template
            .updated_at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    xml.push_str("  </metadata>\n");

    xml.push_str("  <sections>\n");
    for section in &template.sections {
        xml.push_str(&format!(
            "    <section id=\"{}\" name=\"{}\" collapsed=\"{}\" reusable=\"{}\">\n",
            escape_xml(&section.id),
            escape_xml(&section.name),
            section.collapsed,
            section.is_reusable
        ));
        xml.push_str("      <components>\n");
        for field in &section.components {
            push_component(&mut xml, field);
        }
        xml.push_str("      </components>\n");
        xml.push_str("    </section>\n");
    }
    xml.push_str("  </sections>\n");
    xml.push_str("</form>");

    xml
}

fn push_component(xml: &mut String, field: &Field) {
    xml.push_str(&format!(
        "        <component id=\"{}\" type=\"{}\">\n",
        escape_xml(&field.id),
        field.kind.as_str()
    ));
    xml.push_str(&format!(
        "          <label>{}</label>\n",
        escape_xml(&field.label)
    ));
    xml.push_str(&format!(
        "          <required>{}</required>\n",
        field.required
    ));

    if let Some(placeholder) = &field.placeholder {
        xml.push_str(&format!(
            "          <placeholder>{}</placeholder>\n",
            escape_xml(placeholder)
        ));
    }

    if let Some(options) = &field.options
        && !options.is_empty()
    {
        xml.push_str("          <options>\n");
        for option in options {
            xml.push_str(&format!(
                "            <option>{}</option>\n",
                escape_xml(option)
            ));
        }
        xml.push_str("          </options>\n");
    }

    if let Some(min) = field.min {
        xml.push_str(&format!("          <min>{min}</min>\n"));
    }
    if let Some(max) = field.max {
        xml.push_str(&format!("          <max>{max}</max>\n"));
    }

    if !field.validation_rules.is_empty() {
        xml.push_str("          <validationRules>\n");
        for rule in &field.validation_rules {
            push_validation_rule(xml, rule);
        }
        xml.push_str("          </validationRules>\n");
    }

    if !field.conditional_rules.is_empty() {
        xml.push_str("          <conditionalRules>\n");
        for rule in &field.conditional_rules {
            push_conditional_rule(xml, rule);
        }
        xml.push_str("          </conditionalRules>\n");
    }

    xml.push_str("        </component>\n");
}

fn push_validation_rule(xml: &mut String, rule: &ValidationRule) {
    xml.push_str(&format!(
        "            <rule type=\"{}\">\n",
        rule.kind.as_str()
    ));
    if let Some(value) = &rule.value {
        xml.push_str(&format!(
            "              <value>{}</value>\n",
            escape_xml(&value.display_text())
        ));
    }
    if let Some(notice) = &rule.message {
        xml.push_str(&format!(
            "              <message>{}</message>\n",
            escape_xml(notice)
        ));
    }
    xml.push_str("            </rule>\n");
}

fn push_conditional_rule(xml: &mut String, rule: &ConditionalRule) {
    xml.push_str(&format!(
        "            <rule id=\"{}\" fieldId=\"{}\" operator=\"{}\">\n",
        escape_xml(&rule.id),
        escape_xml(&rule.field_id),
        rule.operator.as_str()
    ));
    let literal = rule
        .value
        .as_ref()
        .map(|value| escape_xml(&value.display_text()))
        .unwrap_or_default();
    xml.push_str(&format!("              <value>{literal}</value>\n"));
    xml.push_str("            </rule>\n");
}

/// Fixed XSD describing the `<form>` export; the document is the same for
/// every template.
pub fn template_xsd() -> &'static str {
    TEMPLATE_XSD
}

pub(crate) fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

const TEMPLATE_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">

  <xs:element name="form">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="description" type="xs:string" minOccurs="0"/>
        <xs:element name="metadata" type="MetadataType"/>
        <xs:element name="sections" type="SectionsType"/>
      </xs:sequence>
      <xs:attribute name="id" type="xs:string" use="required"/>
      <xs:attribute name="name" type="xs:string" use="required"/>
    </xs:complexType>
  </xs:element>

  <xs:complexType name="MetadataType">
    <xs:sequence>
      <xs:element name="createdAt" type="xs:dateTime"/>
      <xs:element name="updatedAt" type="xs:dateTime"/>
    </xs:sequence>
  </xs:complexType>

  <xs:complexType name="SectionsType">
    <xs:sequence>
      <xs:element name="section" type="SectionType" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:complexType>

  <xs:complexType name="SectionType">
    <xs:sequence>
      <xs:element name="components" type="ComponentsType"/>
    </xs:sequence>
    <xs:attribute name="id" type="xs:string" use="required"/>
    <xs:attribute name="name" type="xs:string" use="required"/>
    <xs:attribute name="collapsed" type="xs:boolean"/>
    <xs:attribute name="reusable" type="xs:boolean"/>
  </xs:complexType>

  <xs:complexType name="ComponentsType">
    <xs:sequence>
      <xs:element name="component" type="ComponentType" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:complexType>

  <xs:complexType name="ComponentType">
    <xs:sequence>
      <xs:element name="label" type="xs:string"/>
      <xs:element name="required" type="xs:boolean"/>
      <xs:element name="placeholder" type="xs:string" minOccurs="0"/>
      <xs:element name="options" type="OptionsType" minOccurs="0"/>
      <xs:element name="min" type="xs:decimal" minOccurs="0"/>
      <xs:element name="max" type="xs:decimal" minOccurs="0"/>
      <xs:element name="validationRules" type="ValidationRulesType" minOccurs="0"/>
      <xs:element name="conditionalRules" type="ConditionalRulesType" minOccurs="0"/>
    </xs:sequence>
    <xs:attribute name="id" type="xs:string" use="required"/>
    <xs:attribute name="type" type="ComponentTypeEnum" use="required"/>
  </xs:complexType>

  <xs:simpleType name="ComponentTypeEnum">
    <xs:restriction base="xs:string">
      <xs:enumeration value="text"/>
      <xs:enumeration value="number"/>
      <xs:enumeration value="email"/>
      <xs:enumeration value="textarea"/>
      <xs:enumeration value="radio"/>
      <xs:enumeration value="checkbox"/>
      <xs:enumeration value="date"/>
      <xs:enumeration value="dropdown"/>
      <xs:enumeration value="file"/>
      <xs:enumeration value="toggle"/>
      <xs:enumeration value="slider"/>
    </xs:restriction>
  </xs:simpleType>

  <xs:complexType name="OptionsType">
    <xs:sequence>
      <xs:element name="option" type="xs:string" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:complexType>

  <xs:complexType name="ValidationRulesType">
    <xs:sequence>
      <xs:element name="rule" maxOccurs="unbounded">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="value" type="xs:string" minOccurs="0"/>
            <xs:element name="message" type="xs:string" minOccurs="0"/>
          </xs:sequence>
          <xs:attribute name="type" type="xs:string" use="required"/>
        </xs:complexType>
      </xs:element>
    </xs:sequence>
  </xs:complexType>

  <xs:complexType name="ConditionalRulesType">
    <xs:sequence>
      <xs:element name="rule" maxOccurs="unbounded">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="value" type="xs:string"/>
          </xs:sequence>
          <xs:attribute name="id" type="xs:string" use="required"/>
          <xs:attribute name="fieldId" type="xs:string" use="required"/>
          <xs:attribute name="operator" type="xs:string" use="required"/>
        </xs:complexType>
      </xs:element>
    </xs:sequence>
  </xs:complexType>

</xs:schema>"#;
