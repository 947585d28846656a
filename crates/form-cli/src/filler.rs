use std::collections::BTreeMap;
use std::fmt::Write;

use clap::ValueEnum;
use form_spec::{Field, FieldType, FieldValue, Submission, Template, VisibilitySet};

/// Controls which bits of state the interactive filler prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: field prompts only.
    Clean,
    /// Verbose output: visibility state, field lists, parse expectations.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Output shape for a finished submission.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum FillFormat {
    Json,
    Xml,
    Text,
}

/// Printer for the interactive fill loop.
pub struct FillPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    format: FillFormat,
    show_cbor: bool,
}

impl FillPresenter {
    pub fn new(verbosity: Verbosity, format: FillFormat, show_cbor: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            format,
            show_cbor,
        }
    }

    pub fn show_header(&mut self, template: &Template) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", template.form_name);
        if self.verbosity.is_verbose()
            && let Some(description) = &template.description
        {
            println!("{}", description);
        }
        self.header_printed = true;
    }

    pub fn show_status(&self, template: &Template, visibility: &VisibilitySet, walked: usize) {
        if self.verbosity.is_verbose() {
            println!(
                "Status: editing ({}/{})",
                walked,
                visibility.visible_field_count()
            );
            self.print_visible_fields(template, visibility);
        } else if visibility.visible_field_count() == 0 {
            println!("No visible fields; check the conditional rules.");
        }
    }

    fn print_visible_fields(&self, template: &Template, visibility: &VisibilitySet) {
        println!("Visible fields:");
        for field in visibility.ordered_fields(template) {
            let mut entry = format!(" - {} ({})", field.id, field.label);
            if field.required {
                entry.push_str(" [required]");
            }
            println!("{}", entry);
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.index, prompt.total, prompt.label);
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        if let Some(current) = &prompt.current {
            line.push_str(&format!(" [{}]", current));
        }
        println!("{}", line);
        if let Some(placeholder) = &prompt.placeholder {
            println!("{}", placeholder);
        }
        if self.verbosity.is_verbose() && !prompt.options.is_empty() {
            println!("Options: {}", prompt.options.join(", "));
        }
    }

    pub fn show_parse_error(&self, error: &ValueParseError) {
        eprintln!("Invalid value: {}", error.user_message);
        if self.verbosity.is_verbose()
            && let Some(debug) = &error.debug_message
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_errors(&self, template: &Template, errors: &BTreeMap<String, String>) {
        eprintln!("Validation errors:");
        for (field_id, message) in errors {
            let label = template
                .field(field_id)
                .map(|field| field.label.as_str())
                .unwrap_or(field_id.as_str());
            eprintln!("  {}: {}", label, message);
        }
    }

    pub fn show_completion(&self, submission: &Submission) {
        println!("Done ✅");
        match self.format {
            FillFormat::Json => match submission.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => eprintln!("Failed to serialize submission to JSON: {}", err),
            },
            FillFormat::Xml => println!("{}", submission.to_xml()),
            FillFormat::Text => {
                for field in &submission.fields {
                    let value = field
                        .value
                        .as_ref()
                        .map(FieldValue::display_text)
                        .unwrap_or_default();
                    println!("{}: {}", field.label, value);
                }
            }
        }
        if self.show_cbor {
            match submission.to_cbor() {
                Ok(bytes) => println!("Submission (CBOR hex): {}", encode_hex(&bytes)),
                Err(err) => eprintln!("Failed to serialize submission to CBOR: {}", err),
            }
        }
    }
}

/// Context used to format a single field prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub kind: FieldType,
    pub required: bool,
    pub placeholder: Option<String>,
    pub hint: Option<String>,
    pub options: Vec<String>,
    /// Display text of the current value, shown as the keep-on-empty default.
    pub current: Option<String>,
}

impl PromptContext {
    pub fn new(field: &Field, index: usize, total: usize, current: Option<&FieldValue>) -> Self {
        Self {
            index: index.max(1),
            total,
            label: field.label.clone(),
            kind: field.kind,
            required: field.required,
            placeholder: field.placeholder.clone(),
            hint: field_hint(field),
            options: field.options.clone().unwrap_or_default(),
            current: current.map(FieldValue::display_text),
        }
    }
}

fn field_hint(field: &Field) -> Option<String> {
    match field.kind {
        FieldType::Checkbox | FieldType::Toggle => Some("(yes/no, y/n, true/false)".to_string()),
        FieldType::Number | FieldType::Slider => Some("(number)".to_string()),
        FieldType::Date => Some("(YYYY-MM-DD)".to_string()),
        FieldType::File => Some("(file name)".to_string()),
        FieldType::Radio | FieldType::Dropdown => field
            .options
            .as_ref()
            .filter(|options| !options.is_empty())
            .map(|options| format!("({})", options.join("/"))),
        _ => None,
    }
}

/// Error produced when parsing a typed value from the user.
#[derive(Debug)]
pub struct ValueParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl ValueParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
