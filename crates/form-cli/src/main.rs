mod filler;
mod fsstore;

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use filler::{FillFormat, FillPresenter, PromptContext, ValueParseError, Verbosity};
use form_spec::{
    FieldType, FieldValue, FillSession, SubmitOutcome, Template, TemplateStore, ValueBag,
    build_preview, build_submission, render_json, render_text, resolve_visibility, template_json,
    template_schema, template_xml, template_xsd, validate, validate_visible,
};
use fsstore::DirTemplateStore;
use globset::Glob;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Conditional form templates on the command line",
    long_about = "Fills, previews, validates, and exports form templates whose sections and fields appear and disappear based on conditional rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PreviewFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SubmitFormat {
    Json,
    Xml,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportFormat {
    Json,
    Xml,
    Xsd,
}

#[derive(Subcommand)]
enum Command {
    /// Fill a template interactively and print the finished submission.
    Fill {
        /// Path to a template JSON file.
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
        /// Form id to load from the template store instead of a file.
        #[arg(long, value_name = "FORM_ID")]
        id: Option<String>,
        /// Template store directory (defaults to FORMDECK_TEMPLATES_DIR).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Output format for the finished submission.
        #[arg(long, value_enum, default_value_t = FillFormat::Json)]
        format: FillFormat,
        /// Also emit the submission as CBOR hex.
        #[arg(long)]
        cbor: bool,
        /// Show visibility state and field lists while filling.
        #[arg(long, alias = "debug")]
        verbose: bool,
    },
    /// Show which sections and fields a value bag makes visible.
    Preview {
        /// Path to a template JSON file.
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
        /// Form id to load from the template store instead of a file.
        #[arg(long, value_name = "FORM_ID")]
        id: Option<String>,
        /// Template store directory (defaults to FORMDECK_TEMPLATES_DIR).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Optional JSON file with field values driving the preview.
        #[arg(long, value_name = "VALUES")]
        values: Option<PathBuf>,
        /// Render output mode for the preview.
        #[arg(long, value_enum, default_value_t = PreviewFormat::Text)]
        format: PreviewFormat,
        /// Print the JSON Schema for the value bag instead of the preview.
        #[arg(long)]
        schema: bool,
    },
    /// Validate a value bag against a template.
    Validate {
        /// Path to a template JSON file.
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
        /// Form id to load from the template store instead of a file.
        #[arg(long, value_name = "FORM_ID")]
        id: Option<String>,
        /// Template store directory (defaults to FORMDECK_TEMPLATES_DIR).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// JSON file with the field values to check.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
    },
    /// Render a submission from a value bag without the interactive loop.
    Submit {
        /// Path to a template JSON file.
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
        /// Form id to load from the template store instead of a file.
        #[arg(long, value_name = "FORM_ID")]
        id: Option<String>,
        /// Template store directory (defaults to FORMDECK_TEMPLATES_DIR).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// JSON file with the field values to submit.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
        /// Output format for the submission.
        #[arg(long, value_enum, default_value_t = SubmitFormat::Json)]
        format: SubmitFormat,
        /// Write the output to a file instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Export a template as JSON, XML, or an XSD describing the XML layout.
    Export {
        /// Path to a template JSON file.
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
        /// Form id to load from the template store instead of a file.
        #[arg(long, value_name = "FORM_ID")]
        id: Option<String>,
        /// Template store directory (defaults to FORMDECK_TEMPLATES_DIR).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Export format.
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write the output to a file instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Manage the template store directory.
    Templates {
        /// Template store directory (defaults to FORMDECK_TEMPLATES_DIR).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        #[command(subcommand)]
        command: TemplatesCommand,
    },
}

#[derive(Subcommand)]
enum TemplatesCommand {
    /// List stored templates.
    List {
        /// Only show templates whose form id or name matches the glob.
        #[arg(long = "match", value_name = "GLOB")]
        pattern: Option<String>,
    },
    /// Add or update a template from a JSON file.
    Save {
        /// Path to the template JSON file.
        file: PathBuf,
    },
    /// Remove a stored template.
    Delete {
        /// Form id of the template to remove.
        form_id: String,
    },
    /// Print the JSON Schema for template files.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fill {
            template,
            id,
            dir,
            format,
            cbor,
            verbose,
        } => run_fill(template, id, dir, format, cbor, verbose),
        Command::Preview {
            template,
            id,
            dir,
            values,
            format,
            schema,
        } => run_preview(template, id, dir, values, format, schema),
        Command::Validate {
            template,
            id,
            dir,
            values,
        } => run_validate(template, id, dir, values),
        Command::Submit {
            template,
            id,
            dir,
            values,
            format,
            out,
        } => run_submit(template, id, dir, values, format, out),
        Command::Export {
            template,
            id,
            dir,
            format,
            out,
        } => run_export(template, id, dir, format, out),
        Command::Templates { dir, command } => run_templates(dir, command),
    }
}

fn run_fill(
    template: Option<PathBuf>,
    id: Option<String>,
    dir: Option<PathBuf>,
    format: FillFormat,
    cbor: bool,
    verbose: bool,
) -> CliResult<()> {
    let template = load_template(template, id, dir)?;
    let mut session = FillSession::new(template);
    let mut presenter = FillPresenter::new(Verbosity::from_verbose(verbose), format, cbor);
    presenter.show_header(session.template());

    // Fields already offered this pass; a failed submit reopens the ones
    // that came back with errors.
    let mut walked: BTreeSet<String> = BTreeSet::new();
    loop {
        let visibility = session.visibility();
        presenter.show_status(session.template(), &visibility, walked.len());

        let pending = {
            let fields = visibility.ordered_fields(session.template());
            let total = fields.len();
            fields
                .into_iter()
                .enumerate()
                .find(|(_, field)| !walked.contains(&field.id))
                .map(|(index, field)| {
                    (
                        field.id.clone(),
                        PromptContext::new(field, index + 1, total, session.values().get(&field.id)),
                    )
                })
        };

        let Some((field_id, prompt)) = pending else {
            match session.submit() {
                SubmitOutcome::Submitted(submission) => {
                    presenter.show_completion(&submission);
                    return Ok(());
                }
                SubmitOutcome::Failed(errors) => {
                    presenter.show_errors(session.template(), &errors);
                    for field_id in errors.keys() {
                        walked.remove(field_id);
                    }
                    continue;
                }
            }
        };

        if let Some(value) = prompt_field(&prompt, &presenter)? {
            session.set_value(&field_id, value);
        }
        walked.insert(field_id);
    }
}

fn prompt_field(prompt: &PromptContext, presenter: &FillPresenter) -> CliResult<Option<FieldValue>> {
    loop {
        presenter.show_prompt(prompt);
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err("input ended before the form was complete".into());
        }

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Err("fill aborted by user".into());
        }
        // Empty input keeps the current value (or leaves the field unset).
        if trimmed.is_empty() {
            return Ok(None);
        }

        match parse_value(prompt, trimmed) {
            Ok(value) => return Ok(Some(value)),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

fn parse_value(prompt: &PromptContext, raw: &str) -> Result<FieldValue, ValueParseError> {
    match prompt.kind {
        FieldType::Checkbox | FieldType::Toggle => parse_boolean(raw),
        FieldType::Number | FieldType::Slider => parse_number(raw),
        FieldType::Radio | FieldType::Dropdown => parse_option(&prompt.options, raw),
        FieldType::File => Ok(FieldValue::File {
            file: raw.to_string(),
        }),
        _ => Ok(FieldValue::Text(raw.to_string())),
    }
}

fn parse_boolean(raw: &str) -> Result<FieldValue, ValueParseError> {
    match raw.to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(FieldValue::Bool(true)),
        "false" | "f" | "no" | "n" | "0" => Ok(FieldValue::Bool(false)),
        _ => Err(ValueParseError::new(
            "Please enter yes or no.",
            Some("expected boolean (y/n/true/false)".to_string()),
        )),
    }
}

fn parse_number(raw: &str) -> Result<FieldValue, ValueParseError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(FieldValue::Number(value)),
        Ok(_) => Err(ValueParseError::new(
            "Please enter a finite number.",
            Some("number must be finite".to_string()),
        )),
        Err(_) => Err(ValueParseError::new(
            "Please enter a number.",
            Some("expected number".to_string()),
        )),
    }
}

fn parse_option(options: &[String], raw: &str) -> Result<FieldValue, ValueParseError> {
    if options.is_empty() {
        return Ok(FieldValue::Text(raw.to_string()));
    }
    if let Some(choice) = options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(raw))
    {
        Ok(FieldValue::Text(choice.clone()))
    } else {
        Err(ValueParseError::new(
            format!("Choose one of: {}.", options.join(", ")),
            Some(format!("allowed values: {}", options.join(", "))),
        ))
    }
}

fn run_preview(
    template: Option<PathBuf>,
    id: Option<String>,
    dir: Option<PathBuf>,
    values_path: Option<PathBuf>,
    format: PreviewFormat,
    schema: bool,
) -> CliResult<()> {
    let template = load_template(template, id, dir)?;
    let values = load_values(values_path.as_ref())?;
    let payload = build_preview(&template, &values);
    if schema {
        println!("{}", serde_json::to_string_pretty(&payload.schema)?);
        return Ok(());
    }
    match format {
        PreviewFormat::Text => println!("{}", render_text(&payload)),
        PreviewFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&render_json(&payload))?)
        }
    }
    Ok(())
}

fn run_validate(
    template: Option<PathBuf>,
    id: Option<String>,
    dir: Option<PathBuf>,
    values_path: PathBuf,
) -> CliResult<()> {
    let template = load_template(template, id, dir)?;
    let values = load_values(Some(&values_path))?;

    let errors = validate(&template, &values);
    println!(
        "Validation result: {}",
        if errors.is_empty() { "valid" } else { "invalid" }
    );
    if errors.is_empty() {
        return Ok(());
    }

    println!("Errors:");
    for (field_id, message) in &errors {
        println!("  {} ({}) - {}", field_id, field_label(&template, field_id), message);
    }
    Err("validation failed".into())
}

fn run_submit(
    template: Option<PathBuf>,
    id: Option<String>,
    dir: Option<PathBuf>,
    values_path: PathBuf,
    format: SubmitFormat,
    out: Option<PathBuf>,
) -> CliResult<()> {
    let template = load_template(template, id, dir)?;
    let values = load_values(Some(&values_path))?;

    let visibility = resolve_visibility(&template, &values);
    let errors = validate_visible(&template, &visibility, &values);
    if !errors.is_empty() {
        eprintln!("Validation errors:");
        for (field_id, message) in &errors {
            eprintln!("  {} ({}) - {}", field_id, field_label(&template, field_id), message);
        }
        return Err("validation failed".into());
    }

    let submission = build_submission(&template, &visibility, &values);
    let rendered = match format {
        SubmitFormat::Json => submission.to_json_pretty()?,
        SubmitFormat::Xml => submission.to_xml(),
    };
    write_output(out, &rendered)
}

fn run_export(
    template: Option<PathBuf>,
    id: Option<String>,
    dir: Option<PathBuf>,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> CliResult<()> {
    let template = load_template(template, id, dir)?;
    let rendered = match format {
        ExportFormat::Json => template_json(&template)?,
        ExportFormat::Xml => template_xml(&template),
        ExportFormat::Xsd => template_xsd().to_string(),
    };
    write_output(out, &rendered)
}

fn run_templates(dir: Option<PathBuf>, command: TemplatesCommand) -> CliResult<()> {
    let root = resolve_templates_dir(dir);
    let mut store = DirTemplateStore::new(&root);
    match command {
        TemplatesCommand::List { pattern } => {
            let mut templates = store.load_all()?;
            if let Some(pattern) = pattern {
                let matcher = Glob::new(&pattern)?.compile_matcher();
                templates.retain(|template| {
                    matcher.is_match(&template.form_id) || matcher.is_match(&template.form_name)
                });
            }
            if templates.is_empty() {
                println!("No templates stored in {}", root.display());
                return Ok(());
            }
            for template in &templates {
                println!(
                    "{}  {} ({} sections, {} fields)",
                    template.form_id,
                    template.form_name,
                    template.sections.len(),
                    template.fields().count()
                );
            }
            Ok(())
        }
        TemplatesCommand::Save { file } => {
            let contents = fs::read_to_string(&file)?;
            let mut template: Template = serde_json::from_str(&contents)?;
            template.updated_at = Utc::now();
            store.save(&template)?;
            println!(
                "Saved template '{}' ({})",
                template.form_id, template.form_name
            );
            Ok(())
        }
        TemplatesCommand::Delete { form_id } => {
            if store.delete(&form_id)? {
                println!("Deleted template '{}'", form_id);
                Ok(())
            } else {
                Err(format!("no template with id '{}' in {}", form_id, root.display()).into())
            }
        }
        TemplatesCommand::Schema => {
            println!("{}", serde_json::to_string_pretty(&template_schema())?);
            Ok(())
        }
    }
}

fn load_template(
    template: Option<PathBuf>,
    id: Option<String>,
    dir: Option<PathBuf>,
) -> CliResult<Template> {
    match (template, id) {
        (Some(path), None) => {
            let contents = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        (None, Some(form_id)) => {
            let store = DirTemplateStore::new(resolve_templates_dir(dir));
            match store.get(&form_id)? {
                Some(template) => Ok(template),
                None => Err(format!(
                    "no template with id '{}' in {}",
                    form_id,
                    store.root().display()
                )
                .into()),
            }
        }
        (Some(_), Some(_)) => Err("use either --template or --id, not both".into()),
        (None, None) => Err("a template is required; pass --template FILE or --id FORM_ID".into()),
    }
}

fn load_values(path: Option<&PathBuf>) -> CliResult<ValueBag> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(ValueBag::new()),
    }
}

fn resolve_templates_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.or_else(|| env::var_os("FORMDECK_TEMPLATES_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("templates"))
}

fn field_label<'a>(template: &'a Template, field_id: &str) -> &'a str {
    template
        .field(field_id)
        .map(|field| field.label.as_str())
        .unwrap_or("<unknown>")
}

fn write_output(out: Option<PathBuf>, rendered: &str) -> CliResult<()> {
    match out {
        Some(path) => {
            fs::write(&path, format!("{rendered}\n"))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
